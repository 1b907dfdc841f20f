//! Record store trait abstraction.

use crate::query::{Expand, ListOptions};
use async_trait::async_trait;

/// A record as held by the store: a JSON object with at least an `id`.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Error type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Item not found
    #[error("Not found: {collection}/{id}")]
    NotFound {
        /// Collection searched
        collection: String,
        /// Missing id
        id: String,
    },

    /// A record with this id already exists
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Collection name or id unusable by this backend
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// A stored record does not match the expected shape
    #[error("Malformed {collection} record: {message}")]
    Decode {
        /// Collection read
        collection: String,
        /// What failed
        message: String,
    },

    /// Backend unreachable or failing
    #[error("Unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Shorthand for a missing record.
    pub fn not_found(collection: &str, id: &str) -> Self {
        StoreError::NotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        }
    }
}

impl From<StoreError> for courseflow_core::Error {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound { collection, id } => {
                courseflow_core::Error::NotFound { collection, id }
            }
            StoreError::Conflict(msg) => courseflow_core::Error::Conflict(msg),
            StoreError::InvalidKey(msg) => courseflow_core::Error::Validation(msg),
            other => courseflow_core::Error::StoreUnavailable(other.to_string()),
        }
    }
}

/// Storage abstraction over named record collections.
///
/// Backends are shared by many writers; the last write wins.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Load one record, inlining the requested relations.
    async fn get_one(&self, collection: &str, id: &str, expand: &Expand) -> Result<Record>;

    /// List every record matching the options.
    async fn get_full_list(&self, collection: &str, options: &ListOptions) -> Result<Vec<Record>>;

    /// Insert a record. An `id` is assigned when the data carries none.
    async fn create(&self, collection: &str, data: Record) -> Result<Record>;

    /// Merge `data` into an existing record.
    async fn update(&self, collection: &str, id: &str, data: Record) -> Result<Record>;

    /// Remove a record.
    async fn delete(&self, collection: &str, id: &str) -> Result<()>;

    /// First record matching the options, if any.
    async fn get_first(&self, collection: &str, options: &ListOptions) -> Result<Option<Record>> {
        Ok(self.get_full_list(collection, options).await?.into_iter().next())
    }
}

/// Inline related records under `expand.<field>`.
///
/// Dangling references are left out rather than failing the read.
pub async fn resolve_expand<S: RecordStore + ?Sized>(
    store: &S,
    record: &mut Record,
    expand: &Expand,
) -> Result<()> {
    if expand.is_empty() {
        return Ok(());
    }

    let mut inlined = Record::new();
    for relation in expand.relations() {
        let Some(target) = record.get(relation.field).and_then(|v| v.as_str()) else {
            continue;
        };
        if target.is_empty() {
            continue;
        }
        match store.get_one(&relation.collection, target, &Expand::none()).await {
            Ok(related) => {
                inlined.insert(relation.field.to_string(), serde_json::Value::Object(related));
            }
            Err(StoreError::NotFound { .. }) => {
                tracing::debug!("Dangling {} reference: {}", relation.field, target);
            }
            Err(e) => return Err(e),
        }
    }

    if !inlined.is_empty() {
        record.insert("expand".to_string(), serde_json::Value::Object(inlined));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_map_to_engine_taxonomy() {
        let e: courseflow_core::Error = StoreError::not_found("submodules", "s1").into();
        assert_eq!(e, courseflow_core::Error::not_found("submodules", "s1"));

        let e: courseflow_core::Error = StoreError::Unavailable("timeout".into()).into();
        assert!(matches!(e, courseflow_core::Error::StoreUnavailable(_)));

        let e: courseflow_core::Error = StoreError::Conflict("dup".into()).into();
        assert!(matches!(e, courseflow_core::Error::Conflict(_)));

        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk gone");
        let e: courseflow_core::Error = StoreError::from(io).into();
        assert!(matches!(e, courseflow_core::Error::StoreUnavailable(_)));
    }
}
