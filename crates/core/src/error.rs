//! Error taxonomy surfaced by the engine.

/// Error type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced to callers. The engine recovers nothing silently except
/// the empty-catalog case, which is not an error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// A referenced record is missing
    #[error("{collection} record not found: {id}")]
    NotFound {
        /// Collection searched
        collection: String,
        /// Missing id
        id: String,
    },

    /// Input or state rule violated
    #[error("validation failed: {0}")]
    Validation(String),

    /// Duplicate record where create-or-update should have updated
    #[error("conflict: {0}")]
    Conflict(String),

    /// Backend or network failure, passed through
    #[error("record store unavailable: {0}")]
    StoreUnavailable(String),

    /// Caller lacks the role for the operation
    #[error("permission denied: {0}")]
    PermissionDenied(String),
}

impl Error {
    /// Shorthand for a missing record.
    pub fn not_found(collection: impl Into<String>, id: impl std::fmt::Display) -> Self {
        Error::NotFound {
            collection: collection.into(),
            id: id.to_string(),
        }
    }

    /// Shorthand for a validation failure.
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }
}
