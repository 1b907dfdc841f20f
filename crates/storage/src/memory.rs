//! In-process record store.

use crate::query::{Expand, ListOptions};
use crate::trait_::{resolve_expand, Record, RecordStore, Result, StoreError};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

type Collections = HashMap<String, BTreeMap<String, Record>>;

/// Record store held in memory. Cloning shares the same data.
#[derive(Clone, Default)]
pub struct MemoryStore {
    data: Arc<RwLock<Collections>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records in a collection.
    pub async fn len(&self, collection: &str) -> usize {
        self.data
            .read()
            .await
            .get(collection)
            .map_or(0, |c| c.len())
    }
}

/// Assign `id`, `created` and `updated` to new data.
pub(crate) fn prepare_new(collection: &str, mut data: Record) -> Result<(String, Record)> {
    let id = match data.get("id") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        None | Some(Value::Null) => ulid::Ulid::new().to_string().to_lowercase(),
        Some(Value::String(_)) => ulid::Ulid::new().to_string().to_lowercase(),
        Some(other) => {
            return Err(StoreError::InvalidKey(format!(
                "{collection}: id must be a string, got {other}"
            )))
        }
    };
    let now = Value::String(courseflow_core::serde_util::format_time(&chrono::Utc::now()));
    data.insert("id".to_string(), Value::String(id.clone()));
    data.entry("created").or_insert_with(|| now.clone());
    data.insert("updated".to_string(), now);
    Ok((id, data))
}

/// Merge a patch into an existing record, keeping its id.
pub(crate) fn merge_patch(existing: &mut Record, patch: Record) {
    for (key, value) in patch {
        if key == "id" {
            continue;
        }
        existing.insert(key, value);
    }
    existing.insert(
        "updated".to_string(),
        Value::String(courseflow_core::serde_util::format_time(&chrono::Utc::now())),
    );
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn get_one(&self, collection: &str, id: &str, expand: &Expand) -> Result<Record> {
        let mut record = self
            .data
            .read()
            .await
            .get(collection)
            .and_then(|c| c.get(id))
            .cloned()
            .ok_or_else(|| StoreError::not_found(collection, id))?;
        resolve_expand(self, &mut record, expand).await?;
        Ok(record)
    }

    async fn get_full_list(&self, collection: &str, options: &ListOptions) -> Result<Vec<Record>> {
        let records: Vec<Record> = self
            .data
            .read()
            .await
            .get(collection)
            .map(|c| c.values().cloned().collect())
            .unwrap_or_default();

        let mut out = options.apply(records);
        for record in &mut out {
            resolve_expand(self, record, &options.expand).await?;
        }
        Ok(out)
    }

    async fn create(&self, collection: &str, data: Record) -> Result<Record> {
        let (id, record) = prepare_new(collection, data)?;
        let mut data = self.data.write().await;
        let records = data.entry(collection.to_string()).or_default();
        if records.contains_key(&id) {
            return Err(StoreError::Conflict(format!("{collection}/{id} already exists")));
        }
        records.insert(id, record.clone());
        Ok(record)
    }

    async fn update(&self, collection: &str, id: &str, patch: Record) -> Result<Record> {
        let mut data = self.data.write().await;
        let record = data
            .get_mut(collection)
            .and_then(|c| c.get_mut(id))
            .ok_or_else(|| StoreError::not_found(collection, id))?;
        merge_patch(record, patch);
        Ok(record.clone())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        self.data
            .write()
            .await
            .get_mut(collection)
            .and_then(|c| c.remove(id))
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found(collection, id))
    }
}
