//! JSON file storage implementation.
//!
//! Stores each collection as a directory under the root and each record as
//! `<collection>/<id>.json`. Writes are serialized through one lock; reads
//! go straight to disk.

use crate::memory::{merge_patch, prepare_new};
use crate::query::{Expand, ListOptions};
use crate::trait_::{resolve_expand, Record, RecordStore, Result, StoreError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::Mutex;

/// File-based JSON record store.
#[derive(Clone)]
pub struct JsonFileStore {
    root: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl JsonFileStore {
    /// Open (and create if needed) a store rooted at `root`.
    pub async fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).await?;
        Ok(Self {
            root,
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    fn collection_dir(&self, collection: &str) -> Result<PathBuf> {
        check_key(collection)?;
        Ok(self.root.join(collection))
    }

    fn record_path(&self, collection: &str, id: &str) -> Result<PathBuf> {
        check_key(id)?;
        Ok(self.collection_dir(collection)?.join(format!("{}.json", id)))
    }

    async fn write_record(&self, path: &Path, record: &Record) -> Result<()> {
        let json = serde_json::to_string_pretty(record)?;
        fs::write(path, json.as_bytes()).await?;
        Ok(())
    }
}

// Collection names and ids become path components.
fn check_key(key: &str) -> Result<()> {
    let ok = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if ok {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(format!("unusable key: {key:?}")))
    }
}

#[async_trait]
impl RecordStore for JsonFileStore {
    async fn get_one(&self, collection: &str, id: &str, expand: &Expand) -> Result<Record> {
        let path = self.record_path(collection, id)?;
        let mut record = read_json(&path)
            .await?
            .ok_or_else(|| StoreError::not_found(collection, id))?;
        resolve_expand(self, &mut record, expand).await?;
        Ok(record)
    }

    async fn get_full_list(&self, collection: &str, options: &ListOptions) -> Result<Vec<Record>> {
        let dir = self.collection_dir(collection)?;
        let records = list_dir(&dir).await?;
        let mut out = options.apply(records);
        for record in &mut out {
            resolve_expand(self, record, &options.expand).await?;
        }
        Ok(out)
    }

    async fn create(&self, collection: &str, data: Record) -> Result<Record> {
        let (id, record) = prepare_new(collection, data)?;
        let path = self.record_path(collection, &id)?;

        let _guard = self.write_lock.lock().await;
        fs::create_dir_all(self.collection_dir(collection)?).await?;
        if fs::try_exists(&path).await? {
            return Err(StoreError::Conflict(format!("{collection}/{id} already exists")));
        }
        self.write_record(&path, &record).await?;
        tracing::debug!("Created {}/{}", collection, id);
        Ok(record)
    }

    async fn update(&self, collection: &str, id: &str, patch: Record) -> Result<Record> {
        let path = self.record_path(collection, id)?;

        let _guard = self.write_lock.lock().await;
        let mut record = read_json(&path)
            .await?
            .ok_or_else(|| StoreError::not_found(collection, id))?;
        merge_patch(&mut record, patch);
        self.write_record(&path, &record).await?;
        Ok(record)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        let path = self.record_path(collection, id)?;

        let _guard = self.write_lock.lock().await;
        fs::remove_file(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StoreError::not_found(collection, id)
            } else {
                e.into()
            }
        })
    }
}

async fn read_json(path: &Path) -> Result<Option<Record>> {
    match fs::read_to_string(path).await {
        Ok(json) => {
            let value = serde_json::from_str(&json)?;
            Ok(Some(value))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn list_dir(dir: &Path) -> Result<Vec<Record>> {
    let mut items = Vec::new();
    let mut rd = match fs::read_dir(dir).await {
        Ok(rd) => rd,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(items),
        Err(e) => return Err(e.into()),
    };
    while let Some(entry) = rd.next_entry().await? {
        if entry.path().extension().and_then(|s| s.to_str()) != Some("json") {
            continue;
        }
        match read_json(&entry.path()).await {
            Ok(Some(item)) => items.push(item),
            Ok(None) => {}
            Err(e) => tracing::warn!("Skipping unreadable record {}: {}", entry.path().display(), e),
        }
    }
    // Directory order is unspecified; ids give a stable default.
    items.sort_by(|a, b| {
        let id = |r: &Record| r.get("id").and_then(|v| v.as_str()).unwrap_or("").to_string();
        id(a).cmp(&id(b))
    });
    Ok(items)
}
