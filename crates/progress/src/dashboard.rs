//! Student dashboard loading.
//!
//! The dashboard pulls several independent aggregates. They are fetched
//! concurrently and each one fails on its own: a broken announcements
//! feed still leaves the progress figures usable.

use crate::aggregator::{group_by_module, summarize_catalog, CatalogProgress};
use courseflow_core::{Announcement, EngineConfig, Error, Result};
use courseflow_storage::ContentStore;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Everything the dashboard shows, one result per data source.
#[derive(Debug, Clone)]
pub struct DashboardSnapshot {
    /// Module progress and overall percentage
    pub catalog: Result<CatalogProgress>,
    /// Number of active videos
    pub active_videos: Result<usize>,
    /// Number of active notes
    pub active_notes: Result<usize>,
    /// Most recent published announcements
    pub announcements: Result<Vec<Announcement>>,
}

impl DashboardSnapshot {
    /// Whether every source loaded.
    pub fn is_complete(&self) -> bool {
        self.failures().is_empty()
    }

    /// Names and errors of the sources that failed.
    pub fn failures(&self) -> Vec<(&'static str, &Error)> {
        let mut out = Vec::new();
        if let Err(e) = &self.catalog {
            out.push(("catalog", e));
        }
        if let Err(e) = &self.active_videos {
            out.push(("active_videos", e));
        }
        if let Err(e) = &self.active_notes {
            out.push(("active_notes", e));
        }
        if let Err(e) = &self.announcements {
            out.push(("announcements", e));
        }
        out
    }
}

/// Loads [`DashboardSnapshot`]s.
///
/// Dropping the future returned by [`DashboardLoader::load`] cancels every
/// outstanding fetch.
#[derive(Clone)]
pub struct DashboardLoader {
    content: ContentStore,
    announcement_limit: usize,
    timeout: Option<Duration>,
}

impl DashboardLoader {
    /// Create a loader over `content` as given, with default limits and no
    /// timeout.
    pub fn new(content: ContentStore) -> Self {
        let defaults = EngineConfig::default();
        Self {
            content,
            announcement_limit: defaults.announcement_limit,
            timeout: defaults.fetch_timeout(),
        }
    }

    /// Create a loader honoring collection names, limits and timeouts.
    pub fn with_config(content: ContentStore, config: &EngineConfig) -> Self {
        Self {
            content: content.with_collections(config.collections.clone()),
            announcement_limit: config.announcement_limit,
            timeout: config.fetch_timeout(),
        }
    }

    /// Fetch all dashboard data concurrently.
    pub async fn load(&self) -> DashboardSnapshot {
        let (catalog, active_videos, active_notes, announcements) = tokio::join!(
            self.branch("catalog", self.catalog()),
            self.branch("active_videos", self.active_videos()),
            self.branch("active_notes", self.active_notes()),
            self.branch("announcements", self.announcements()),
        );

        DashboardSnapshot {
            catalog,
            active_videos,
            active_notes,
            announcements,
        }
    }

    async fn catalog(&self) -> Result<CatalogProgress> {
        let (modules, submodules) =
            tokio::try_join!(self.content.modules(), self.content.all_submodules())?;
        Ok(summarize_catalog(group_by_module(modules, submodules)))
    }

    async fn active_videos(&self) -> Result<usize> {
        Ok(self.content.count_active_videos().await?)
    }

    async fn active_notes(&self) -> Result<usize> {
        Ok(self.content.count_active_notes().await?)
    }

    async fn announcements(&self) -> Result<Vec<Announcement>> {
        Ok(self
            .content
            .published_announcements(self.announcement_limit)
            .await?)
    }

    async fn branch<T>(&self, name: &str, fut: impl Future<Output = Result<T>>) -> Result<T> {
        let result = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, fut).await {
                Ok(r) => r,
                Err(_) => Err(Error::StoreUnavailable(format!(
                    "{name} timed out after {}ms",
                    limit.as_millis()
                ))),
            },
            None => fut.await,
        };

        match &result {
            Ok(_) => debug!("Dashboard {} loaded", name),
            Err(e) => warn!("Dashboard {} failed: {}", name, e),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use courseflow_storage::{
        Expand, ListOptions, MemoryStore, Record, RecordStore, StoreError,
    };
    use courseflow_core::Collections;
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    fn rec(v: serde_json::Value) -> Record {
        v.as_object().cloned().unwrap()
    }

    /// Wraps a store and misbehaves on one collection.
    struct Faulty {
        inner: MemoryStore,
        collection: &'static str,
        delay: Option<Duration>,
        finished: Arc<AtomicBool>,
    }

    impl Faulty {
        async fn trip(&self, collection: &str) -> courseflow_storage::Result<()> {
            if collection != self.collection {
                return Ok(());
            }
            match self.delay {
                Some(d) => {
                    tokio::time::sleep(d).await;
                    self.finished.store(true, Ordering::SeqCst);
                    Ok(())
                }
                None => Err(StoreError::Unavailable("connection refused".into())),
            }
        }
    }

    #[async_trait]
    impl RecordStore for Faulty {
        async fn get_one(
            &self,
            collection: &str,
            id: &str,
            expand: &Expand,
        ) -> courseflow_storage::Result<Record> {
            self.trip(collection).await?;
            self.inner.get_one(collection, id, expand).await
        }

        async fn get_full_list(
            &self,
            collection: &str,
            options: &ListOptions,
        ) -> courseflow_storage::Result<Vec<Record>> {
            self.trip(collection).await?;
            self.inner.get_full_list(collection, options).await
        }

        async fn create(&self, collection: &str, data: Record) -> courseflow_storage::Result<Record> {
            self.inner.create(collection, data).await
        }

        async fn update(
            &self,
            collection: &str,
            id: &str,
            patch: Record,
        ) -> courseflow_storage::Result<Record> {
            self.inner.update(collection, id, patch).await
        }

        async fn delete(&self, collection: &str, id: &str) -> courseflow_storage::Result<()> {
            self.inner.delete(collection, id).await
        }
    }

    async fn seeded() -> MemoryStore {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let store = MemoryStore::new();
        store
            .create("modules", rec(json!({ "id": "m1", "title": "Rust", "order": 1 })))
            .await
            .unwrap();
        for (id, status) in [("s1", "Completed"), ("s2", "Pending")] {
            store
                .create(
                    "submodules",
                    rec(json!({ "id": id, "title": id, "module": "m1", "status": status })),
                )
                .await
                .unwrap();
        }
        for (id, status) in [("v1", "Active"), ("v2", "Active"), ("v3", "Draft")] {
            store
                .create("videos", rec(json!({ "id": id, "title": id, "status": status })))
                .await
                .unwrap();
        }
        store
            .create("notes", rec(json!({ "id": "n1", "title": "n", "status": "Active" })))
            .await
            .unwrap();
        for i in 0..6 {
            store
                .create(
                    "announcements",
                    rec(json!({
                        "id": format!("a{i}"),
                        "title": format!("News {i}"),
                        "status": "Published",
                        "created": format!("2024-01-0{}T10:00:00Z", i + 1),
                    })),
                )
                .await
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_full_snapshot() {
        let store = seeded().await;
        let loader = DashboardLoader::new(ContentStore::new(Arc::new(store)));
        let snap = loader.load().await;

        assert!(snap.is_complete());
        assert_eq!(snap.catalog.as_ref().unwrap().overall_percentage, 50.0);
        assert_eq!(snap.active_videos, Ok(2));
        assert_eq!(snap.active_notes, Ok(1));

        let news = snap.announcements.unwrap();
        assert_eq!(news.len(), 4);
        assert_eq!(news[0].title, "News 5");
    }

    #[tokio::test]
    async fn test_failed_branch_keeps_others() {
        let faulty = Faulty {
            inner: seeded().await,
            collection: "announcements",
            delay: None,
            finished: Arc::default(),
        };
        let loader = DashboardLoader::new(ContentStore::new(Arc::new(faulty)));
        let snap = loader.load().await;

        assert!(!snap.is_complete());
        assert!(matches!(snap.announcements, Err(Error::StoreUnavailable(_))));
        assert_eq!(snap.catalog.as_ref().unwrap().overall_percentage, 50.0);
        assert_eq!(snap.active_videos, Ok(2));

        let failed: Vec<_> = snap.failures().into_iter().map(|(name, _)| name).collect();
        assert_eq!(failed, vec!["announcements"]);
    }

    #[tokio::test]
    async fn test_slow_branch_times_out() {
        let faulty = Faulty {
            inner: seeded().await,
            collection: "videos",
            delay: Some(Duration::from_secs(30)),
            finished: Arc::default(),
        };
        let config = EngineConfig {
            fetch_timeout_ms: Some(50),
            ..EngineConfig::default()
        };
        let loader = DashboardLoader::with_config(ContentStore::new(Arc::new(faulty)), &config);
        let snap = loader.load().await;

        assert!(matches!(snap.active_videos, Err(Error::StoreUnavailable(_))));
        assert_eq!(snap.active_notes, Ok(1));
        assert!(snap.catalog.is_ok());
    }

    #[tokio::test]
    async fn test_dropping_load_cancels_fetches() {
        let finished = Arc::new(AtomicBool::new(false));
        let faulty = Faulty {
            inner: seeded().await,
            collection: "notes",
            delay: Some(Duration::from_millis(200)),
            finished: finished.clone(),
        };
        let loader = DashboardLoader::new(ContentStore::new(Arc::new(faulty)));

        let outcome = tokio::time::timeout(Duration::from_millis(50), loader.load()).await;
        assert!(outcome.is_err());

        // Well past the fetch delay: a fetch still running would have finished.
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert!(!finished.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_new_keeps_caller_collections() {
        let store = MemoryStore::new();
        store
            .create(
                "lms_videos",
                rec(json!({ "id": "v1", "title": "Intro", "status": "Active" })),
            )
            .await
            .unwrap();
        let content = ContentStore::new(Arc::new(store)).with_collections(Collections {
            videos: "lms_videos".to_string(),
            ..Collections::default()
        });
        assert_eq!(content.count_active_videos().await.unwrap(), 1);

        let snap = DashboardLoader::new(content).load().await;
        assert_eq!(snap.active_videos, Ok(1));
    }
}
