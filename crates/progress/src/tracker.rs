//! Progress tracking service.

use crate::aggregator::{
    aggregate_module, group_by_module, summarize_catalog, CatalogProgress, ModuleProgressEntry,
};
use async_trait::async_trait;
use courseflow_core::{
    EngineConfig, ModuleId, Result, Session, Submodule, SubmoduleId, SubmoduleStatus,
};
use courseflow_storage::ContentStore;
use tracing::{debug, info};

/// Progress tracking service.
#[async_trait]
pub trait ProgressTracker: Send + Sync {
    /// Progress of one module.
    async fn module_progress(&self, module_id: &ModuleId) -> Result<ModuleProgressEntry>;

    /// Progress of every module plus the overall figure.
    async fn catalog(&self) -> Result<CatalogProgress>;

    /// A student opened a submodule: Pending becomes InProgress.
    async fn start_submodule(&self, session: &Session, id: &SubmoduleId) -> Result<Submodule>;

    /// Explicit "mark complete" on a submodule.
    async fn complete_submodule(&self, session: &Session, id: &SubmoduleId) -> Result<Submodule>;

    /// Instructor edit to any status.
    async fn set_submodule_status(
        &self,
        session: &Session,
        id: &SubmoduleId,
        status: SubmoduleStatus,
    ) -> Result<Submodule>;

    /// Persist the module completion override.
    async fn mark_module_complete(
        &self,
        session: &Session,
        module_id: &ModuleId,
    ) -> Result<ModuleProgressEntry>;
}

/// Progress tracker backed by a [`ContentStore`].
#[derive(Clone)]
pub struct BasicProgressTracker {
    content: ContentStore,
}

impl BasicProgressTracker {
    /// Create a new progress tracker.
    pub fn new(content: ContentStore) -> Self {
        Self { content }
    }

    /// Apply collection names from the configuration.
    pub fn with_config(mut self, config: &EngineConfig) -> Self {
        self.content = self.content.with_collections(config.collections.clone());
        self
    }

    async fn transition(&self, id: &SubmoduleId, next: SubmoduleStatus) -> Result<Submodule> {
        Ok(self.content.set_submodule_status(id, next).await?)
    }
}

#[async_trait]
impl ProgressTracker for BasicProgressTracker {
    async fn module_progress(&self, module_id: &ModuleId) -> Result<ModuleProgressEntry> {
        // Submodules are only meaningful once the module is known to exist.
        let module = self.content.module(module_id).await?;
        let submodules = self.content.submodules_of(module_id).await?;

        let progress = aggregate_module(&submodules, module.manually_completed);
        debug!(
            "Module {} progress: {:.2}% ({:?})",
            module.id, progress.percentage, progress.status
        );
        Ok(ModuleProgressEntry { module, progress })
    }

    async fn catalog(&self) -> Result<CatalogProgress> {
        let (modules, submodules) =
            tokio::try_join!(self.content.modules(), self.content.all_submodules())?;

        let catalog = summarize_catalog(group_by_module(modules, submodules));
        debug!(
            "Catalog progress: {:.2}% over {} modules",
            catalog.overall_percentage, catalog.summary.total
        );
        Ok(catalog)
    }

    async fn start_submodule(&self, session: &Session, id: &SubmoduleId) -> Result<Submodule> {
        let submodule = self.content.submodule(id).await?;
        if submodule.status != SubmoduleStatus::Pending {
            return Ok(submodule);
        }
        info!("{} started submodule {}", session.user_id, id);
        self.transition(id, SubmoduleStatus::InProgress).await
    }

    async fn complete_submodule(&self, session: &Session, id: &SubmoduleId) -> Result<Submodule> {
        let submodule = self.content.submodule(id).await?;
        if submodule.status == SubmoduleStatus::Completed {
            return Ok(submodule);
        }
        info!("{} completed submodule {}", session.user_id, id);
        self.transition(id, SubmoduleStatus::Completed).await
    }

    async fn set_submodule_status(
        &self,
        session: &Session,
        id: &SubmoduleId,
        status: SubmoduleStatus,
    ) -> Result<Submodule> {
        session.require_admin("editing submodule status")?;
        info!("{} set submodule {} to {}", session.user_id, id, status.as_str());
        self.transition(id, status).await
    }

    async fn mark_module_complete(
        &self,
        session: &Session,
        module_id: &ModuleId,
    ) -> Result<ModuleProgressEntry> {
        let module = self.content.module(module_id).await?;
        if !module.manually_completed {
            info!("{} marked module {} complete", session.user_id, module_id);
            self.content.set_module_completed(module_id).await?;
        }
        self.module_progress(module_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courseflow_core::{Error, ProgressStatus};
    use courseflow_storage::{MemoryStore, Record, RecordStore};
    use serde_json::json;
    use std::sync::Arc;

    fn rec(v: serde_json::Value) -> Record {
        v.as_object().cloned().unwrap()
    }

    async fn seeded() -> (MemoryStore, BasicProgressTracker) {
        let store = MemoryStore::new();
        for (id, order) in [("m1", 1), ("m2", 2)] {
            store
                .create("modules", rec(json!({ "id": id, "title": id, "order": order })))
                .await
                .unwrap();
        }
        for (id, module, status) in [
            ("s1", "m1", "Completed"),
            ("s2", "m1", "Completed"),
            ("s3", "m1", "Pending"),
            ("s4", "m2", "Pending"),
        ] {
            store
                .create(
                    "submodules",
                    rec(json!({ "id": id, "title": id, "module": module, "status": status })),
                )
                .await
                .unwrap();
        }
        let tracker = BasicProgressTracker::new(ContentStore::new(Arc::new(store.clone())));
        (store, tracker)
    }

    #[tokio::test]
    async fn test_module_progress_from_store() {
        let (_store, tracker) = seeded().await;
        let entry = tracker.module_progress(&"m1".into()).await.unwrap();
        assert!((entry.progress.percentage - 66.67).abs() < 0.01);
        assert_eq!(entry.progress.status, ProgressStatus::InProgress);
    }

    #[tokio::test]
    async fn test_missing_module_is_not_found() {
        let (_store, tracker) = seeded().await;
        let err = tracker.module_progress(&"nope".into()).await.unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_start_only_moves_pending() {
        let (_store, tracker) = seeded().await;
        let student = Session::student("u1");

        let s = tracker.start_submodule(&student, &"s3".into()).await.unwrap();
        assert_eq!(s.status, SubmoduleStatus::InProgress);

        // Opening a completed submodule does not reopen it.
        let s = tracker.start_submodule(&student, &"s1".into()).await.unwrap();
        assert_eq!(s.status, SubmoduleStatus::Completed);
    }

    #[tokio::test]
    async fn test_complete_can_skip_in_progress() {
        let (_store, tracker) = seeded().await;
        let student = Session::student("u1");
        let s = tracker.complete_submodule(&student, &"s4".into()).await.unwrap();
        assert_eq!(s.status, SubmoduleStatus::Completed);

        let entry = tracker.module_progress(&"m2".into()).await.unwrap();
        assert_eq!(entry.progress.status, ProgressStatus::Completed);
        assert_eq!(entry.progress.percentage, 100.0);
    }

    #[tokio::test]
    async fn test_instructor_edit_requires_admin() {
        let (_store, tracker) = seeded().await;
        let err = tracker
            .set_submodule_status(&Session::student("u1"), &"s1".into(), SubmoduleStatus::Pending)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::PermissionDenied(_)));

        let s = tracker
            .set_submodule_status(&Session::admin("root"), &"s1".into(), SubmoduleStatus::Pending)
            .await
            .unwrap();
        assert_eq!(s.status, SubmoduleStatus::Pending);
    }

    #[tokio::test]
    async fn test_mark_module_complete_overrides_status_only() {
        let (store, tracker) = seeded().await;
        let entry = tracker
            .mark_module_complete(&Session::student("u1"), &"m1".into())
            .await
            .unwrap();
        assert_eq!(entry.progress.status, ProgressStatus::Completed);
        assert!((entry.progress.percentage - 66.67).abs() < 0.01);

        let raw = store
            .get_one("modules", "m1", &courseflow_storage::Expand::none())
            .await
            .unwrap();
        assert_eq!(raw["status"], "Completed");
    }

    #[tokio::test]
    async fn test_catalog_overall() {
        let (_store, tracker) = seeded().await;
        let catalog = tracker.catalog().await.unwrap();
        assert_eq!(catalog.overall_percentage, 50.0);
        assert_eq!(catalog.modules[0].module.id.as_str(), "m1");
        assert_eq!(catalog.summary.in_progress, 1);
        assert_eq!(catalog.summary.not_started, 1);
    }

    #[tokio::test]
    async fn test_empty_catalog() {
        let tracker = BasicProgressTracker::new(ContentStore::new(Arc::new(MemoryStore::new())));
        let catalog = tracker.catalog().await.unwrap();
        assert_eq!(catalog.overall_percentage, 0.0);
        assert_eq!(catalog.summary.total, 0);
    }
}
