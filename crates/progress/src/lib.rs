//! Learning Progress (Layer 2)
//!
//! Module and catalog completion, submodule status changes, and the
//! student dashboard.

#![warn(missing_docs)]

pub mod aggregator;
pub mod dashboard;
pub mod tracker;

pub use aggregator::{
    aggregate_catalog, aggregate_module, derive_status, group_by_module, percentage,
    summarize_catalog, CatalogProgress, ModuleContent, ModuleProgressEntry,
};
pub use dashboard::{DashboardLoader, DashboardSnapshot};
pub use tracker::{BasicProgressTracker, ProgressTracker};
