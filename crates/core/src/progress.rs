//! Derived completion status and progress figures.

use serde::{Deserialize, Serialize};

/// Completion status derived for a module (or any group of submodules).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProgressStatus {
    /// Nothing opened or completed
    #[serde(rename = "Not Started")]
    NotStarted,
    /// Partially done, or something is open
    #[serde(rename = "In Progress")]
    InProgress,
    /// Everything done, or explicitly closed out
    Completed,
}

impl ProgressStatus {
    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            ProgressStatus::NotStarted => "Not Started",
            ProgressStatus::InProgress => "In Progress",
            ProgressStatus::Completed => "Completed",
        }
    }
}

/// Progress of one module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleProgress {
    /// Percentage complete (0-100), always the raw submodule ratio
    pub percentage: f64,

    /// Reported status (override applied)
    pub status: ProgressStatus,

    /// Completed submodules
    pub completed: usize,

    /// Submodules currently in progress
    pub in_progress: usize,

    /// Total submodules
    pub total: usize,
}

impl Default for ModuleProgress {
    fn default() -> Self {
        Self {
            percentage: 0.0,
            status: ProgressStatus::NotStarted,
            completed: 0,
            in_progress: 0,
            total: 0,
        }
    }
}

/// Counts of modules per reported status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSummary {
    /// All modules
    pub total: usize,
    /// Modules reported Completed
    pub completed: usize,
    /// Modules reported In Progress
    pub in_progress: usize,
    /// Modules reported Not Started
    pub not_started: usize,
}
