//! courseflow core data models.
//!
//! This crate defines the records, statuses and error taxonomy shared by the
//! progress and assignment lifecycle engines.

#![warn(missing_docs)]

// Core identities
mod id;

// Content hierarchy and assignments
mod content;
mod assignment;
mod progress;

// Caller, time and configuration
mod session;
mod clock;
mod config;
mod error;

pub mod serde_util;

// Re-exports
pub use id::*;

pub use content::{Announcement, ContentStatus, Module, Note, Submodule, SubmoduleStatus, Video};
pub use assignment::{
    Assignment, AssignmentStatus, AssignmentType, StudentAssignmentState, Submission,
    SubmissionStatus,
};
pub use progress::{CatalogSummary, ModuleProgress, ProgressStatus};

pub use session::{Role, Session};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{Collections, EngineConfig};
pub use error::{Error, Result};

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;
