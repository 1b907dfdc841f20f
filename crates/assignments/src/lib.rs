//! Assignments (Layer 2)
//!
//! Submission, grading, per-student assignment state, and administrative
//! assignment status.

#![warn(missing_docs)]

pub mod board;
pub mod lifecycle;
pub mod manager;

pub use board::{BoardEntry, BoardSummary, Breadcrumb, StudentAssignmentView, StudentBoard};
pub use lifecycle::{
    can_resubmit, derive_state, submission_status_at, validate_score, window_open,
    AssignmentStatusValidator, StatusTransition,
};
pub use manager::{AssignmentLifecycle, AssignmentLifecycleManager, SubmissionInput};
