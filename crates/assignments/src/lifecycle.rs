//! Assignment lifecycle rules.
//!
//! Pure functions over already-loaded records. Nothing in here touches the
//! store or reads the clock; callers pass `now` in.

use courseflow_core::{
    Assignment, AssignmentStatus, Error, Result, StudentAssignmentState, Submission,
    SubmissionStatus, Time,
};

/// Per-student state of an assignment.
///
/// | submission | deadline  | state     |
/// |------------|-----------|-----------|
/// | none       | ahead     | Open      |
/// | none       | passed    | Closed    |
/// | ungraded   | any       | Submitted |
/// | graded     | any       | Graded    |
pub fn derive_state(
    assignment: &Assignment,
    submission: Option<&Submission>,
    now: Time,
) -> StudentAssignmentState {
    match submission {
        None if now < assignment.due_date => StudentAssignmentState::Open,
        None => StudentAssignmentState::Closed,
        Some(s) if s.is_graded() => StudentAssignmentState::Graded,
        Some(s) => StudentAssignmentState::Submitted {
            late: s.status == SubmissionStatus::Late,
        },
    }
}

/// Whether the resubmission window `[creation, due_date)` is still open.
pub fn window_open(due_date: Time, now: Time) -> bool {
    now < due_date
}

/// Status stored on a submission made at `now`.
pub fn submission_status_at(due_date: Time, now: Time) -> SubmissionStatus {
    if window_open(due_date, now) {
        SubmissionStatus::Submitted
    } else {
        SubmissionStatus::Late
    }
}

/// Whether a student may replace their existing submission.
pub fn can_resubmit(assignment: &Assignment, submission: Option<&Submission>, now: Time) -> bool {
    submission.is_some() && window_open(assignment.due_date, now)
}

/// Check a score against the assignment's maximum.
pub fn validate_score(score: f64, marks: f64) -> Result<()> {
    if !score.is_finite() {
        return Err(Error::validation(format!("score must be a number, got {score}")));
    }
    if score < 0.0 || score > marks {
        return Err(Error::validation(format!(
            "score {score} outside 0..={marks}"
        )));
    }
    Ok(())
}

/// Outcome of checking an administrative status change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusTransition {
    /// The change may be applied
    Allowed,
    /// Already in the requested status
    Unchanged,
    /// The change is not part of the lifecycle
    Rejected {
        /// Why not
        reason: String,
    },
}

/// Validates administrative status changes.
///
/// `Draft → Active → Closed`, with `Active → Draft` to unpublish.
pub struct AssignmentStatusValidator;

impl AssignmentStatusValidator {
    /// Validate a status change.
    pub fn validate_transition(
        current: AssignmentStatus,
        next: AssignmentStatus,
    ) -> StatusTransition {
        use AssignmentStatus::*;

        match (current, next) {
            (Draft, Draft) | (Active, Active) | (Closed, Closed) => StatusTransition::Unchanged,

            // Publish
            (Draft, Active) => StatusTransition::Allowed,

            // Stop accepting work
            (Active, Closed) => StatusTransition::Allowed,

            // Unpublish
            (Active, Draft) => StatusTransition::Allowed,

            (Closed, _) => StatusTransition::Rejected {
                reason: "a closed assignment cannot be reopened".to_string(),
            },

            (Draft, Closed) => StatusTransition::Rejected {
                reason: "a draft must be published before it can be closed".to_string(),
            },
        }
    }
}
