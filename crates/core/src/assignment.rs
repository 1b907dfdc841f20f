//! Assignment and submission models.

use crate::id::{AssignmentId, ModuleId, SubmissionId, SubmoduleId, UserId};
use crate::serde_util::{empty_as_none, one_or_many, opt_timestamp, timestamp};
use crate::Time;
use serde::{Deserialize, Serialize};

/// A gradable task attached to one submodule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    /// Unique identifier
    pub id: AssignmentId,

    /// Assignment title
    pub title: String,

    /// Instructions (may contain markup)
    #[serde(default)]
    pub description: String,

    /// Owning module
    pub module_id: ModuleId,

    /// Owning submodule
    pub submodule_id: SubmoduleId,

    /// Kind of work expected
    #[serde(default, rename = "assignment_type")]
    pub kind: AssignmentType,

    /// Submission deadline
    #[serde(with = "timestamp")]
    pub due_date: Time,

    /// Maximum score
    #[serde(default)]
    pub marks: f64,

    /// Administrative status
    #[serde(default)]
    pub status: AssignmentStatus,

    /// Attached resource files
    #[serde(default, deserialize_with = "one_or_many")]
    pub attachments: Vec<String>,

    /// When created
    #[serde(default, with = "opt_timestamp")]
    pub created: Option<Time>,
}

/// Kind of assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentType {
    /// Quiz
    Quiz,
    /// Coding challenge
    #[default]
    Coding,
    /// Written answer
    Written,
    /// Longer project
    Project,
}

/// Administrative status of an assignment.
///
/// This is a label for administrators; student availability comes from the
/// deadline and the student's own submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentStatus {
    /// Being prepared
    #[default]
    #[serde(alias = "Draft")]
    Draft,
    /// Published
    #[serde(alias = "Active")]
    Active,
    /// No longer accepting work
    #[serde(alias = "Closed")]
    Closed,
}

impl AssignmentStatus {
    /// Wire name as stored in the record.
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentStatus::Draft => "draft",
            AssignmentStatus::Active => "active",
            AssignmentStatus::Closed => "closed",
        }
    }
}

/// A student's single, mutable-until-due-date artifact for one assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    /// Unique identifier
    pub id: SubmissionId,

    /// Assignment submitted to
    pub assignment_id: AssignmentId,

    /// Submitting student
    pub student_id: UserId,

    /// Uploaded file reference
    #[serde(default)]
    pub submission_file: String,

    /// Free-text notes for the instructor
    #[serde(default, deserialize_with = "empty_as_none")]
    pub notes: Option<String>,

    /// Last (re)submission time
    #[serde(with = "timestamp")]
    pub submitted_at: Time,

    /// Stored status
    pub status: SubmissionStatus,

    /// Score, once graded
    #[serde(default)]
    pub score: Option<f64>,

    /// Grader feedback
    #[serde(default, deserialize_with = "empty_as_none")]
    pub feedback: Option<String>,
}

impl Submission {
    /// Whether a grade is attached.
    pub fn is_graded(&self) -> bool {
        self.score.is_some()
    }
}

/// Stored status of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubmissionStatus {
    /// Submitted before the deadline
    Submitted,
    /// First submitted at or after the deadline
    Late,
    /// Score attached
    Graded,
}

impl SubmissionStatus {
    /// Wire name as stored in the record.
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::Submitted => "Submitted",
            SubmissionStatus::Late => "Late",
            SubmissionStatus::Graded => "Graded",
        }
    }
}

/// Per-student view of an assignment, derived from the deadline and the
/// student's submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StudentAssignmentState {
    /// No submission, deadline ahead
    Open,
    /// No submission, deadline passed
    Closed,
    /// Submitted and awaiting a grade
    Submitted {
        /// The stored submission is tagged Late
        late: bool,
    },
    /// Score attached
    Graded,
}

impl StudentAssignmentState {
    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            StudentAssignmentState::Open => "Open",
            StudentAssignmentState::Closed => "Closed",
            StudentAssignmentState::Submitted { .. } => "Submitted",
            StudentAssignmentState::Graded => "Graded",
        }
    }

    /// Whether the student has turned something in.
    pub fn has_submission(&self) -> bool {
        matches!(
            self,
            StudentAssignmentState::Submitted { .. } | StudentAssignmentState::Graded
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_assignment_accepts_store_record() {
        let a: Assignment = serde_json::from_value(json!({
            "id": "a1",
            "title": "Ownership drills",
            "module_id": "m1",
            "submodule_id": "s1",
            "assignment_type": "written",
            "due_date": "2024-01-10 23:59:00.000Z",
            "marks": 100,
            "status": "Active",
            "attachments": "brief.pdf"
        }))
        .unwrap();
        assert_eq!(a.kind, AssignmentType::Written);
        assert_eq!(a.status, AssignmentStatus::Active);
        assert_eq!(a.marks, 100.0);
        assert_eq!(a.attachments, vec!["brief.pdf".to_string()]);
    }

    #[test]
    fn test_submission_empty_feedback_is_none() {
        let s: Submission = serde_json::from_value(json!({
            "id": "x1",
            "assignment_id": "a1",
            "student_id": "u1",
            "submission_file": "answer.zip",
            "submitted_at": "2024-01-09T10:00:00Z",
            "status": "Late",
            "score": null,
            "feedback": ""
        }))
        .unwrap();
        assert_eq!(s.status, SubmissionStatus::Late);
        assert!(s.feedback.is_none());
        assert!(!s.is_graded());
    }

    #[test]
    fn test_student_state_labels() {
        assert_eq!(StudentAssignmentState::Submitted { late: true }.label(), "Submitted");
        assert!(StudentAssignmentState::Graded.has_submission());
        assert!(!StudentAssignmentState::Closed.has_submission());
    }
}
