//! Student-facing assignment views.

use courseflow_core::{Assignment, StudentAssignmentState, Submission};
use serde::Serialize;

/// One row of a student's assignment board.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardEntry {
    /// The assignment
    pub assignment: Assignment,
    /// The student's submission, if any
    pub submission: Option<Submission>,
    /// Derived state at load time
    pub state: StudentAssignmentState,
}

impl BoardEntry {
    /// Score attached to the submission.
    pub fn score(&self) -> Option<f64> {
        self.submission.as_ref().and_then(|s| s.score)
    }
}

/// Counts of board entries per derived state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BoardSummary {
    /// Assignments on the board
    pub total: usize,
    /// Open, nothing submitted
    pub open: usize,
    /// Deadline passed, nothing submitted
    pub missed: usize,
    /// Submitted, awaiting a grade
    pub submitted: usize,
    /// Graded
    pub graded: usize,
}

impl BoardSummary {
    /// Tally a set of entries.
    pub fn from_entries(entries: &[BoardEntry]) -> Self {
        entries.iter().fold(Self::default(), |mut acc, e| {
            acc.total += 1;
            match e.state {
                StudentAssignmentState::Open => acc.open += 1,
                StudentAssignmentState::Closed => acc.missed += 1,
                StudentAssignmentState::Submitted { .. } => acc.submitted += 1,
                StudentAssignmentState::Graded => acc.graded += 1,
            }
            acc
        })
    }

    /// Share of assignments turned in, 0-100.
    pub fn completion_percentage(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            100.0 * (self.submitted + self.graded) as f64 / self.total as f64
        }
    }
}

/// Every assignment as seen by one student.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentBoard {
    /// Rows, newest assignment first
    pub entries: Vec<BoardEntry>,
    /// Tallies over `entries`
    pub summary: BoardSummary,
}

/// Titles of the assignment's place in the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Breadcrumb {
    /// Module title, when the module still exists
    pub module: Option<String>,
    /// Submodule title, when the submodule still exists
    pub submodule: Option<String>,
}

/// Detail page of one assignment for one student.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentAssignmentView {
    /// The assignment
    pub assignment: Assignment,
    /// The student's submission, if any
    pub submission: Option<Submission>,
    /// Derived state at load time
    pub state: StudentAssignmentState,
    /// Whether the student may still replace their submission
    pub can_resubmit: bool,
    /// Where the assignment lives
    pub breadcrumb: Breadcrumb,
    /// Download URLs of the assignment's attachments
    pub attachment_urls: Vec<String>,
    /// Download URL of the submitted file
    pub submission_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use courseflow_core::{AssignmentStatus, AssignmentType, SubmissionStatus};

    fn entry(id: &str, state: StudentAssignmentState) -> BoardEntry {
        let due = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        BoardEntry {
            assignment: Assignment {
                id: id.into(),
                title: id.to_string(),
                description: String::new(),
                module_id: "m1".into(),
                submodule_id: "s1".into(),
                kind: AssignmentType::Quiz,
                due_date: due,
                marks: 10.0,
                status: AssignmentStatus::Active,
                attachments: vec![],
                created: None,
            },
            submission: state.has_submission().then(|| Submission {
                id: format!("sub-{id}").into(),
                assignment_id: id.into(),
                student_id: "u1".into(),
                submission_file: "a.pdf".to_string(),
                notes: None,
                submitted_at: due,
                status: SubmissionStatus::Submitted,
                score: (state == StudentAssignmentState::Graded).then_some(7.0),
                feedback: None,
            }),
            state,
        }
    }

    #[test]
    fn test_summary_counts() {
        let entries = vec![
            entry("a", StudentAssignmentState::Open),
            entry("b", StudentAssignmentState::Closed),
            entry("c", StudentAssignmentState::Submitted { late: true }),
            entry("d", StudentAssignmentState::Graded),
        ];
        let summary = BoardSummary::from_entries(&entries);
        assert_eq!(summary.total, 4);
        assert_eq!((summary.open, summary.missed), (1, 1));
        assert_eq!((summary.submitted, summary.graded), (1, 1));
        assert_eq!(summary.completion_percentage(), 50.0);
        assert_eq!(entries[3].score(), Some(7.0));
        assert_eq!(entries[0].score(), None);
    }

    #[test]
    fn test_empty_board() {
        let summary = BoardSummary::from_entries(&[]);
        assert_eq!(summary, BoardSummary::default());
        assert_eq!(summary.completion_percentage(), 0.0);
    }
}
