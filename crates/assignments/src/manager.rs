//! Assignment lifecycle service.

use crate::board::{BoardEntry, BoardSummary, Breadcrumb, StudentAssignmentView, StudentBoard};
use crate::lifecycle::{
    can_resubmit, derive_state, submission_status_at, validate_score, window_open,
    AssignmentStatusValidator, StatusTransition,
};
use async_trait::async_trait;
use courseflow_core::{
    Assignment, AssignmentId, AssignmentStatus, Clock, EngineConfig, Error, Result, Session,
    Submission, SubmissionId, SubmissionStatus, SystemClock, UserId,
};
use courseflow_storage::{ContentStore, FileResolver, SubmissionDraft, SubmissionUpdate};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// What a student hands in.
#[derive(Debug, Clone, Default)]
pub struct SubmissionInput {
    /// Uploaded file reference. Required the first time; on resubmission
    /// `None` keeps the current file.
    pub file: Option<String>,

    /// Notes for the instructor, replacing any previous notes
    pub notes: Option<String>,
}

impl SubmissionInput {
    /// Input carrying a file.
    pub fn with_file(file: impl Into<String>) -> Self {
        Self {
            file: Some(file.into()),
            notes: None,
        }
    }

    /// Attach notes.
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Assignment lifecycle service.
#[async_trait]
pub trait AssignmentLifecycle: Send + Sync {
    /// Create or replace the caller's submission.
    async fn submit(
        &self,
        session: &Session,
        assignment_id: &AssignmentId,
        input: SubmissionInput,
    ) -> Result<Submission>;

    /// Attach a score and feedback to a submission.
    async fn grade(
        &self,
        session: &Session,
        submission_id: &SubmissionId,
        score: f64,
        feedback: Option<String>,
    ) -> Result<Submission>;

    /// One assignment as the caller sees it.
    async fn student_view(
        &self,
        session: &Session,
        assignment_id: &AssignmentId,
    ) -> Result<StudentAssignmentView>;

    /// Every assignment as the caller sees it.
    async fn student_board(&self, session: &Session) -> Result<StudentBoard>;

    /// All submissions to one assignment, oldest first.
    async fn submissions_for_assignment(
        &self,
        session: &Session,
        assignment_id: &AssignmentId,
    ) -> Result<Vec<Submission>>;

    /// Remove a submission.
    async fn delete_submission(&self, session: &Session, submission_id: &SubmissionId)
        -> Result<()>;

    /// Change an assignment's administrative status.
    async fn set_assignment_status(
        &self,
        session: &Session,
        assignment_id: &AssignmentId,
        status: AssignmentStatus,
    ) -> Result<Assignment>;
}

/// Assignment lifecycle backed by a [`ContentStore`].
#[derive(Clone)]
pub struct AssignmentLifecycleManager {
    content: ContentStore,
    clock: Arc<dyn Clock>,
    files: Option<Arc<dyn FileResolver>>,
}

impl AssignmentLifecycleManager {
    /// Create a manager reading the wall clock.
    pub fn new(content: ContentStore) -> Self {
        Self {
            content,
            clock: Arc::new(SystemClock),
            files: None,
        }
    }

    /// Apply collection names from the configuration.
    pub fn with_config(mut self, config: &EngineConfig) -> Self {
        self.content = self.content.with_collections(config.collections.clone());
        self
    }

    /// Set the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Set the file URL resolver used by views.
    pub fn with_file_resolver(mut self, files: Arc<dyn FileResolver>) -> Self {
        self.files = Some(files);
        self
    }

    /// The caller's submission to an assignment, if any.
    ///
    /// Fails with `Conflict` when the store holds more than one.
    async fn existing_submission(
        &self,
        assignment_id: &AssignmentId,
        student: &UserId,
    ) -> Result<Option<Submission>> {
        let mut found = self.content.submissions_for(assignment_id, student).await?;
        if found.len() > 1 {
            error!(
                "{} submissions for assignment {} by {}; expected at most one",
                found.len(),
                assignment_id,
                student
            );
            return Err(Error::Conflict(format!(
                "{} submissions for assignment {assignment_id} by {student}",
                found.len()
            )));
        }
        Ok(found.pop())
    }

    fn file_url(&self, collection: &str, record_id: &str, file: &str) -> Option<String> {
        if file.is_empty() {
            return None;
        }
        self.files
            .as_ref()
            .map(|r| r.file_url(collection, record_id, file))
    }
}

#[async_trait]
impl AssignmentLifecycle for AssignmentLifecycleManager {
    async fn submit(
        &self,
        session: &Session,
        assignment_id: &AssignmentId,
        input: SubmissionInput,
    ) -> Result<Submission> {
        let assignment = self.content.assignment(assignment_id).await?;
        let existing = self
            .existing_submission(assignment_id, &session.user_id)
            .await?;
        let now = self.clock.now();
        let file = input.file.filter(|f| !f.is_empty());

        match existing {
            Some(current) => {
                if !window_open(assignment.due_date, now) {
                    warn!(
                        "Rejected resubmission of {} by {}: due {}",
                        current.id, session.user_id, assignment.due_date
                    );
                    return Err(Error::validation(format!(
                        "assignment {assignment_id} was due {}; submission can no longer change",
                        assignment.due_date
                    )));
                }

                // A new artifact awaits grading.
                let update = SubmissionUpdate {
                    submission_file: file,
                    notes: Some(input.notes),
                    submitted_at: Some(now),
                    status: Some(SubmissionStatus::Submitted),
                    score: Some(None),
                    feedback: Some(None),
                };
                let updated = self.content.update_submission(&current.id, update).await?;
                info!(
                    "{} resubmitted {} for assignment {}",
                    session.user_id, updated.id, assignment_id
                );
                Ok(updated)
            }
            None => {
                let file = file.ok_or_else(|| {
                    Error::validation("a file is required for the first submission")
                })?;
                let status = submission_status_at(assignment.due_date, now);
                let created = self
                    .content
                    .create_submission(SubmissionDraft {
                        assignment_id: assignment_id.clone(),
                        student_id: session.user_id.clone(),
                        submission_file: file,
                        notes: input.notes,
                        submitted_at: now,
                        status,
                    })
                    .await?;
                info!(
                    "{} submitted {} for assignment {} ({})",
                    session.user_id,
                    created.id,
                    assignment_id,
                    status.as_str()
                );
                Ok(created)
            }
        }
    }

    async fn grade(
        &self,
        session: &Session,
        submission_id: &SubmissionId,
        score: f64,
        feedback: Option<String>,
    ) -> Result<Submission> {
        session.require_admin("grading")?;

        let submission = self.content.submission(submission_id).await?;
        let assignment = self.content.assignment(&submission.assignment_id).await?;
        if let Err(e) = validate_score(score, assignment.marks) {
            warn!("Rejected grade for {}: {}", submission_id, e);
            return Err(e);
        }

        let update = SubmissionUpdate {
            status: Some(SubmissionStatus::Graded),
            score: Some(Some(score)),
            feedback: Some(feedback),
            ..SubmissionUpdate::default()
        };
        let graded = self.content.update_submission(submission_id, update).await?;
        info!(
            "{} graded {}: {}/{}",
            session.user_id, submission_id, score, assignment.marks
        );
        Ok(graded)
    }

    async fn student_view(
        &self,
        session: &Session,
        assignment_id: &AssignmentId,
    ) -> Result<StudentAssignmentView> {
        let (expanded, submission) = tokio::try_join!(
            async { Ok::<_, Error>(self.content.assignment_expanded(assignment_id).await?) },
            self.existing_submission(assignment_id, &session.user_id),
        )?;
        let now = self.clock.now();
        let assignment = expanded.assignment;

        let state = derive_state(&assignment, submission.as_ref(), now);
        let resubmit = can_resubmit(&assignment, submission.as_ref(), now);
        debug!(
            "Assignment {} for {}: {}",
            assignment.id,
            session.user_id,
            state.label()
        );

        let collections = self.content.collections();
        let attachment_urls = assignment
            .attachments
            .iter()
            .filter_map(|f| self.file_url(&collections.assignments, assignment.id.as_str(), f))
            .collect();
        let submission_url = submission.as_ref().and_then(|s| {
            self.file_url(&collections.submissions, s.id.as_str(), &s.submission_file)
        });

        Ok(StudentAssignmentView {
            breadcrumb: Breadcrumb {
                module: expanded.module.map(|m| m.title),
                submodule: expanded.submodule.map(|s| s.title),
            },
            assignment,
            submission,
            state,
            can_resubmit: resubmit,
            attachment_urls,
            submission_url,
        })
    }

    async fn student_board(&self, session: &Session) -> Result<StudentBoard> {
        let (assignments, submissions) = tokio::try_join!(
            self.content.assignments(),
            self.content.submissions_of_student(&session.user_id),
        )?;
        let now = self.clock.now();

        let mut by_assignment: HashMap<AssignmentId, Submission> = HashMap::new();
        for s in submissions {
            if let Some(previous) = by_assignment.get(&s.assignment_id) {
                error!(
                    "Duplicate submissions {} and {} for assignment {} by {}",
                    previous.id, s.id, s.assignment_id, session.user_id
                );
                if previous.submitted_at >= s.submitted_at {
                    continue;
                }
            }
            by_assignment.insert(s.assignment_id.clone(), s);
        }

        let entries: Vec<BoardEntry> = assignments
            .into_iter()
            .map(|assignment| {
                let submission = by_assignment.remove(&assignment.id);
                let state = derive_state(&assignment, submission.as_ref(), now);
                BoardEntry {
                    assignment,
                    submission,
                    state,
                }
            })
            .collect();
        let summary = BoardSummary::from_entries(&entries);

        debug!(
            "Board for {}: {} assignments, {:.2}% turned in",
            session.user_id,
            summary.total,
            summary.completion_percentage()
        );
        Ok(StudentBoard { entries, summary })
    }

    async fn submissions_for_assignment(
        &self,
        session: &Session,
        assignment_id: &AssignmentId,
    ) -> Result<Vec<Submission>> {
        session.require_admin("listing submissions")?;
        let (_, submissions) = tokio::try_join!(
            self.content.assignment(assignment_id),
            self.content.submissions_of_assignment(assignment_id),
        )?;
        Ok(submissions)
    }

    async fn delete_submission(
        &self,
        session: &Session,
        submission_id: &SubmissionId,
    ) -> Result<()> {
        session.require_admin("deleting submissions")?;
        self.content.delete_submission(submission_id).await?;
        info!("{} deleted submission {}", session.user_id, submission_id);
        Ok(())
    }

    async fn set_assignment_status(
        &self,
        session: &Session,
        assignment_id: &AssignmentId,
        status: AssignmentStatus,
    ) -> Result<Assignment> {
        session.require_admin("changing assignment status")?;
        let current = self.content.assignment(assignment_id).await?;

        match AssignmentStatusValidator::validate_transition(current.status, status) {
            StatusTransition::Unchanged => Ok(current),
            StatusTransition::Allowed => {
                let updated = self
                    .content
                    .set_assignment_status(assignment_id, status)
                    .await?;
                info!(
                    "{} moved assignment {} from {} to {}",
                    session.user_id,
                    assignment_id,
                    current.status.as_str(),
                    status.as_str()
                );
                Ok(updated)
            }
            StatusTransition::Rejected { reason } => {
                warn!("Rejected status change on {}: {}", assignment_id, reason);
                Err(Error::Validation(reason))
            }
        }
    }
}
