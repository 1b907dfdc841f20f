//! Typed access to the collections the engine depends on.

use crate::query::{Expand, Filter, ListOptions, Sort};
use crate::trait_::{Record, RecordStore, Result, StoreError};
use courseflow_core::serde_util::format_time;
use courseflow_core::{
    Announcement, Assignment, AssignmentId, AssignmentStatus, Collections, ContentStatus, Module,
    ModuleId, Submission, SubmissionId, SubmissionStatus, Submodule, SubmoduleId,
    SubmoduleStatus, Time, UserId,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::Arc;

/// Fields for a first submission.
#[derive(Debug, Clone)]
pub struct SubmissionDraft {
    /// Assignment submitted to
    pub assignment_id: AssignmentId,
    /// Submitting student
    pub student_id: UserId,
    /// Uploaded file reference
    pub submission_file: String,
    /// Notes for the instructor
    pub notes: Option<String>,
    /// Submission time
    pub submitted_at: Time,
    /// Submitted or Late
    pub status: SubmissionStatus,
}

/// Partial update of a submission; `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct SubmissionUpdate {
    /// Replace the file
    pub submission_file: Option<String>,
    /// Replace (or clear) notes
    pub notes: Option<Option<String>>,
    /// Replace submission time
    pub submitted_at: Option<Time>,
    /// Replace status
    pub status: Option<SubmissionStatus>,
    /// Replace (or clear) score
    pub score: Option<Option<f64>>,
    /// Replace (or clear) feedback
    pub feedback: Option<Option<String>>,
}

impl SubmissionUpdate {
    fn into_record(self) -> Record {
        let mut patch = Record::new();
        if let Some(file) = self.submission_file {
            patch.insert("submission_file".into(), Value::String(file));
        }
        if let Some(notes) = self.notes {
            patch.insert("notes".into(), json!(notes));
        }
        if let Some(at) = self.submitted_at {
            patch.insert("submitted_at".into(), Value::String(format_time(&at)));
        }
        if let Some(status) = self.status {
            patch.insert("status".into(), Value::String(status.as_str().into()));
        }
        if let Some(score) = self.score {
            patch.insert("score".into(), json!(score));
        }
        if let Some(feedback) = self.feedback {
            patch.insert("feedback".into(), json!(feedback));
        }
        patch
    }
}

/// An assignment with its module and submodule inlined (when they exist).
#[derive(Debug, Clone)]
pub struct ExpandedAssignment {
    /// The assignment
    pub assignment: Assignment,
    /// Owning module
    pub module: Option<Module>,
    /// Owning submodule
    pub submodule: Option<Submodule>,
}

/// Typed facade over a [`RecordStore`].
///
/// Every foreign-key query goes through [`Filter`], never string splicing.
#[derive(Clone)]
pub struct ContentStore {
    store: Arc<dyn RecordStore>,
    collections: Collections,
}

impl ContentStore {
    /// Wrap a store using the default collection names.
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            collections: Collections::default(),
        }
    }

    /// Use custom collection names.
    pub fn with_collections(mut self, collections: Collections) -> Self {
        self.collections = collections;
        self
    }

    /// Collection names in use.
    pub fn collections(&self) -> &Collections {
        &self.collections
    }

    /// The underlying store.
    pub fn raw(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    // === Modules ===

    /// Load a module.
    pub async fn module(&self, id: &ModuleId) -> Result<Module> {
        let c = &self.collections.modules;
        decode(c, self.store.get_one(c, id.as_str(), &Expand::none()).await?)
    }

    /// All modules by display order.
    pub async fn modules(&self) -> Result<Vec<Module>> {
        let c = &self.collections.modules;
        let options = ListOptions::new().sort(Sort::asc("order"));
        decode_all(c, self.store.get_full_list(c, &options).await?)
    }

    /// Persist the "mark module complete" override.
    pub async fn set_module_completed(&self, id: &ModuleId) -> Result<Module> {
        let c = &self.collections.modules;
        let patch = object(json!({ "status": "Completed" }));
        decode(c, self.store.update(c, id.as_str(), patch).await?)
    }

    // === Submodules ===

    /// Load a submodule.
    pub async fn submodule(&self, id: &SubmoduleId) -> Result<Submodule> {
        let c = &self.collections.submodules;
        decode(c, self.store.get_one(c, id.as_str(), &Expand::none()).await?)
    }

    /// Submodules of one module by display order.
    pub async fn submodules_of(&self, module: &ModuleId) -> Result<Vec<Submodule>> {
        let c = &self.collections.submodules;
        let options = ListOptions::new()
            .filter(Filter::eq("module", module.as_str()))
            .sort(Sort::asc("order"));
        decode_all(c, self.store.get_full_list(c, &options).await?)
    }

    /// Every submodule in the catalog.
    pub async fn all_submodules(&self) -> Result<Vec<Submodule>> {
        let c = &self.collections.submodules;
        let options = ListOptions::new().sort(Sort::asc("order"));
        decode_all(c, self.store.get_full_list(c, &options).await?)
    }

    /// Overwrite a submodule's status.
    pub async fn set_submodule_status(
        &self,
        id: &SubmoduleId,
        status: SubmoduleStatus,
    ) -> Result<Submodule> {
        let c = &self.collections.submodules;
        let patch = object(json!({ "status": status.as_str() }));
        decode(c, self.store.update(c, id.as_str(), patch).await?)
    }

    // === Leaf content ===

    /// Number of visible videos.
    pub async fn count_active_videos(&self) -> Result<usize> {
        self.count_active(&self.collections.videos).await
    }

    /// Number of visible notes.
    pub async fn count_active_notes(&self) -> Result<usize> {
        self.count_active(&self.collections.notes).await
    }

    async fn count_active(&self, collection: &str) -> Result<usize> {
        let options =
            ListOptions::new().filter(Filter::eq("status", ContentStatus::Active.as_str()));
        Ok(self.store.get_full_list(collection, &options).await?.len())
    }

    /// Latest published announcements, newest first.
    pub async fn published_announcements(&self, limit: usize) -> Result<Vec<Announcement>> {
        let c = &self.collections.announcements;
        let options = ListOptions::new()
            .filter(Filter::eq("status", "Published"))
            .sort(Sort::desc("created"));
        let mut records = self.store.get_full_list(c, &options).await?;
        records.truncate(limit);
        decode_all(c, records)
    }

    // === Assignments ===

    /// Load an assignment.
    pub async fn assignment(&self, id: &AssignmentId) -> Result<Assignment> {
        let c = &self.collections.assignments;
        decode(c, self.store.get_one(c, id.as_str(), &Expand::none()).await?)
    }

    /// Load an assignment with its module and submodule.
    pub async fn assignment_expanded(&self, id: &AssignmentId) -> Result<ExpandedAssignment> {
        let c = &self.collections.assignments;
        let expand = Expand::none()
            .with("module_id", self.collections.modules.clone())
            .with("submodule_id", self.collections.submodules.clone());
        let mut record = self.store.get_one(c, id.as_str(), &expand).await?;

        let inlined = match record.remove("expand") {
            Some(Value::Object(map)) => map,
            _ => Record::new(),
        };
        let module = match inlined.get("module_id") {
            Some(Value::Object(m)) => Some(decode(&self.collections.modules, m.clone())?),
            _ => None,
        };
        let submodule = match inlined.get("submodule_id") {
            Some(Value::Object(s)) => Some(decode(&self.collections.submodules, s.clone())?),
            _ => None,
        };

        Ok(ExpandedAssignment {
            assignment: decode(c, record)?,
            module,
            submodule,
        })
    }

    /// All assignments, newest first.
    pub async fn assignments(&self) -> Result<Vec<Assignment>> {
        let c = &self.collections.assignments;
        let options = ListOptions::new().sort(Sort::desc("created"));
        decode_all(c, self.store.get_full_list(c, &options).await?)
    }

    /// Overwrite an assignment's administrative status.
    pub async fn set_assignment_status(
        &self,
        id: &AssignmentId,
        status: AssignmentStatus,
    ) -> Result<Assignment> {
        let c = &self.collections.assignments;
        let patch = object(json!({ "status": status.as_str() }));
        decode(c, self.store.update(c, id.as_str(), patch).await?)
    }

    // === Submissions ===

    /// Load a submission.
    pub async fn submission(&self, id: &SubmissionId) -> Result<Submission> {
        let c = &self.collections.submissions;
        decode(c, self.store.get_one(c, id.as_str(), &Expand::none()).await?)
    }

    /// Every submission recorded for a (assignment, student) pair.
    ///
    /// More than one result means the one-per-pair invariant was broken.
    pub async fn submissions_for(
        &self,
        assignment: &AssignmentId,
        student: &UserId,
    ) -> Result<Vec<Submission>> {
        let c = &self.collections.submissions;
        let options = ListOptions::new()
            .filter(
                Filter::eq("assignment_id", assignment.as_str())
                    .and(Filter::eq("student_id", student.as_str())),
            )
            .sort(Sort::asc("submitted_at"));
        decode_all(c, self.store.get_full_list(c, &options).await?)
    }

    /// A student's submissions across assignments.
    pub async fn submissions_of_student(&self, student: &UserId) -> Result<Vec<Submission>> {
        let c = &self.collections.submissions;
        let options = ListOptions::new().filter(Filter::eq("student_id", student.as_str()));
        decode_all(c, self.store.get_full_list(c, &options).await?)
    }

    /// Submissions for one assignment, oldest first.
    pub async fn submissions_of_assignment(
        &self,
        assignment: &AssignmentId,
    ) -> Result<Vec<Submission>> {
        let c = &self.collections.submissions;
        let options = ListOptions::new()
            .filter(Filter::eq("assignment_id", assignment.as_str()))
            .sort(Sort::asc("submitted_at"));
        decode_all(c, self.store.get_full_list(c, &options).await?)
    }

    /// Insert a first submission.
    pub async fn create_submission(&self, draft: SubmissionDraft) -> Result<Submission> {
        let c = &self.collections.submissions;
        let data = object(json!({
            "assignment_id": draft.assignment_id,
            "student_id": draft.student_id,
            "submission_file": draft.submission_file,
            "notes": draft.notes,
            "submitted_at": format_time(&draft.submitted_at),
            "status": draft.status.as_str(),
            "score": null,
            "feedback": null,
        }));
        decode(c, self.store.create(c, data).await?)
    }

    /// Apply a partial update to a submission.
    pub async fn update_submission(
        &self,
        id: &SubmissionId,
        update: SubmissionUpdate,
    ) -> Result<Submission> {
        let c = &self.collections.submissions;
        decode(c, self.store.update(c, id.as_str(), update.into_record()).await?)
    }

    /// Remove a submission.
    pub async fn delete_submission(&self, id: &SubmissionId) -> Result<()> {
        self.store
            .delete(&self.collections.submissions, id.as_str())
            .await
    }
}

fn object(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        _ => Record::new(),
    }
}

fn decode<T: DeserializeOwned>(collection: &str, record: Record) -> Result<T> {
    serde_json::from_value(Value::Object(record)).map_err(|e| StoreError::Decode {
        collection: collection.to_string(),
        message: e.to_string(),
    })
}

fn decode_all<T: DeserializeOwned>(collection: &str, records: Vec<Record>) -> Result<Vec<T>> {
    records.into_iter().map(|r| decode(collection, r)).collect()
}
