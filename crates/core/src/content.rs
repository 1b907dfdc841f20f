//! Content hierarchy: modules own submodules, submodules carry leaf content.

use crate::id::{ModuleId, RecordId, SubmoduleId};
use crate::serde_util::{empty_as_none, opt_timestamp};
use crate::Time;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A top-level unit of the course catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    /// Unique identifier
    pub id: ModuleId,

    /// Module title
    pub title: String,

    /// Description
    #[serde(default)]
    pub description: String,

    /// Catalog category
    #[serde(default)]
    pub category: String,

    /// Display order
    #[serde(default)]
    pub order: i64,

    /// Thumbnail file reference
    #[serde(default, deserialize_with = "empty_as_none")]
    pub thumbnail: Option<String>,

    /// Explicit "mark module complete" override.
    ///
    /// Stored as `status = "Completed"` on the record; it is never derived
    /// from submodules.
    #[serde(rename = "status", default, with = "completion_flag")]
    pub manually_completed: bool,

    /// When created
    #[serde(default, with = "opt_timestamp")]
    pub created: Option<Time>,

    /// Last updated
    #[serde(default, with = "opt_timestamp")]
    pub updated: Option<Time>,
}

/// A submodule: the unit of completion tracking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submodule {
    /// Unique identifier
    pub id: SubmoduleId,

    /// Submodule title
    pub title: String,

    /// Description
    #[serde(default)]
    pub description: String,

    /// Order within the owning module
    #[serde(default)]
    pub order: i64,

    /// Owning module
    pub module: ModuleId,

    /// Completion status
    #[serde(default, deserialize_with = "status_or_pending")]
    pub status: SubmoduleStatus,
}

/// Completion status of a submodule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SubmoduleStatus {
    /// Not opened yet
    #[default]
    Pending,
    /// Opened by a student
    #[serde(rename = "In Progress", alias = "InProgress")]
    InProgress,
    /// Explicitly marked complete
    Completed,
}

impl SubmoduleStatus {
    /// Wire name as stored in the record.
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmoduleStatus::Pending => "Pending",
            SubmoduleStatus::InProgress => "In Progress",
            SubmoduleStatus::Completed => "Completed",
        }
    }
}

/// Visibility of leaf content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentStatus {
    /// Hidden from students
    Draft,
    /// Visible to students
    Active,
}

impl ContentStatus {
    /// Wire name as stored in the record.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentStatus::Draft => "Draft",
            ContentStatus::Active => "Active",
        }
    }
}

/// A video attached to a submodule.
///
/// Watching a video never completes its submodule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    /// Unique identifier
    pub id: RecordId,
    /// Title
    pub title: String,
    /// Owning submodule
    #[serde(default)]
    pub submodule: Option<SubmoduleId>,
    /// Visibility
    pub status: ContentStatus,
}

/// A note attached to a submodule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// Unique identifier
    pub id: RecordId,
    /// Title
    pub title: String,
    /// Owning submodule
    #[serde(default)]
    pub submodule: Option<SubmoduleId>,
    /// Visibility
    pub status: ContentStatus,
}

/// A published announcement shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Announcement {
    /// Unique identifier
    pub id: RecordId,
    /// Title
    pub title: String,
    /// Body
    #[serde(default, deserialize_with = "empty_as_none")]
    pub content: Option<String>,
    /// When created
    #[serde(default, with = "opt_timestamp")]
    pub created: Option<Time>,
}

fn status_or_pending<'de, D: Deserializer<'de>>(d: D) -> Result<SubmoduleStatus, D::Error> {
    let raw = Option::<String>::deserialize(d)?;
    match raw.as_deref() {
        None | Some("") | Some("Pending") => Ok(SubmoduleStatus::Pending),
        Some("In Progress") | Some("InProgress") => Ok(SubmoduleStatus::InProgress),
        Some("Completed") => Ok(SubmoduleStatus::Completed),
        Some(other) => Err(serde::de::Error::custom(format!(
            "unknown submodule status: {other:?}"
        ))),
    }
}

mod completion_flag {
    use super::*;

    pub fn serialize<S: Serializer>(flag: &bool, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(if *flag { "Completed" } else { "" })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
        let raw = Option::<String>::deserialize(d)?;
        Ok(raw.as_deref() == Some("Completed"))
    }
}
