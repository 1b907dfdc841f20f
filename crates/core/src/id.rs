//! Record identifiers.
//!
//! Ids are assigned by the record store and are opaque strings. Each entity
//! gets its own newtype so a submission id can never be passed where an
//! assignment id is expected.

use serde::{Deserialize, Serialize};
use ulid::Ulid;

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Generate a fresh id (lowercase ULID).
            pub fn new() -> Self {
                Self(Ulid::new().to_string().to_lowercase())
            }

            /// Borrow the raw id.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume into the raw id.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

record_id!(
    /// Unique identifier for a Module
    ModuleId
);

record_id!(
    /// Unique identifier for a Submodule
    SubmoduleId
);

record_id!(
    /// Unique identifier for an Assignment
    AssignmentId
);

record_id!(
    /// Unique identifier for a Submission
    SubmissionId
);

record_id!(
    /// Unique identifier for a user (student or admin)
    UserId
);

record_id!(
    /// Identifier for leaf records (videos, notes, announcements)
    RecordId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_ids_are_unique_and_lowercase() {
        let a = ModuleId::new();
        let b = ModuleId::new();
        assert_ne!(a, b);
        assert_eq!(a.as_str(), a.as_str().to_lowercase());
    }

    #[test]
    fn test_id_serializes_as_plain_string() {
        let id = SubmissionId::from("sub123");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"sub123\"");
        let back: SubmissionId = serde_json::from_str("\"sub123\"").unwrap();
        assert_eq!(back, id);
    }
}
