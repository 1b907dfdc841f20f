//! Record store abstraction and implementations for courseflow.
//!
//! This crate provides the trait-based record store interface the engine
//! consumes, a parameterized query builder, in-memory and JSON-file
//! backends, and a typed facade over the collections the engine uses.

#![warn(missing_docs)]

pub mod trait_;
pub mod query;
pub mod memory;
#[cfg(feature = "json")]
pub mod json_storage;
pub mod content;
pub mod files;

pub use trait_::{resolve_expand, Record, RecordStore, Result, StoreError};
pub use query::{Expand, Filter, ListOptions, Relation, Sort};
pub use memory::MemoryStore;
#[cfg(feature = "json")]
pub use json_storage::JsonFileStore;
pub use content::{ContentStore, ExpandedAssignment, SubmissionDraft, SubmissionUpdate};
pub use files::{BaseUrlResolver, FileResolver};
