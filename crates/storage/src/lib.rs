//! Storage layer for survey-guard
//!
//! PostgreSQL via sqlx. Sessions, their behavioral events, detection results
//! and text analyses, plus the grouped reads behind the hierarchy reports.

#![allow(clippy::missing_errors_doc, reason = "Errors are self-explanatory from Result types")]
#![allow(unreachable_pub, reason = "pub items in private modules are re-exported via pub use")]
#![allow(unused_results, reason = "SQL execute() returns row count which is often unused")]
#![allow(clippy::needless_raw_string_hashes, reason = "SQL strings use raw for readability")]
#![allow(clippy::implicit_return, reason = "Implicit return is idiomatic Rust")]
#![allow(clippy::question_mark_used, reason = "? operator is idiomatic Rust")]
#![allow(missing_debug_implementations, reason = "Internal types")]

pub mod error;
mod pg_migrations;
mod pg_storage;
pub mod traits;

pub use error::StorageError;
pub use pg_storage::PgStorage;
pub use traits::{
    DetectionStore, EventStore, HierarchyStore, SessionStore, Storage, TextAnalysisStore,
};
