//! Service layer for survey-guard
//!
//! Business rules between the HTTP handlers and storage/detection/llm.

#![allow(missing_docs, reason = "Internal crate with self-explanatory API")]
#![allow(clippy::missing_errors_doc, reason = "Errors are self-explanatory from Result types")]
#![allow(missing_debug_implementations, reason = "Internal types")]
#![allow(clippy::missing_docs_in_private_items, reason = "Internal crate")]
#![allow(clippy::implicit_return, reason = "Implicit return is idiomatic Rust")]
#![allow(clippy::question_mark_used, reason = "? operator is idiomatic Rust")]
#![allow(clippy::min_ident_chars, reason = "Short error vars are idiomatic")]

mod config;
mod detection_service;
pub mod error;
mod report_service;
mod session_service;
mod text_analysis_service;

#[cfg(test)]
mod memory_store;
#[cfg(test)]
mod service_tests;

pub use config::{DEFAULT_STALE_SESSION_HOURS, ServiceConfig};
pub use detection_service::DetectionService;
pub use error::ServiceError;
pub use report_service::{ReportService, SessionDetail};
pub use session_service::{IngestReceipt, SessionService};
pub use text_analysis_service::{ResponseSubmission, TextAnalysisService};
