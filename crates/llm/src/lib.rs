//! LLM client and text-quality analysis for open-ended survey answers.
//!
//! Talks to any OpenAI-compatible chat-completions endpoint.

#![allow(clippy::missing_errors_doc, reason = "Errors are self-explanatory from Result types")]
#![allow(missing_debug_implementations, reason = "Internal types")]
#![allow(clippy::missing_docs_in_private_items, reason = "Internal crate")]
#![allow(clippy::implicit_return, reason = "Implicit return is idiomatic Rust")]
#![allow(clippy::question_mark_used, reason = "? operator is idiomatic Rust")]
#![allow(clippy::as_conversions, reason = "Score conversions are clamped first")]
#![allow(clippy::arithmetic_side_effects, reason = "Backoff arithmetic is bounded")]

pub mod ai_types;
pub mod client;
pub mod error;
mod prompts;
pub mod rate_limit;
pub mod text_quality;

#[cfg(test)]
mod retry_tests;
#[cfg(test)]
mod text_quality_tests;

pub use client::LlmClient;
pub use error::LlmError;
pub use rate_limit::RateLimiter;
pub use text_quality::{
    TextQualityAnalyzer, TextQualityReport, aggregate, looks_like_gibberish, process_result,
};
