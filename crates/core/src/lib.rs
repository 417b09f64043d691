//! Core types and helpers for survey-guard
//!
//! Domain types shared across all other crates: sessions, behavioral events,
//! detection results, text analyses and hierarchy report rows.

mod constants;
mod detection;
mod env_config;
mod error;
mod event;
mod hierarchy;
mod session;
mod text_analysis;

pub use constants::*;
pub use detection::*;
pub use env_config::*;
pub use error::*;
pub use event::*;
pub use hierarchy::*;
pub use session::*;
pub use text_analysis::*;
