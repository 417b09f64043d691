//! Typed error enum for the service layer.
//!
//! Collects storage, LLM and validation failures so the HTTP layer can map
//! each onto a status code without downcasting.

use survey_guard_core::CoreError;
use survey_guard_llm::LlmError;
use survey_guard_storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Storage operation failed (DB, not found, duplicate, etc.).
    #[error("storage: {0}")]
    Storage(#[from] StorageError),

    #[error("llm: {0}")]
    Llm(#[from] LlmError),

    /// Caller provided invalid input (empty ids, oversized batches).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Request is well-formed but the entity's state forbids it.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Optional backend (the LLM) is not configured.
    #[error("not configured: {0}")]
    NotConfigured(String),

    #[error("serialization: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ServiceError {
    pub(crate) fn session_not_found(id: &str) -> Self {
        Self::Storage(StorageError::NotFound { entity: "session", id: id.to_owned() })
    }

    pub(crate) fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::Storage(StorageError::NotFound { entity, id: id.into() })
    }

    /// Whether this error is likely transient (worth retrying).
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Storage(e) => e.is_transient(),
            Self::Llm(e) => e.is_transient(),
            _ => false,
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Storage(StorageError::NotFound { .. }))
    }
}

/// Domain validation failures are the caller's fault.
impl From<CoreError> for ServiceError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Serialization(e) => Self::Serialization(e),
            other => Self::InvalidInput(other.to_string()),
        }
    }
}
