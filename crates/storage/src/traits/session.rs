use async_trait::async_trait;
use survey_guard_core::{PaginatedResult, RiskLevel, Session, SessionFilter, SessionStatus};

use crate::error::StorageError;

/// Session lifecycle operations.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Insert a new session. Fails with `Duplicate` if the id is taken.
    async fn create_session(&self, session: &Session) -> Result<(), StorageError>;

    async fn get_session(&self, id: &str) -> Result<Option<Session>, StorageError>;

    /// Returns `false` if no session has this id.
    async fn update_session_status(
        &self,
        id: &str,
        status: SessionStatus,
    ) -> Result<bool, StorageError>;

    /// Copy the latest verdict onto the session row and mark it analyzed.
    async fn record_detection_summary(
        &self,
        id: &str,
        is_bot: bool,
        confidence_score: f64,
        risk_level: RiskLevel,
    ) -> Result<(), StorageError>;

    /// Delete session and, by cascade, everything recorded for it.
    async fn delete_session(&self, id: &str) -> Result<bool, StorageError>;

    /// Complete active sessions idle for longer than `max_age_hours`.
    async fn close_stale_sessions(&self, max_age_hours: i64) -> Result<usize, StorageError>;

    async fn list_sessions(
        &self,
        filter: &SessionFilter,
        offset: usize,
        limit: usize,
    ) -> Result<PaginatedResult<Session>, StorageError>;
}
