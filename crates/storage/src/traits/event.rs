use async_trait::async_trait;
use survey_guard_core::BehaviorEvent;

use crate::error::StorageError;

/// Behavioral telemetry persistence.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Append a batch in one transaction and bump the session's counters.
    ///
    /// Returns the session's event total after the insert.
    async fn insert_events(
        &self,
        session_id: &str,
        events: &[BehaviorEvent],
    ) -> Result<u32, StorageError>;

    /// All events of a session, oldest first.
    async fn get_events(&self, session_id: &str) -> Result<Vec<BehaviorEvent>, StorageError>;

    async fn count_events(&self, session_id: &str) -> Result<u64, StorageError>;
}
