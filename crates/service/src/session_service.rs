use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use survey_guard_core::{BehaviorEvent, NewSession, Session, SessionStatus};
use survey_guard_storage::{Storage, StorageError};

use crate::ServiceError;

/// Acknowledgement for an ingested event batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IngestReceipt {
    pub events_received: usize,
    pub total_events: u32,
}

pub struct SessionService {
    storage: Arc<dyn Storage>,
    max_events_per_batch: usize,
}

impl SessionService {
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>, max_events_per_batch: usize) -> Self {
        Self { storage, max_events_per_batch }
    }

    pub async fn create_session(&self, input: NewSession) -> Result<Session, ServiceError> {
        let session = Session::from_new(uuid::Uuid::new_v4().to_string(), input, Utc::now());
        self.storage.create_session(&session).await?;
        tracing::info!(
            session_id = %session.id,
            survey_id = %session.survey_id,
            platform_id = %session.platform_id,
            "session created"
        );
        Ok(session)
    }

    pub async fn get_session(&self, id: &str) -> Result<Session, ServiceError> {
        self.storage.get_session(id).await?.ok_or_else(|| ServiceError::session_not_found(id))
    }

    /// Append a batch of events.
    ///
    /// Empty and oversized batches are rejected before storage is touched.
    /// The completed check happens in the same transaction as the insert.
    pub async fn ingest_events(
        &self,
        session_id: &str,
        events: &[BehaviorEvent],
    ) -> Result<IngestReceipt, ServiceError> {
        if events.is_empty() {
            return Err(ServiceError::InvalidInput("events must not be empty".to_owned()));
        }
        if events.len() > self.max_events_per_batch {
            return Err(ServiceError::InvalidInput(format!(
                "batch of {} events exceeds the limit of {}",
                events.len(),
                self.max_events_per_batch
            )));
        }

        let total_events = match self.storage.insert_events(session_id, events).await {
            Ok(total) => total,
            Err(err @ StorageError::SessionClosed(_)) => {
                return Err(ServiceError::Conflict(err.to_string()));
            },
            Err(err) => return Err(err.into()),
        };
        tracing::debug!(session_id, received = events.len(), total_events, "events ingested");
        Ok(IngestReceipt { events_received: events.len(), total_events })
    }

    /// Mark an active session completed. Already completed or analyzed
    /// sessions are returned unchanged.
    pub async fn complete_session(&self, id: &str) -> Result<Session, ServiceError> {
        let mut session = self.get_session(id).await?;
        if session.status == SessionStatus::Active {
            if !self.storage.update_session_status(id, SessionStatus::Completed).await? {
                return Err(ServiceError::session_not_found(id));
            }
            session.status = SessionStatus::Completed;
            tracing::info!(session_id = id, event_count = session.event_count, "session completed");
        }
        Ok(session)
    }

    pub async fn close_stale_sessions(&self, max_age_hours: i64) -> Result<usize, ServiceError> {
        let closed = self.storage.close_stale_sessions(max_age_hours).await?;
        if closed > 0 {
            tracing::info!(closed, max_age_hours, "closed stale sessions");
        }
        Ok(closed)
    }
}
