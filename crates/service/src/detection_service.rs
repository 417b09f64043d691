use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use survey_guard_core::DetectionResult;
use survey_guard_detection::{DetectionConfig, DetectionEngine, SessionContext};
use survey_guard_storage::Storage;

use crate::ServiceError;

pub struct DetectionService {
    storage: Arc<dyn Storage>,
    engine: DetectionEngine,
}

impl DetectionService {
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>, config: DetectionConfig) -> Self {
        Self { storage, engine: DetectionEngine::new(config) }
    }

    /// Score every stored event of the session and persist the verdict.
    ///
    /// Analysis may be repeated; each run stores a new result and the session
    /// row always carries the latest one.
    pub async fn analyze_session(&self, session_id: &str) -> Result<DetectionResult, ServiceError> {
        let session = self
            .storage
            .get_session(session_id)
            .await?
            .ok_or_else(|| ServiceError::session_not_found(session_id))?;
        let events = self.storage.get_events(session_id).await?;

        let started = Instant::now();
        let outcome = self
            .engine
            .analyze(&events, &SessionContext { user_agent: session.user_agent.as_deref() });
        let processing_time_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let result = DetectionResult {
            id: uuid::Uuid::new_v4().to_string(),
            session_id: session_id.to_owned(),
            is_bot: outcome.is_bot,
            confidence_score: outcome.confidence_score,
            risk_level: outcome.risk_level,
            method_scores: outcome.method_scores,
            flags: outcome.flags,
            event_count: u32::try_from(outcome.event_count).unwrap_or(u32::MAX),
            processing_time_ms,
            created_at: Utc::now(),
        };
        self.storage.save_detection_result(&result).await?;
        self.storage
            .record_detection_summary(
                session_id,
                result.is_bot,
                result.confidence_score,
                result.risk_level,
            )
            .await?;

        tracing::info!(
            session_id,
            is_bot = result.is_bot,
            confidence = result.confidence_score,
            risk = %result.risk_level,
            flags = ?result.flags,
            "session analyzed"
        );
        Ok(result)
    }

    pub async fn latest_result(
        &self,
        session_id: &str,
    ) -> Result<Option<DetectionResult>, ServiceError> {
        Ok(self.storage.latest_detection_result(session_id).await?)
    }
}
