//! Response types (Serialize)

use chrono::{DateTime, Utc};
use serde::Serialize;
use survey_guard_core::{Session, SessionStatus};
use survey_guard_service::IngestReceipt;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SessionCreatedResponse {
    pub session_id: String,
    pub survey_id: String,
    pub platform_id: String,
    pub respondent_id: Option<String>,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
}

impl From<Session> for SessionCreatedResponse {
    fn from(session: Session) -> Self {
        Self {
            session_id: session.id,
            survey_id: session.survey_id,
            platform_id: session.platform_id,
            respondent_id: session.respondent_id,
            status: session.status,
            created_at: session.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EventsIngestedResponse {
    pub session_id: String,
    pub events_received: usize,
    pub total_events: u32,
}

impl EventsIngestedResponse {
    pub fn new(session_id: String, receipt: IngestReceipt) -> Self {
        Self {
            session_id,
            events_received: receipt.events_received,
            total_events: receipt.total_events,
        }
    }
}
