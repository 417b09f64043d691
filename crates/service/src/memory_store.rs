//! In-memory `Storage` used by the service tests.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use survey_guard_core::{
    BehaviorEvent, DashboardOverview, DetectionResult, GroupStats, PaginatedResult,
    PlatformSummary, RespondentSummary, RiskLevel, Session, SessionFilter, SessionStatus,
    SurveySummary, TextAnalysis, ANONYMOUS_RESPONDENT,
};
use survey_guard_storage::{
    DetectionStore, EventStore, HierarchyStore, SessionStore, StorageError, TextAnalysisStore,
};
use tokio::sync::Mutex;

#[derive(Default)]
struct State {
    sessions: HashMap<String, Session>,
    events: HashMap<String, Vec<BehaviorEvent>>,
    detections: Vec<DetectionResult>,
    texts: Vec<TextAnalysis>,
}

#[derive(Default)]
pub(crate) struct MemoryStore {
    state: Mutex<State>,
}

fn missing(id: &str) -> StorageError {
    StorageError::NotFound { entity: "session", id: id.to_owned() }
}

fn in_path(s: &Session, survey: &str, platform: &str, respondent: &str) -> bool {
    s.survey_id == survey
        && s.platform_id == platform
        && s.respondent_id.as_deref().unwrap_or(ANONYMOUS_RESPONDENT) == respondent
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn create_session(&self, session: &Session) -> Result<(), StorageError> {
        let mut state = self.state.lock().await;
        if state.sessions.contains_key(&session.id) {
            return Err(StorageError::Duplicate(session.id.clone()));
        }
        state.sessions.insert(session.id.clone(), session.clone());
        Ok(())
    }

    async fn get_session(&self, id: &str) -> Result<Option<Session>, StorageError> {
        Ok(self.state.lock().await.sessions.get(id).cloned())
    }

    async fn update_session_status(
        &self,
        id: &str,
        status: SessionStatus,
    ) -> Result<bool, StorageError> {
        let mut state = self.state.lock().await;
        Ok(state.sessions.get_mut(id).map(|s| s.status = status).is_some())
    }

    async fn record_detection_summary(
        &self,
        id: &str,
        is_bot: bool,
        confidence_score: f64,
        risk_level: RiskLevel,
    ) -> Result<(), StorageError> {
        let mut state = self.state.lock().await;
        let session = state.sessions.get_mut(id).ok_or_else(|| missing(id))?;
        session.is_bot = Some(is_bot);
        session.confidence_score = Some(confidence_score);
        session.risk_level = Some(risk_level);
        session.status = SessionStatus::Analyzed;
        Ok(())
    }

    async fn delete_session(&self, id: &str) -> Result<bool, StorageError> {
        Ok(self.state.lock().await.sessions.remove(id).is_some())
    }

    async fn close_stale_sessions(&self, max_age_hours: i64) -> Result<usize, StorageError> {
        let cutoff = Utc::now() - chrono::Duration::hours(max_age_hours);
        let mut state = self.state.lock().await;
        let mut closed = 0;
        for session in state.sessions.values_mut() {
            let last = session.last_activity_at.unwrap_or(session.created_at);
            if session.status == SessionStatus::Active && last < cutoff {
                session.status = SessionStatus::Completed;
                closed += 1;
            }
        }
        Ok(closed)
    }

    async fn list_sessions(
        &self,
        filter: &SessionFilter,
        offset: usize,
        limit: usize,
    ) -> Result<PaginatedResult<Session>, StorageError> {
        let state = self.state.lock().await;
        let matching: Vec<Session> = state
            .sessions
            .values()
            .filter(|s| filter.survey_id.as_ref().is_none_or(|v| *v == s.survey_id))
            .filter(|s| filter.status.is_none_or(|v| v == s.status))
            .cloned()
            .collect();
        Ok(PaginatedResult {
            total: matching.len() as u64,
            items: matching.into_iter().skip(offset).take(limit).collect(),
            offset: offset as u64,
            limit: limit as u64,
        })
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn insert_events(
        &self,
        session_id: &str,
        events: &[BehaviorEvent],
    ) -> Result<u32, StorageError> {
        let mut state = self.state.lock().await;
        let session = state.sessions.get_mut(session_id).ok_or_else(|| missing(session_id))?;
        if !session.accepts_events() {
            return Err(StorageError::SessionClosed(session_id.to_owned()));
        }
        session.event_count += u32::try_from(events.len()).unwrap_or(u32::MAX);
        session.last_activity_at = Some(Utc::now());
        let total = session.event_count;
        state.events.entry(session_id.to_owned()).or_default().extend_from_slice(events);
        Ok(total)
    }

    async fn get_events(&self, session_id: &str) -> Result<Vec<BehaviorEvent>, StorageError> {
        let state = self.state.lock().await;
        let mut events = state.events.get(session_id).cloned().unwrap_or_default();
        events.sort_by_key(|e| e.timestamp);
        Ok(events)
    }

    async fn count_events(&self, session_id: &str) -> Result<u64, StorageError> {
        Ok(self.state.lock().await.events.get(session_id).map_or(0, |e| e.len() as u64))
    }
}

#[async_trait]
impl DetectionStore for MemoryStore {
    async fn save_detection_result(&self, result: &DetectionResult) -> Result<(), StorageError> {
        self.state.lock().await.detections.push(result.clone());
        Ok(())
    }

    async fn latest_detection_result(
        &self,
        session_id: &str,
    ) -> Result<Option<DetectionResult>, StorageError> {
        let state = self.state.lock().await;
        Ok(state.detections.iter().rev().find(|d| d.session_id == session_id).cloned())
    }
}

#[async_trait]
impl TextAnalysisStore for MemoryStore {
    async fn save_text_analysis(&self, analysis: &TextAnalysis) -> Result<(), StorageError> {
        self.state.lock().await.texts.push(analysis.clone());
        Ok(())
    }

    async fn list_text_analyses(&self, session_id: &str) -> Result<Vec<TextAnalysis>, StorageError> {
        let state = self.state.lock().await;
        Ok(state.texts.iter().filter(|t| t.session_id == session_id).cloned().collect())
    }
}

/// Only the lookups the service tests exercise carry real data.
#[async_trait]
impl HierarchyStore for MemoryStore {
    async fn list_surveys(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<PaginatedResult<SurveySummary>, StorageError> {
        Ok(PaginatedResult { items: vec![], total: 0, offset: offset as u64, limit: limit as u64 })
    }

    async fn get_survey(&self, survey_id: &str) -> Result<Option<SurveySummary>, StorageError> {
        let state = self.state.lock().await;
        let count = state.sessions.values().filter(|s| s.survey_id == survey_id).count() as u64;
        Ok((count > 0).then(|| SurveySummary {
            survey_id: survey_id.to_owned(),
            platform_count: 1,
            respondent_count: 1,
            stats: GroupStats::new(count, 0, 0, None, None, None),
        }))
    }

    async fn list_platforms(&self, _survey_id: &str) -> Result<Vec<PlatformSummary>, StorageError> {
        Ok(vec![])
    }

    async fn list_respondents(
        &self,
        _survey_id: &str,
        _platform_id: &str,
        offset: usize,
        limit: usize,
    ) -> Result<PaginatedResult<RespondentSummary>, StorageError> {
        Ok(PaginatedResult { items: vec![], total: 0, offset: offset as u64, limit: limit as u64 })
    }

    async fn list_respondent_sessions(
        &self,
        survey_id: &str,
        platform_id: &str,
        respondent_id: &str,
    ) -> Result<Vec<Session>, StorageError> {
        let state = self.state.lock().await;
        Ok(state
            .sessions
            .values()
            .filter(|s| in_path(s, survey_id, platform_id, respondent_id))
            .cloned()
            .collect())
    }

    async fn find_session_in_hierarchy(
        &self,
        survey_id: &str,
        platform_id: &str,
        respondent_id: &str,
        session_id: &str,
    ) -> Result<Option<Session>, StorageError> {
        let state = self.state.lock().await;
        Ok(state
            .sessions
            .get(session_id)
            .filter(|s| in_path(s, survey_id, platform_id, respondent_id))
            .cloned())
    }

    async fn dashboard_overview(&self) -> Result<DashboardOverview, StorageError> {
        Ok(DashboardOverview::default())
    }
}
