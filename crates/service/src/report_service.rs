use std::sync::Arc;

use serde::Serialize;
use survey_guard_core::{
    DashboardOverview, DetectionResult, PaginatedResult, PlatformSummary, RespondentSummary,
    Session, SessionFilter, SurveySummary, TextAnalysis, normalize_platform_id,
};
use survey_guard_storage::Storage;

use crate::ServiceError;

/// A session together with everything recorded about it.
#[derive(Debug, Clone, Serialize)]
pub struct SessionDetail {
    pub session: Session,
    pub latest_detection: Option<DetectionResult>,
    pub text_analyses: Vec<TextAnalysis>,
}

/// Read-only hierarchy and dashboard queries.
pub struct ReportService {
    storage: Arc<dyn Storage>,
}

impl ReportService {
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub async fn list_surveys(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<PaginatedResult<SurveySummary>, ServiceError> {
        Ok(self.storage.list_surveys(offset, limit).await?)
    }

    pub async fn get_survey(&self, survey_id: &str) -> Result<SurveySummary, ServiceError> {
        self.storage
            .get_survey(survey_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("survey", survey_id))
    }

    pub async fn list_platforms(&self, survey_id: &str) -> Result<Vec<PlatformSummary>, ServiceError> {
        let platforms = self.storage.list_platforms(survey_id).await?;
        if platforms.is_empty() {
            return Err(ServiceError::not_found("survey", survey_id));
        }
        Ok(platforms)
    }

    pub async fn list_respondents(
        &self,
        survey_id: &str,
        platform_id: &str,
        offset: usize,
        limit: usize,
    ) -> Result<PaginatedResult<RespondentSummary>, ServiceError> {
        let platform_id = &normalize_platform_id(Some(platform_id));
        let page = self.storage.list_respondents(survey_id, platform_id, offset, limit).await?;
        if page.total == 0 {
            return Err(ServiceError::not_found("platform", format!("{survey_id}/{platform_id}")));
        }
        Ok(page)
    }

    pub async fn list_respondent_sessions(
        &self,
        survey_id: &str,
        platform_id: &str,
        respondent_id: &str,
    ) -> Result<Vec<Session>, ServiceError> {
        let platform_id = &normalize_platform_id(Some(platform_id));
        let sessions =
            self.storage.list_respondent_sessions(survey_id, platform_id, respondent_id).await?;
        if sessions.is_empty() {
            return Err(ServiceError::not_found(
                "respondent",
                format!("{survey_id}/{platform_id}/{respondent_id}"),
            ));
        }
        Ok(sessions)
    }

    /// Session detail reached through the drill-down path; 404 when the
    /// session exists but lives under a different path.
    pub async fn session_in_hierarchy(
        &self,
        survey_id: &str,
        platform_id: &str,
        respondent_id: &str,
        session_id: &str,
    ) -> Result<SessionDetail, ServiceError> {
        let platform_id = &normalize_platform_id(Some(platform_id));
        let session = self
            .storage
            .find_session_in_hierarchy(survey_id, platform_id, respondent_id, session_id)
            .await?
            .ok_or_else(|| ServiceError::session_not_found(session_id))?;
        self.detail(session).await
    }

    pub async fn session_detail(&self, session_id: &str) -> Result<SessionDetail, ServiceError> {
        let session = self
            .storage
            .get_session(session_id)
            .await?
            .ok_or_else(|| ServiceError::session_not_found(session_id))?;
        self.detail(session).await
    }

    async fn detail(&self, session: Session) -> Result<SessionDetail, ServiceError> {
        let latest_detection = self.storage.latest_detection_result(&session.id).await?;
        let text_analyses = self.storage.list_text_analyses(&session.id).await?;
        Ok(SessionDetail { session, latest_detection, text_analyses })
    }

    pub async fn list_sessions(
        &self,
        filter: &SessionFilter,
        offset: usize,
        limit: usize,
    ) -> Result<PaginatedResult<Session>, ServiceError> {
        Ok(self.storage.list_sessions(filter, offset, limit).await?)
    }

    pub async fn overview(&self) -> Result<DashboardOverview, ServiceError> {
        Ok(self.storage.dashboard_overview().await?)
    }
}
