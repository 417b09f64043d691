use async_trait::async_trait;
use survey_guard_core::{
    DashboardOverview, PaginatedResult, PlatformSummary, RespondentSummary, Session, SurveySummary,
};

use crate::error::StorageError;

/// Grouped reads for the survey → platform → respondent → session drill-down.
///
/// Sessions without a platform group under `"unknown"`, sessions without a
/// respondent under `"anonymous"`; both labels are accepted as path keys.
#[async_trait]
pub trait HierarchyStore: Send + Sync {
    async fn list_surveys(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<PaginatedResult<SurveySummary>, StorageError>;

    async fn get_survey(&self, survey_id: &str) -> Result<Option<SurveySummary>, StorageError>;

    async fn list_platforms(&self, survey_id: &str)
    -> Result<Vec<PlatformSummary>, StorageError>;

    async fn list_respondents(
        &self,
        survey_id: &str,
        platform_id: &str,
        offset: usize,
        limit: usize,
    ) -> Result<PaginatedResult<RespondentSummary>, StorageError>;

    async fn list_respondent_sessions(
        &self,
        survey_id: &str,
        platform_id: &str,
        respondent_id: &str,
    ) -> Result<Vec<Session>, StorageError>;

    /// A session, but only if it sits under the given path.
    async fn find_session_in_hierarchy(
        &self,
        survey_id: &str,
        platform_id: &str,
        respondent_id: &str,
        session_id: &str,
    ) -> Result<Option<Session>, StorageError>;

    async fn dashboard_overview(&self) -> Result<DashboardOverview, StorageError>;
}
