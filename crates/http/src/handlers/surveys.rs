//! Drill-down reports: survey → platform → respondent → session.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
};
use std::sync::Arc;

use survey_guard_core::{
    PaginatedResult, PlatformSummary, RespondentSummary, Session, SurveySummary,
};
use survey_guard_service::SessionDetail;

use crate::AppState;
use crate::api_error::ApiError;
use crate::query_types::PaginationQuery;

pub async fn list_surveys(
    State(state): State<Arc<AppState>>,
    query: Result<Query<PaginationQuery>, QueryRejection>,
) -> Result<Json<PaginatedResult<SurveySummary>>, ApiError> {
    let Query(query) = query?;
    Ok(Json(state.report_service.list_surveys(query.offset, query.capped_limit()).await?))
}

pub async fn get_survey(
    State(state): State<Arc<AppState>>,
    Path(survey_id): Path<String>,
) -> Result<Json<SurveySummary>, ApiError> {
    Ok(Json(state.report_service.get_survey(&survey_id).await?))
}

pub async fn list_platforms(
    State(state): State<Arc<AppState>>,
    Path(survey_id): Path<String>,
) -> Result<Json<Vec<PlatformSummary>>, ApiError> {
    Ok(Json(state.report_service.list_platforms(&survey_id).await?))
}

pub async fn list_respondents(
    State(state): State<Arc<AppState>>,
    Path((survey_id, platform_id)): Path<(String, String)>,
    query: Result<Query<PaginationQuery>, QueryRejection>,
) -> Result<Json<PaginatedResult<RespondentSummary>>, ApiError> {
    let Query(query) = query?;
    let page = state
        .report_service
        .list_respondents(&survey_id, &platform_id, query.offset, query.capped_limit())
        .await?;
    Ok(Json(page))
}

pub async fn list_respondent_sessions(
    State(state): State<Arc<AppState>>,
    Path((survey_id, platform_id, respondent_id)): Path<(String, String, String)>,
) -> Result<Json<Vec<Session>>, ApiError> {
    let sessions = state
        .report_service
        .list_respondent_sessions(&survey_id, &platform_id, &respondent_id)
        .await?;
    Ok(Json(sessions))
}

pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path((survey_id, platform_id, respondent_id, session_id)): Path<(
        String,
        String,
        String,
        String,
    )>,
) -> Result<Json<SessionDetail>, ApiError> {
    let detail = state
        .report_service
        .session_in_hierarchy(&survey_id, &platform_id, &respondent_id, &session_id)
        .await?;
    Ok(Json(detail))
}
