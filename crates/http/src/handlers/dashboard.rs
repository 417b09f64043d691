use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};
use std::sync::Arc;

use survey_guard_core::{DashboardOverview, PaginatedResult, Session};

use crate::AppState;
use crate::api_error::ApiError;
use crate::query_types::SessionListQuery;

pub async fn overview(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DashboardOverview>, ApiError> {
    Ok(Json(state.report_service.overview().await?))
}

pub async fn list_sessions(
    State(state): State<Arc<AppState>>,
    query: Result<Query<SessionListQuery>, QueryRejection>,
) -> Result<Json<PaginatedResult<Session>>, ApiError> {
    let Query(query) = query?;
    let filter = query.filter().map_err(ApiError::BadRequest)?;
    let page = state
        .report_service
        .list_sessions(&filter, query.offset, query.capped_limit())
        .await?;
    Ok(Json(page))
}
