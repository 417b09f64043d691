use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use std::sync::Arc;

use survey_guard_core::TextAnalysis;

use crate::AppState;
use crate::api_error::ApiError;
use crate::metrics::Metrics;
use crate::query_types::AnalyzeResponseRequest;

pub async fn analyze_response(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    payload: Result<Json<AnalyzeResponseRequest>, JsonRejection>,
) -> Result<Json<TextAnalysis>, ApiError> {
    let Json(req) = payload?;
    let analysis =
        state.text_analysis_service.analyze_response(&session_id, req.into()).await?;
    Metrics::inc(&state.metrics.text_analyses);
    if analysis.checks.iter().any(|c| c.is_failure()) {
        Metrics::inc(&state.metrics.text_analysis_failures);
    }
    Ok(Json(analysis))
}

pub async fn list_analyses(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<Vec<TextAnalysis>>, ApiError> {
    Ok(Json(state.text_analysis_service.list_for_session(&session_id).await?))
}
