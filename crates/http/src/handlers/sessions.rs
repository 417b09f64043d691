//! Detection endpoints: session lifecycle, event ingestion and analysis.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use std::sync::Arc;

use survey_guard_core::{DetectionResult, NewSession, Session};
use survey_guard_service::SessionDetail;

use crate::AppState;
use crate::api_error::ApiError;
use crate::metrics::Metrics;
use crate::query_types::{CreateSessionRequest, IngestEventsRequest};
use crate::response_types::{EventsIngestedResponse, SessionCreatedResponse};

pub async fn create_session(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateSessionRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SessionCreatedResponse>), ApiError> {
    let Json(req) = payload?;
    let input = NewSession::validate(
        &req.survey_id,
        req.platform.as_deref(),
        req.respondent_id.as_deref(),
        req.user_agent,
        req.ip_address,
        req.metadata,
    )
    .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let session = state.session_service.create_session(input).await?;
    Metrics::inc(&state.metrics.sessions_created);
    Ok((StatusCode::CREATED, Json(session.into())))
}

pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionDetail>, ApiError> {
    Ok(Json(state.report_service.session_detail(&id).await?))
}

pub async fn ingest_events(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<IngestEventsRequest>, JsonRejection>,
) -> Result<Json<EventsIngestedResponse>, ApiError> {
    let Json(req) = payload?;
    let receipt = state.session_service.ingest_events(&id, &req.events).await?;
    Metrics::add(&state.metrics.events_ingested, receipt.events_received as u64);
    Ok(Json(EventsIngestedResponse::new(id, receipt)))
}

pub async fn complete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Session>, ApiError> {
    Ok(Json(state.session_service.complete_session(&id).await?))
}

pub async fn analyze_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DetectionResult>, ApiError> {
    let result = state.detection_service.analyze_session(&id).await?;
    Metrics::inc(&state.metrics.analyses);
    if result.is_bot {
        Metrics::inc(&state.metrics.bots_detected);
    }
    Ok(Json(result))
}
