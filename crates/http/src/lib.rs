//! HTTP API server for survey-guard.

#![allow(missing_docs, reason = "Internal crate with self-explanatory API")]
#![allow(unreachable_pub, reason = "pub items are re-exported")]
#![allow(unused_results, reason = "Some results are intentionally ignored")]
#![allow(missing_copy_implementations, reason = "Types may grow")]
#![allow(let_underscore_drop, reason = "Intentionally dropping values")]
#![allow(missing_debug_implementations, reason = "Internal types")]
#![allow(clippy::missing_docs_in_private_items, reason = "Internal crate")]
#![allow(clippy::implicit_return, reason = "Implicit return is idiomatic Rust")]
#![allow(clippy::question_mark_used, reason = "? operator is idiomatic Rust")]
#![allow(clippy::min_ident_chars, reason = "Short closure params are idiomatic")]
#![allow(clippy::shadow_reuse, reason = "Shadowing for Arc clones is idiomatic")]
#![allow(clippy::exhaustive_structs, reason = "HTTP types are stable")]
#![allow(clippy::single_call_fn, reason = "Helper functions improve readability")]
#![allow(clippy::as_conversions, reason = "usize to u64 is lossless on supported targets")]

pub mod api_error;
mod handlers;
pub mod metrics;
mod query_types;
mod response_types;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Request, State},
    http::{HeaderValue, StatusCode, header::CONTENT_TYPE},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use survey_guard_llm::LlmClient;
use survey_guard_service::{
    DetectionService, ReportService, ServiceConfig, SessionService, TextAnalysisService,
};
use survey_guard_storage::{PgStorage, Storage};

pub use metrics::Metrics;
pub use response_types::{HealthResponse, ReadinessResponse};

/// How often the background sweep looks for abandoned sessions.
const STALE_SWEEP_INTERVAL: Duration = Duration::from_secs(600);

/// Shared application state for all HTTP handlers.
pub struct AppState {
    /// Concrete backend, kept for readiness pings.
    pub storage: Arc<PgStorage>,
    pub config: ServiceConfig,
    pub metrics: Metrics,
    pub session_service: SessionService,
    pub detection_service: DetectionService,
    pub text_analysis_service: TextAnalysisService,
    pub report_service: ReportService,
}

impl AppState {
    /// Wire every service onto one storage backend. Text analysis is
    /// disabled (503) when `llm` is `None`.
    #[must_use]
    pub fn new(storage: Arc<PgStorage>, llm: Option<Arc<LlmClient>>, config: ServiceConfig) -> Self {
        let shared: Arc<dyn Storage> = Arc::clone(&storage) as Arc<dyn Storage>;
        Self {
            session_service: SessionService::new(Arc::clone(&shared), config.max_events_per_batch),
            detection_service: DetectionService::new(Arc::clone(&shared), config.detection()),
            text_analysis_service: TextAnalysisService::new(Arc::clone(&shared), llm),
            report_service: ReportService::new(shared),
            storage,
            config,
            metrics: Metrics::default(),
        }
    }
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics_handler))
        .route("/api/v1/readiness", get(readiness))
        .route("/api/v1/detection/sessions", post(handlers::sessions::create_session))
        .route("/api/v1/detection/sessions/{id}", get(handlers::sessions::get_session))
        .route("/api/v1/detection/sessions/{id}/events", post(handlers::sessions::ingest_events))
        .route(
            "/api/v1/detection/sessions/{id}/complete",
            post(handlers::sessions::complete_session),
        )
        .route(
            "/api/v1/detection/sessions/{id}/analyze",
            post(handlers::sessions::analyze_session),
        )
        .route(
            "/api/v1/text-analysis/sessions/{id}/responses",
            post(handlers::text_analysis::analyze_response),
        )
        .route(
            "/api/v1/text-analysis/sessions/{id}",
            get(handlers::text_analysis::list_analyses),
        )
        .route("/api/v1/dashboard/overview", get(handlers::dashboard::overview))
        .route("/api/v1/dashboard/sessions", get(handlers::dashboard::list_sessions))
        .route("/api/v1/surveys", get(handlers::surveys::list_surveys))
        .route("/api/v1/surveys/{survey_id}", get(handlers::surveys::get_survey))
        .route("/api/v1/surveys/{survey_id}/platforms", get(handlers::surveys::list_platforms))
        .route(
            "/api/v1/surveys/{survey_id}/platforms/{platform_id}/respondents",
            get(handlers::surveys::list_respondents),
        )
        .route(
            "/api/v1/surveys/{survey_id}/platforms/{platform_id}/respondents/{respondent_id}/sessions",
            get(handlers::surveys::list_respondent_sessions),
        )
        .route(
            "/api/v1/surveys/{survey_id}/platforms/{platform_id}/respondents/{respondent_id}/sessions/{session_id}",
            get(handlers::surveys::get_session),
        )
        .layer(middleware::from_fn_with_state(Arc::clone(&state), count_errors))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&cors_origins_from_env()))
        .with_state(state)
}

/// Spawns the task that completes sessions idle longer than
/// `stale_session_hours`. Errors are logged and retried on the next tick.
pub fn start_stale_session_sweeper(state: Arc<AppState>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(STALE_SWEEP_INTERVAL);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            let hours = state.config.stale_session_hours;
            if let Err(e) = state.session_service.close_stale_sessions(hours).await {
                tracing::warn!(error = %e, "stale session sweep failed");
            }
        }
    });
}

fn cors_origins_from_env() -> String {
    survey_guard_core::env_non_empty("SURVEY_GUARD_CORS_ORIGINS").unwrap_or_else(|| "*".to_owned())
}

/// `*` allows any origin; otherwise a comma-separated allow-list. Origins
/// that are not valid header values are skipped with a warning.
fn cors_layer(origins: &str) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers([CONTENT_TYPE]);
    if origins.trim() == "*" {
        return layer.allow_origin(Any);
    }
    let allowed: Vec<HeaderValue> = origins
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = o, "ignoring invalid CORS origin");
                None
            },
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(allowed))
}

async fn count_errors(State(state): State<Arc<AppState>>, request: Request, next: Next) -> Response {
    let response = next.run(request).await;
    let status = response.status();
    if status.is_client_error() || status.is_server_error() {
        Metrics::inc(&state.metrics.http_errors);
    }
    response
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "healthy", version: env!("CARGO_PKG_VERSION") })
}

async fn readiness(State(state): State<Arc<AppState>>) -> (StatusCode, Json<ReadinessResponse>) {
    match state.storage.ping().await {
        Ok(()) => (StatusCode::OK, Json(ReadinessResponse { status: "ready", message: None })),
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ReadinessResponse {
                    status: "unavailable",
                    message: Some("database unreachable".to_owned()),
                }),
            )
        },
    }
}

async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        [(CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_and_list_cors_layers_build() {
        let _ = cors_layer("*");
        let _ = cors_layer("https://a.example, https://b.example,,");
        let _ = cors_layer("bad\norigin");
    }
}
