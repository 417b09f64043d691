use anyhow::Result;
use std::sync::Arc;
use survey_guard_http::{AppState, create_router, start_stale_session_sweeper};
use survey_guard_service::ServiceConfig;
use survey_guard_storage::PgStorage;

use crate::{build_llm_client, get_database_url};

pub(crate) async fn run(host: String, port: u16) -> Result<()> {
    let storage = Arc::new(PgStorage::new(&get_database_url()?).await?);
    let llm = build_llm_client()?;
    let config = ServiceConfig::from_env();
    tracing::info!(
        bot_threshold = config.bot_threshold,
        max_events_per_batch = config.max_events_per_batch,
        stale_session_hours = config.stale_session_hours,
        "service config loaded"
    );

    let state = Arc::new(AppState::new(storage, llm, config));
    start_stale_session_sweeper(Arc::clone(&state));

    let router = create_router(state);
    let addr = format!("{host}:{port}");
    tracing::info!("Starting HTTP server on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router).with_graceful_shutdown(shutdown_signal()).await?;
    tracing::info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
