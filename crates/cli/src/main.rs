#![allow(clippy::print_stdout, reason = "check command prints its report")]

mod commands;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use survey_guard_llm::LlmClient;
use survey_guard_llm::client::DEFAULT_BASE_URL;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "survey-guard")]
#[command(about = "Survey bot detection service", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        #[arg(short = 'H', long, default_value = "0.0.0.0")]
        host: String,
        #[arg(short, long, default_value = "8000")]
        port: u16,
    },
    /// Connect, bootstrap the schema and print the dashboard overview
    Check,
}

pub(crate) fn get_database_url() -> Result<String> {
    survey_guard_core::env_non_empty("DATABASE_URL")
        .context("DATABASE_URL environment variable must be set")
}

/// `None` when `OPENAI_API_KEY` is unset; text analysis then answers 503.
pub(crate) fn build_llm_client() -> Result<Option<Arc<LlmClient>>> {
    let Some(api_key) = survey_guard_core::env_non_empty("OPENAI_API_KEY") else {
        tracing::warn!("OPENAI_API_KEY not set, text analysis disabled");
        return Ok(None);
    };
    let base_url = survey_guard_core::env_non_empty("OPENAI_BASE_URL")
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());
    let client = LlmClient::new(api_key, base_url)?;
    tracing::info!(model = client.model(), base_url = client.base_url(), "LLM client configured");
    Ok(Some(Arc::new(client)))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Serve { host, port } => commands::serve::run(host, port).await,
        Commands::Check => commands::check::run().await,
    }
}
