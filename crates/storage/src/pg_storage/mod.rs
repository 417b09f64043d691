//! PostgreSQL storage backend using sqlx.
//!
//! Split into modular files by domain concern.

#![allow(
    clippy::arithmetic_side_effects,
    reason = "DB row counts and pagination are bounded by PostgreSQL limits"
)]

mod detections;
mod events;
mod hierarchy;
mod sessions;
mod text_analyses;

use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use survey_guard_core::{
    DetectionResult, GroupStats, RiskLevel, Session, SessionStatus, TextAnalysis,
    ANONYMOUS_RESPONDENT, PG_POOL_ACQUIRE_TIMEOUT_SECS, PG_POOL_IDLE_TIMEOUT_SECS,
    PG_POOL_MAX_CONNECTIONS, UNKNOWN_PLATFORM,
};

use crate::error::StorageError;
use crate::pg_migrations::run_pg_migrations;

#[derive(Clone, Debug)]
pub struct PgStorage {
    pool: PgPool,
}

impl PgStorage {
    /// Connect and bring the schema up to date.
    pub async fn new(database_url: &str) -> Result<Self, StorageError> {
        let pool = pool_options().connect(database_url).await?;
        let storage = Self::from_pool(pool);
        storage.migrate().await?;
        tracing::info!("PgStorage initialized");
        Ok(storage)
    }

    /// Build the pool without opening a connection or touching the schema.
    ///
    /// The first query connects; nothing fails until then.
    pub fn connect_lazy(database_url: &str) -> Result<Self, StorageError> {
        Ok(Self::from_pool(pool_options().connect_lazy(database_url)?))
    }

    #[must_use]
    pub const fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<(), StorageError> {
        run_pg_migrations(&self.pool).await.map_err(|e| StorageError::Migration(e.to_string()))
    }

    /// Round-trip a trivial query; used by the readiness probe.
    pub async fn ping(&self) -> Result<(), StorageError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn pool_options() -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(PG_POOL_MAX_CONNECTIONS)
        .acquire_timeout(Duration::from_secs(PG_POOL_ACQUIRE_TIMEOUT_SECS))
        .idle_timeout(Duration::from_secs(PG_POOL_IDLE_TIMEOUT_SECS))
        .test_before_acquire(true)
}

/// Legacy rows may predate `platform_id`; they report under the unknown bucket.
pub(crate) const SESSION_COLUMNS: &str = "id, survey_id, COALESCE(platform_id, 'unknown') AS platform_id,
     respondent_id, user_agent, ip_address, metadata, status, event_count, is_bot,
     confidence_score, risk_level, created_at, updated_at, last_activity_at";

pub(crate) const DETECTION_COLUMNS: &str = "id, session_id, is_bot, confidence_score, risk_level,
     method_scores, flags, event_count, processing_time_ms, created_at";

pub(crate) const TEXT_ANALYSIS_COLUMNS: &str = "id, session_id, question_id, question_text,
     response_text, quality_score, is_flagged, flags, checks, created_at";

/// Aggregate columns shared by every hierarchy level; see [`row_to_stats`].
pub(crate) const GROUP_STATS_COLUMNS: &str = "COUNT(*) AS session_count,
     COUNT(*) FILTER (WHERE is_bot IS NOT NULL) AS analyzed_count,
     COUNT(*) FILTER (WHERE is_bot) AS bot_count,
     AVG(confidence_score) AS avg_confidence,
     MIN(created_at) AS first_seen,
     MAX(COALESCE(last_activity_at, created_at)) AS last_seen";

/// `platform_id = $n`, also matching legacy NULLs when asked for `"unknown"`.
pub(crate) fn platform_predicate(n: usize) -> String {
    format!("(platform_id = ${n} OR (${n} = '{UNKNOWN_PLATFORM}' AND platform_id IS NULL))")
}

/// `respondent_id = $n`, with `"anonymous"` selecting sessions without one.
pub(crate) fn respondent_predicate(n: usize) -> String {
    format!("(respondent_id = ${n} OR (${n} = '{ANONYMOUS_RESPONDENT}' AND respondent_id IS NULL))")
}

pub(crate) fn count_to_u64(count: i64) -> u64 {
    u64::try_from(count).unwrap_or(0)
}

pub(crate) fn to_i64(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn parse_column<T: std::str::FromStr>(column: &'static str, raw: &str) -> Result<T, StorageError>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.parse().map_err(|e| StorageError::corrupt(format!("invalid {column}: {raw}"), e))
}

pub(crate) fn row_to_session(row: &PgRow) -> Result<Session, StorageError> {
    let status: SessionStatus = parse_column("session status", &row.try_get::<String, _>("status")?)?;
    let risk_level: Option<RiskLevel> = row
        .try_get::<Option<String>, _>("risk_level")?
        .map(|raw| parse_column("risk_level", &raw))
        .transpose()?;
    let event_count: i32 = row.try_get("event_count")?;

    Ok(Session {
        id: row.try_get("id")?,
        survey_id: row.try_get("survey_id")?,
        platform_id: row.try_get("platform_id")?,
        respondent_id: row.try_get("respondent_id")?,
        user_agent: row.try_get("user_agent")?,
        ip_address: row.try_get("ip_address")?,
        metadata: row.try_get("metadata")?,
        status,
        event_count: u32::try_from(event_count).unwrap_or(0),
        is_bot: row.try_get("is_bot")?,
        confidence_score: row.try_get("confidence_score")?,
        risk_level,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        last_activity_at: row.try_get("last_activity_at")?,
    })
}

pub(crate) fn row_to_detection(row: &PgRow) -> Result<DetectionResult, StorageError> {
    let method_scores: serde_json::Value = row.try_get("method_scores")?;
    let flags: serde_json::Value = row.try_get("flags")?;
    let event_count: i32 = row.try_get("event_count")?;
    let processing_time_ms: i64 = row.try_get("processing_time_ms")?;

    Ok(DetectionResult {
        id: row.try_get("id")?,
        session_id: row.try_get("session_id")?,
        is_bot: row.try_get("is_bot")?,
        confidence_score: row.try_get("confidence_score")?,
        risk_level: parse_column("risk_level", &row.try_get::<String, _>("risk_level")?)?,
        method_scores: serde_json::from_value(method_scores)?,
        flags: serde_json::from_value(flags)?,
        event_count: u32::try_from(event_count).unwrap_or(0),
        processing_time_ms: u64::try_from(processing_time_ms).unwrap_or(0),
        created_at: row.try_get("created_at")?,
    })
}

pub(crate) fn row_to_text_analysis(row: &PgRow) -> Result<TextAnalysis, StorageError> {
    let quality_score: i32 = row.try_get("quality_score")?;
    let flags: serde_json::Value = row.try_get("flags")?;
    let checks: serde_json::Value = row.try_get("checks")?;

    Ok(TextAnalysis {
        id: row.try_get("id")?,
        session_id: row.try_get("session_id")?,
        question_id: row.try_get("question_id")?,
        question_text: row.try_get("question_text")?,
        response_text: row.try_get("response_text")?,
        quality_score: u8::try_from(quality_score.clamp(0, 100)).unwrap_or(0),
        is_flagged: row.try_get("is_flagged")?,
        flags: serde_json::from_value(flags)?,
        checks: serde_json::from_value(checks)?,
        created_at: row.try_get("created_at")?,
    })
}

pub(crate) fn row_to_stats(row: &PgRow) -> Result<GroupStats, StorageError> {
    let first_seen: Option<DateTime<Utc>> = row.try_get("first_seen")?;
    let last_seen: Option<DateTime<Utc>> = row.try_get("last_seen")?;
    let avg_confidence: Option<f64> = row.try_get("avg_confidence")?;
    Ok(GroupStats::new(
        count_to_u64(row.try_get("session_count")?),
        count_to_u64(row.try_get("analyzed_count")?),
        count_to_u64(row.try_get("bot_count")?),
        avg_confidence.map(|v| (v * 10_000.0).round() / 10_000.0),
        first_seen,
        last_seen,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hierarchy_predicates_cover_fallback_buckets() {
        assert_eq!(
            platform_predicate(2),
            "(platform_id = $2 OR ($2 = 'unknown' AND platform_id IS NULL))"
        );
        assert!(respondent_predicate(3).contains("$3 = 'anonymous' AND respondent_id IS NULL"));
    }

    #[test]
    fn negative_counts_clamp_to_zero() {
        assert_eq!(count_to_u64(-1), 0);
        assert_eq!(count_to_u64(42), 42);
    }
}
