//! PostgreSQL schema bootstrap.
//!
//! Every statement is idempotent, so this runs on each startup.

use anyhow::Result;
use sqlx::PgPool;

/// Promotes the legacy `platform` column to the indexed `platform_id` used by
/// hierarchy lookups. Order matters: the column must exist before the backfill.
pub(crate) const PLATFORM_ID_MIGRATION: [&str; 6] = [
    "ALTER TABLE sessions ADD COLUMN IF NOT EXISTS platform_id VARCHAR(50)",
    "UPDATE sessions SET platform_id = platform WHERE platform IS NOT NULL AND platform_id IS NULL",
    "CREATE INDEX IF NOT EXISTS idx_survey_platform_respondent_session ON sessions (survey_id, platform_id, respondent_id, id)",
    "CREATE INDEX IF NOT EXISTS idx_survey_platform ON sessions (survey_id, platform_id)",
    "CREATE INDEX IF NOT EXISTS idx_survey_platform_respondent ON sessions (survey_id, platform_id, respondent_id)",
    "CREATE INDEX IF NOT EXISTS idx_sessions_platform_id ON sessions (platform_id)",
];

pub async fn run_pg_migrations(pool: &PgPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sessions (
            id TEXT PRIMARY KEY,
            survey_id TEXT NOT NULL,
            platform TEXT,
            respondent_id TEXT,
            user_agent TEXT,
            ip_address TEXT,
            metadata JSONB NOT NULL DEFAULT '{}',
            status TEXT NOT NULL DEFAULT 'active',
            event_count INTEGER NOT NULL DEFAULT 0,
            is_bot BOOLEAN,
            confidence_score DOUBLE PRECISION,
            risk_level TEXT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            last_activity_at TIMESTAMPTZ
        )
        "#,
    )
    .execute(pool)
    .await?;

    for statement in PLATFORM_ID_MIGRATION {
        sqlx::query(statement).execute(pool).await?;
    }

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_sessions_status_created ON sessions (status, created_at)")
        .execute(pool)
        .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS behavior_events (
            id BIGSERIAL PRIMARY KEY,
            session_id TEXT NOT NULL REFERENCES sessions(id) ON DELETE CASCADE,
            event_type TEXT NOT NULL,
            occurred_at TIMESTAMPTZ NOT NULL,
            payload JSONB NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_events_session_time ON behavior_events (session_id, occurred_at)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS detection_results (
            id TEXT PRIMARY KEY,
            session_id TEXT NOT NULL REFERENCES sessions(id) ON DELETE CASCADE,
            is_bot BOOLEAN NOT NULL,
            confidence_score DOUBLE PRECISION NOT NULL,
            risk_level TEXT NOT NULL,
            method_scores JSONB NOT NULL DEFAULT '{}',
            flags JSONB NOT NULL DEFAULT '[]',
            event_count INTEGER NOT NULL DEFAULT 0,
            processing_time_ms BIGINT NOT NULL DEFAULT 0,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_detection_session_created ON detection_results (session_id, created_at DESC)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS text_analyses (
            id TEXT PRIMARY KEY,
            session_id TEXT NOT NULL REFERENCES sessions(id) ON DELETE CASCADE,
            question_id TEXT,
            question_text TEXT NOT NULL,
            response_text TEXT NOT NULL,
            quality_score INTEGER NOT NULL CHECK (quality_score BETWEEN 0 AND 100),
            is_flagged BOOLEAN NOT NULL,
            flags JSONB NOT NULL DEFAULT '[]',
            checks JSONB NOT NULL DEFAULT '[]',
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_text_analyses_session ON text_analyses (session_id, created_at)",
    )
    .execute(pool)
    .await?;

    tracing::debug!("PostgreSQL schema is up to date");
    Ok(())
}
