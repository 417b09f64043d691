//! Shared constants for survey-guard.
//!
//! Centralizes limits and defaults used by storage, service and HTTP crates.

/// Maximum number of rows for any listing query (DoS protection).
pub const MAX_QUERY_LIMIT: usize = 1000;

/// Default number of rows when the caller does not pass `limit`.
pub const DEFAULT_QUERY_LIMIT: usize = 50;

/// PostgreSQL connection pool: maximum connections.
pub const PG_POOL_MAX_CONNECTIONS: u32 = 20;

/// PostgreSQL connection pool: acquire timeout in seconds.
pub const PG_POOL_ACQUIRE_TIMEOUT_SECS: u64 = 10;

/// PostgreSQL connection pool: idle timeout in seconds.
pub const PG_POOL_IDLE_TIMEOUT_SECS: u64 = 300;

/// Maximum events accepted in one ingestion batch unless overridden.
pub const DEFAULT_MAX_EVENTS_PER_BATCH: usize = 5000;

/// Maximum length of `survey_id` / `respondent_id`.
pub const MAX_ID_LEN: usize = 255;

/// Maximum length of `platform_id` (matches the `VARCHAR(50)` column).
pub const MAX_PLATFORM_ID_LEN: usize = 50;

/// Group label for sessions that arrived without a platform.
pub const UNKNOWN_PLATFORM: &str = "unknown";

/// Group label for sessions that arrived without a respondent id.
pub const ANONYMOUS_RESPONDENT: &str = "anonymous";

/// Default `is_bot` cut-off for the composite confidence score.
pub const DEFAULT_BOT_THRESHOLD: f64 = 0.7;

/// Maximum length of a free-text survey response sent to the LLM.
pub const MAX_RESPONSE_TEXT_LEN: usize = 10_000;

/// Error message when text analysis has no LLM backend.
pub const TEXT_ANALYSIS_NOT_CONFIGURED: &str =
    "Text analysis not configured (OPENAI_API_KEY not set)";
