//! Report rows for the survey → platform → respondent → session drill-down.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::SessionStatus;

/// Aggregate counters shared by every hierarchy level.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupStats {
    pub session_count: u64,
    pub analyzed_count: u64,
    pub bot_count: u64,
    /// `bot_count / analyzed_count`, 0 when nothing has been analyzed.
    pub bot_rate: f64,
    pub avg_confidence: Option<f64>,
    pub first_seen: Option<DateTime<Utc>>,
    pub last_seen: Option<DateTime<Utc>>,
}

impl GroupStats {
    #[must_use]
    pub fn new(
        session_count: u64,
        analyzed_count: u64,
        bot_count: u64,
        avg_confidence: Option<f64>,
        first_seen: Option<DateTime<Utc>>,
        last_seen: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            session_count,
            analyzed_count,
            bot_count,
            bot_rate: bot_rate(bot_count, analyzed_count),
            avg_confidence,
            first_seen,
            last_seen,
        }
    }
}

/// Ratio of bots among analyzed sessions, rounded to 4 decimals.
#[must_use]
#[allow(clippy::cast_precision_loss, reason = "counts are far below 2^52")]
pub fn bot_rate(bot_count: u64, analyzed_count: u64) -> f64 {
    if analyzed_count == 0 {
        return 0.0;
    }
    let rate = bot_count as f64 / analyzed_count as f64;
    (rate * 10_000.0).round() / 10_000.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveySummary {
    pub survey_id: String,
    pub platform_count: u64,
    pub respondent_count: u64,
    #[serde(flatten)]
    pub stats: GroupStats,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformSummary {
    pub survey_id: String,
    pub platform_id: String,
    pub respondent_count: u64,
    #[serde(flatten)]
    pub stats: GroupStats,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RespondentSummary {
    pub survey_id: String,
    pub platform_id: String,
    pub respondent_id: String,
    #[serde(flatten)]
    pub stats: GroupStats,
}

/// Service-wide totals for the dashboard landing page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardOverview {
    pub survey_count: u64,
    pub platform_count: u64,
    pub respondent_count: u64,
    pub active_sessions: u64,
    pub total_events: u64,
    pub text_analysis_count: u64,
    pub flagged_text_count: u64,
    #[serde(flatten)]
    pub stats: GroupStats,
}

/// Filters for the dashboard session listing.
#[derive(Debug, Clone, Default)]
pub struct SessionFilter {
    pub survey_id: Option<String>,
    pub platform_id: Option<String>,
    pub respondent_id: Option<String>,
    pub is_bot: Option<bool>,
    pub status: Option<SessionStatus>,
}

/// Generic paginated result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResult<T> {
    /// Items in the current page.
    pub items: Vec<T>,
    /// Total number of items across all pages.
    pub total: u64,
    /// Offset from the start.
    pub offset: u64,
    /// Maximum items per page.
    pub limit: u64,
}
