use survey_guard_core::{
    DEFAULT_BOT_THRESHOLD, DEFAULT_MAX_EVENTS_PER_BATCH, env_parse_with_default, env_unit_interval,
};
use survey_guard_detection::DetectionConfig;

/// Active sessions idle this long are completed by the background sweep.
pub const DEFAULT_STALE_SESSION_HOURS: i64 = 24;

/// Tunables read from the environment once at startup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ServiceConfig {
    pub bot_threshold: f64,
    pub max_events_per_batch: usize,
    pub stale_session_hours: i64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bot_threshold: DEFAULT_BOT_THRESHOLD,
            max_events_per_batch: DEFAULT_MAX_EVENTS_PER_BATCH,
            stale_session_hours: DEFAULT_STALE_SESSION_HOURS,
        }
    }
}

impl ServiceConfig {
    /// `SURVEY_GUARD_BOT_THRESHOLD`, `SURVEY_GUARD_MAX_EVENTS_PER_BATCH`,
    /// `SURVEY_GUARD_STALE_SESSION_HOURS`; invalid values fall back to defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            bot_threshold: env_unit_interval("SURVEY_GUARD_BOT_THRESHOLD", DEFAULT_BOT_THRESHOLD),
            max_events_per_batch: env_parse_with_default(
                "SURVEY_GUARD_MAX_EVENTS_PER_BATCH",
                DEFAULT_MAX_EVENTS_PER_BATCH,
            )
            .max(1),
            stale_session_hours: env_parse_with_default(
                "SURVEY_GUARD_STALE_SESSION_HOURS",
                DEFAULT_STALE_SESSION_HOURS,
            )
            .max(1),
        }
    }

    #[must_use]
    pub fn detection(&self) -> DetectionConfig {
        DetectionConfig { threshold: self.bot_threshold, ..DetectionConfig::default() }
    }
}
