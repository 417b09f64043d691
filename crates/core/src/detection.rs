use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::RiskLevel;

/// Persisted outcome of one bot-detection run over a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionResult {
    pub id: String,
    pub session_id: String,
    pub is_bot: bool,
    pub confidence_score: f64,
    pub risk_level: RiskLevel,
    /// Per-method score in `[0, 1]`, keyed by method name.
    pub method_scores: BTreeMap<String, f64>,
    pub flags: Vec<String>,
    pub event_count: u32,
    pub processing_time_ms: u64,
    pub created_at: DateTime<Utc>,
}
