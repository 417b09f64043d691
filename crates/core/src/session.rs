use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{MAX_ID_LEN, MAX_PLATFORM_ID_LEN, UNKNOWN_PLATFORM};
use crate::error::CoreError;

/// One respondent's survey-taking interaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub survey_id: String,
    pub platform_id: String,
    pub respondent_id: Option<String>,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    #[serde(default)]
    pub metadata: serde_json::Value,
    pub status: SessionStatus,
    pub event_count: u32,
    pub is_bot: Option<bool>,
    pub confidence_score: Option<f64>,
    pub risk_level: Option<RiskLevel>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_activity_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Build a fresh, active session from validated creation input.
    #[must_use]
    pub fn from_new(id: String, input: NewSession, now: DateTime<Utc>) -> Self {
        Self {
            id,
            survey_id: input.survey_id,
            platform_id: input.platform_id,
            respondent_id: input.respondent_id,
            user_agent: input.user_agent,
            ip_address: input.ip_address,
            metadata: input.metadata,
            status: SessionStatus::Active,
            event_count: 0,
            is_bot: None,
            confidence_score: None,
            risk_level: None,
            created_at: now,
            updated_at: now,
            last_activity_at: None,
        }
    }

    /// Whether new telemetry may still be attached to this session.
    #[must_use]
    pub fn accepts_events(&self) -> bool {
        self.status != SessionStatus::Completed
    }
}

/// Validated input for session creation.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub survey_id: String,
    pub platform_id: String,
    pub respondent_id: Option<String>,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub metadata: serde_json::Value,
}

impl NewSession {
    /// Validate raw creation fields.
    ///
    /// `survey_id` must be non-blank; ids are trimmed; the platform is
    /// normalized with [`normalize_platform_id`].
    pub fn validate(
        survey_id: &str,
        platform: Option<&str>,
        respondent_id: Option<&str>,
        user_agent: Option<String>,
        ip_address: Option<String>,
        metadata: Option<serde_json::Value>,
    ) -> Result<Self, CoreError> {
        let survey_id = survey_id.trim();
        if survey_id.is_empty() {
            return Err(CoreError::InvalidInput("survey_id must not be empty".to_owned()));
        }
        if survey_id.len() > MAX_ID_LEN {
            return Err(CoreError::InvalidInput(format!(
                "survey_id exceeds {MAX_ID_LEN} characters"
            )));
        }
        let respondent_id =
            respondent_id.map(str::trim).filter(|r| !r.is_empty()).map(ToOwned::to_owned);
        if respondent_id.as_ref().is_some_and(|r| r.len() > MAX_ID_LEN) {
            return Err(CoreError::InvalidInput(format!(
                "respondent_id exceeds {MAX_ID_LEN} characters"
            )));
        }
        let metadata = match metadata {
            None | Some(serde_json::Value::Null) => serde_json::Value::Object(Default::default()),
            Some(v @ serde_json::Value::Object(_)) => v,
            Some(_) => {
                return Err(CoreError::InvalidInput("metadata must be a JSON object".to_owned()));
            },
        };
        Ok(Self {
            survey_id: survey_id.to_owned(),
            platform_id: normalize_platform_id(platform),
            respondent_id,
            user_agent: user_agent.filter(|ua| !ua.trim().is_empty()),
            ip_address: ip_address.filter(|ip| !ip.trim().is_empty()),
            metadata,
        })
    }
}

/// Normalize a platform name into the `platform_id` key.
///
/// Trimmed and lowercased, truncated to the column width; blank input maps
/// to [`UNKNOWN_PLATFORM`].
#[must_use]
pub fn normalize_platform_id(platform: Option<&str>) -> String {
    let normalized: String = platform
        .map(str::trim)
        .unwrap_or_default()
        .to_lowercase()
        .chars()
        .take(MAX_PLATFORM_ID_LEN)
        .collect();
    if normalized.is_empty() { UNKNOWN_PLATFORM.to_owned() } else { normalized }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Completed,
    Analyzed,
}

impl SessionStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match *self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Analyzed => "analyzed",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            "analyzed" => Ok(Self::Analyzed),
            _ => Err(CoreError::InvalidInput(format!("Invalid session status: {s}"))),
        }
    }
}

/// Coarse risk bucket derived from the composite confidence score.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Bucket a score in `[0, 1]`: `<0.3` low, `<0.6` medium, `<0.8` high, else critical.
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score < 0.3 {
            Self::Low
        } else if score < 0.6 {
            Self::Medium
        } else if score < 0.8 {
            Self::High
        } else {
            Self::Critical
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match *self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            _ => Err(CoreError::InvalidInput(format!("Invalid risk level: {s}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_id_is_normalized() {
        assert_eq!(normalize_platform_id(Some("  Qualtrics ")), "qualtrics");
        assert_eq!(normalize_platform_id(Some("")), UNKNOWN_PLATFORM);
        assert_eq!(normalize_platform_id(None), UNKNOWN_PLATFORM);
        let long = "x".repeat(80);
        assert_eq!(normalize_platform_id(Some(&long)).len(), MAX_PLATFORM_ID_LEN);
    }

    #[test]
    fn new_session_rejects_blank_survey() {
        let err = NewSession::validate("   ", None, None, None, None, None).unwrap_err();
        assert!(err.to_string().contains("survey_id"));
    }

    #[test]
    fn new_session_rejects_non_object_metadata() {
        let result = NewSession::validate(
            "s1",
            Some("decipher"),
            None,
            None,
            None,
            Some(serde_json::json!([1, 2])),
        );
        assert!(result.is_err());
    }

    #[test]
    fn new_session_drops_blank_respondent() {
        let input =
            NewSession::validate("s1", Some("Decipher"), Some("  "), None, None, None).unwrap();
        assert_eq!(input.platform_id, "decipher");
        assert!(input.respondent_id.is_none());
        assert!(input.metadata.is_object());
    }

    #[test]
    fn risk_level_boundaries() {
        assert_eq!(RiskLevel::from_score(0.0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(0.29), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(0.3), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(0.6), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(0.8), RiskLevel::Critical);
        assert_eq!(RiskLevel::from_score(1.0), RiskLevel::Critical);
    }

    #[test]
    fn status_parses_round_trip_names() {
        for status in [SessionStatus::Active, SessionStatus::Completed, SessionStatus::Analyzed] {
            assert_eq!(status.as_str().parse::<SessionStatus>().unwrap(), status);
        }
        assert!("paused".parse::<SessionStatus>().is_err());
    }
}
