use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Prefix of the `reason` field when a check could not be completed.
pub const ANALYSIS_FAILED_PREFIX: &str = "Analysis failed";

/// Neutral score used when a check has no usable answer.
pub const NEUTRAL_CHECK_SCORE: u8 = 50;

/// The five text-quality dimensions evaluated for a free-text answer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum TextCheck {
    Gibberish,
    CopyPaste,
    Relevance,
    GenericResponse,
    Effort,
}

impl TextCheck {
    pub const ALL: [Self; 5] =
        [Self::Gibberish, Self::CopyPaste, Self::Relevance, Self::GenericResponse, Self::Effort];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match *self {
            Self::Gibberish => "gibberish",
            Self::CopyPaste => "copy_paste",
            Self::Relevance => "relevance",
            Self::GenericResponse => "generic_response",
            Self::Effort => "effort",
        }
    }
}

impl fmt::Display for TextCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TextCheck {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| CoreError::InvalidInput(format!("Unknown text check: {s}")))
    }
}

/// Outcome of a single text-quality check.
///
/// `score` is the quality along this dimension: 100 is best.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextCheckResult {
    pub check: TextCheck,
    pub score: u8,
    pub flagged: bool,
    pub reason: String,
    /// Set only when the check could not be run; `reason` then holds the error.
    #[serde(default)]
    pub failed: bool,
}

impl TextCheckResult {
    /// Neutral result used as the template when a check fails.
    #[must_use]
    pub fn default_for(check: TextCheck) -> Self {
        Self {
            check,
            score: NEUTRAL_CHECK_SCORE,
            flagged: false,
            reason: "No analysis performed".to_owned(),
            failed: false,
        }
    }

    /// Neutral stand-in for a check that errored.
    #[must_use]
    pub fn failure(check: TextCheck, error: impl fmt::Display) -> Self {
        Self {
            reason: format!("{ANALYSIS_FAILED_PREFIX}: {error}"),
            failed: true,
            ..Self::default_for(check)
        }
    }

    /// Whether this result stands in for a failed check.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        self.failed
    }
}

/// Aggregated text-quality verdict for one survey answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextAnalysis {
    pub id: String,
    pub session_id: String,
    pub question_id: Option<String>,
    pub question_text: String,
    pub response_text: String,
    pub quality_score: u8,
    pub is_flagged: bool,
    pub flags: Vec<String>,
    pub checks: Vec<TextCheckResult>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_check_names_parse() {
        for check in TextCheck::ALL {
            assert_eq!(check.as_str().parse::<TextCheck>().unwrap(), check);
        }
        assert!("spelling".parse::<TextCheck>().is_err());
    }

    #[test]
    fn failure_comes_from_the_flag_not_the_reason() {
        let mut result = TextCheckResult::default_for(TextCheck::Relevance);
        result.reason = "Analysis failed: respondent wrote one word".to_owned();
        assert!(!result.is_failure());

        let failed = TextCheckResult::failure(TextCheck::Relevance, "timeout");
        assert!(failed.is_failure());
        assert_eq!(failed.reason, "Analysis failed: timeout");
        assert_eq!(failed.score, NEUTRAL_CHECK_SCORE);
    }

    #[test]
    fn stored_checks_without_flag_deserialize_as_completed() {
        let json = r#"{"check":"effort","score":12,"flagged":true,"reason":"Analysis failed: meh"}"#;
        let result: TextCheckResult = serde_json::from_str(json).unwrap();
        assert!(!result.is_failure());
    }
}
