//! LLM-backed quality checks for open-ended survey answers.
//!
//! The five checks in [`TextCheck::ALL`] run concurrently. A failed check
//! never fails the analysis: [`process_result`] logs it and substitutes a
//! neutral result whose reason carries the error message.

use std::sync::Arc;

use futures_util::future::join_all;
use serde::Serialize;
use survey_guard_core::{NEUTRAL_CHECK_SCORE, TextCheck, TextCheckResult};

use crate::ai_types::{ChatRequest, CheckJson, Message, ResponseFormat};
use crate::client::{strip_markdown_json, truncate, LlmClient};
use crate::error::LlmError;
use crate::prompts::{build_check_prompt, SYSTEM_PROMPT};

/// Composite scores below this flag the answer.
pub const FLAG_SCORE_THRESHOLD: u8 = 40;

/// Upper bound on the composite when the local gibberish heuristic fires.
pub const GIBBERISH_SCORE_CAP: u8 = 20;

const KEYBOARD_RUNS: &[&str] = &[
    "qwert", "asdf", "sdfg", "dfgh", "fghj", "ghjk", "hjkl", "zxcv", "xcvb", "cvbn", "vbnm", "uiop",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextQualityReport {
    pub quality_score: u8,
    pub is_flagged: bool,
    pub flags: Vec<String>,
    pub checks: Vec<TextCheckResult>,
}

pub struct TextQualityAnalyzer {
    llm: Arc<LlmClient>,
}

impl TextQualityAnalyzer {
    #[must_use]
    pub const fn new(llm: Arc<LlmClient>) -> Self {
        Self { llm }
    }

    /// Run all checks for one answer. Never fails; see [`process_result`].
    pub async fn analyze(&self, session_id: &str, question: &str, response: &str) -> TextQualityReport {
        if response.trim().is_empty() {
            return empty_response_report();
        }

        let pending = TextCheck::ALL.map(|check| async move {
            (check, self.run_check(check, question, response).await)
        });
        let checks: Vec<TextCheckResult> = join_all(pending)
            .await
            .into_iter()
            .map(|(check, outcome)| process_result(session_id, check, outcome))
            .collect();

        let report = aggregate(checks, looks_like_gibberish(response));
        tracing::info!(
            session_id,
            quality_score = report.quality_score,
            flags = ?report.flags,
            "text quality analysis finished"
        );
        report
    }

    async fn run_check(
        &self,
        check: TextCheck,
        question: &str,
        response: &str,
    ) -> Result<TextCheckResult, LlmError> {
        let request = ChatRequest {
            model: self.llm.model().to_owned(),
            messages: vec![
                Message::system(SYSTEM_PROMPT),
                Message::user(build_check_prompt(check, question, response)),
            ],
            response_format: ResponseFormat::json_object(),
            temperature: Some(0.0),
        };
        let content = self.llm.chat_completion(&request).await?;
        parse_check_response(check, &content)
    }
}

pub(crate) fn parse_check_response(
    check: TextCheck,
    content: &str,
) -> Result<TextCheckResult, LlmError> {
    let body = strip_markdown_json(content);
    let parsed: CheckJson = serde_json::from_str(body).map_err(|e| LlmError::JsonParse {
        context: format!("{check} check result (content: {})", truncate(body, 200)),
        source: e,
    })?;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, reason = "clamped to 0..=100")]
    let score = parsed.score.clamp(0.0, 100.0).round() as u8;
    let reason = parsed.reason.trim();
    Ok(TextCheckResult {
        check,
        score,
        flagged: parsed.flagged.unwrap_or(score < FLAG_SCORE_THRESHOLD),
        reason: if reason.is_empty() { "No reason given".to_owned() } else { reason.to_owned() },
        failed: false,
    })
}

/// Turn a check outcome into a result, surfacing failures in `reason`.
///
/// On error the failure is logged with its context and the neutral default
/// result is returned marked `failed`, with `reason` set to
/// `"Analysis failed: <error>"`.
pub fn process_result(
    session_id: &str,
    check: TextCheck,
    outcome: Result<TextCheckResult, LlmError>,
) -> TextCheckResult {
    match outcome {
        Ok(result) => result,
        Err(err) => {
            tracing::error!(session_id, check = %check, error = ?err, "text quality check failed");
            TextCheckResult::failure(check, err)
        },
    }
}

/// Combine per-check results into the answer-level verdict.
#[must_use]
pub fn aggregate(checks: Vec<TextCheckResult>, heuristic_gibberish: bool) -> TextQualityReport {
    let scored: Vec<u32> =
        checks.iter().filter(|c| !c.is_failure()).map(|c| u32::from(c.score)).collect();
    let mut quality_score = if scored.is_empty() {
        NEUTRAL_CHECK_SCORE
    } else {
        let total: u32 = scored.iter().sum();
        #[allow(clippy::cast_possible_truncation, reason = "mean of u8 values fits in u8")]
        let mean = ((f64::from(total) / scored.len() as f64).round()) as u8;
        mean
    };

    let mut flags: Vec<String> =
        checks.iter().filter(|c| c.flagged).map(|c| c.check.as_str().to_owned()).collect();
    if heuristic_gibberish {
        quality_score = quality_score.min(GIBBERISH_SCORE_CAP);
        if !flags.iter().any(|f| f == TextCheck::Gibberish.as_str()) {
            flags.push(TextCheck::Gibberish.as_str().to_owned());
        }
    }

    TextQualityReport {
        quality_score,
        is_flagged: !flags.is_empty() || quality_score < FLAG_SCORE_THRESHOLD,
        flags,
        checks,
    }
}

fn empty_response_report() -> TextQualityReport {
    let checks = TextCheck::ALL
        .into_iter()
        .map(|check| TextCheckResult {
            check,
            score: 0,
            flagged: true,
            reason: "Empty response".to_owned(),
            failed: false,
        })
        .collect();
    TextQualityReport {
        quality_score: 0,
        is_flagged: true,
        flags: vec!["empty_response".to_owned()],
        checks,
    }
}

/// A token made of one letter repeated, like `aaaaaa`.
fn is_letter_run(word: &str) -> bool {
    let mut chars = word.chars();
    chars.next().is_some_and(|first| word.len() >= 5 && chars.all(|c| c == first))
}

fn is_acronym(word: &str) -> bool {
    word.chars().all(|c| c.is_ascii_uppercase())
}

fn is_suspicious_word(word: &str) -> bool {
    let lower = word.to_ascii_lowercase();
    if is_letter_run(&lower) || KEYBOARD_RUNS.iter().any(|run| lower.contains(run)) {
        return true;
    }
    lower.len() >= 5 && !is_acronym(word) && !lower.chars().any(|c| "aeiouy".contains(c))
}

/// Cheap local gibberish test, independent of the LLM.
///
/// Looks at ASCII words of four letters or more and fires when at least half
/// of them are a single repeated letter, a keyboard mash, or (for lowercase
/// words of five letters or more) contain no vowel. Digits, punctuation and
/// upper-case acronyms never count against the answer.
#[must_use]
pub fn looks_like_gibberish(text: &str) -> bool {
    let words: Vec<&str> = text
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|w| w.len() >= 4 && w.chars().all(|c| c.is_ascii_alphabetic()))
        .collect();
    if words.is_empty() {
        return false;
    }
    let suspicious = words.iter().filter(|w| is_suspicious_word(w)).count();
    suspicious * 2 >= words.len()
}
