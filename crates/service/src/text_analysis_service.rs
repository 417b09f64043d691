use std::sync::Arc;

use chrono::Utc;
use survey_guard_core::{TextAnalysis, MAX_RESPONSE_TEXT_LEN, TEXT_ANALYSIS_NOT_CONFIGURED};
use survey_guard_llm::{LlmClient, TextQualityAnalyzer};
use survey_guard_storage::Storage;

use crate::ServiceError;

/// One free-text answer submitted for analysis.
#[derive(Debug, Clone)]
pub struct ResponseSubmission {
    pub question_id: Option<String>,
    pub question_text: String,
    pub response_text: String,
}

pub struct TextAnalysisService {
    storage: Arc<dyn Storage>,
    analyzer: Option<TextQualityAnalyzer>,
}

impl TextAnalysisService {
    /// Without an LLM client every analysis request fails with `NotConfigured`.
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>, llm: Option<Arc<LlmClient>>) -> Self {
        Self { storage, analyzer: llm.map(TextQualityAnalyzer::new) }
    }

    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.analyzer.is_some()
    }

    /// Score one answer and store the verdict.
    ///
    /// Individual LLM check failures do not fail the request; they show up in
    /// the affected check's `reason`.
    pub async fn analyze_response(
        &self,
        session_id: &str,
        submission: ResponseSubmission,
    ) -> Result<TextAnalysis, ServiceError> {
        let Some(analyzer) = &self.analyzer else {
            return Err(ServiceError::NotConfigured(TEXT_ANALYSIS_NOT_CONFIGURED.to_owned()));
        };
        if submission.question_text.trim().is_empty() {
            return Err(ServiceError::InvalidInput("question_text must not be empty".to_owned()));
        }
        if submission.response_text.chars().count() > MAX_RESPONSE_TEXT_LEN {
            return Err(ServiceError::InvalidInput(format!(
                "response_text exceeds {MAX_RESPONSE_TEXT_LEN} characters"
            )));
        }
        if self.storage.get_session(session_id).await?.is_none() {
            return Err(ServiceError::session_not_found(session_id));
        }

        let report = analyzer
            .analyze(session_id, &submission.question_text, &submission.response_text)
            .await;
        let failed_checks = report.checks.iter().filter(|c| c.is_failure()).count();
        if failed_checks > 0 {
            tracing::warn!(session_id, failed_checks, "text analysis completed with failed checks");
        }

        let analysis = TextAnalysis {
            id: uuid::Uuid::new_v4().to_string(),
            session_id: session_id.to_owned(),
            question_id: submission.question_id.filter(|q| !q.trim().is_empty()),
            question_text: submission.question_text,
            response_text: submission.response_text,
            quality_score: report.quality_score,
            is_flagged: report.is_flagged,
            flags: report.flags,
            checks: report.checks,
            created_at: Utc::now(),
        };
        self.storage.save_text_analysis(&analysis).await?;
        Ok(analysis)
    }

    pub async fn list_for_session(&self, session_id: &str) -> Result<Vec<TextAnalysis>, ServiceError> {
        if self.storage.get_session(session_id).await?.is_none() {
            return Err(ServiceError::session_not_found(session_id));
        }
        Ok(self.storage.list_text_analyses(session_id).await?)
    }
}
