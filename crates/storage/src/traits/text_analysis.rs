use async_trait::async_trait;
use survey_guard_core::TextAnalysis;

use crate::error::StorageError;

#[async_trait]
pub trait TextAnalysisStore: Send + Sync {
    async fn save_text_analysis(&self, analysis: &TextAnalysis) -> Result<(), StorageError>;

    /// Analyses for one session in submission order.
    async fn list_text_analyses(&self, session_id: &str) -> Result<Vec<TextAnalysis>, StorageError>;
}
