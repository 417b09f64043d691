//! TextAnalysisStore implementation for PgStorage.

use async_trait::async_trait;
use survey_guard_core::TextAnalysis;

use super::{row_to_text_analysis, PgStorage, TEXT_ANALYSIS_COLUMNS};
use crate::error::StorageError;
use crate::traits::TextAnalysisStore;

#[async_trait]
impl TextAnalysisStore for PgStorage {
    async fn save_text_analysis(&self, analysis: &TextAnalysis) -> Result<(), StorageError> {
        sqlx::query(
            "INSERT INTO text_analyses (id, session_id, question_id, question_text, response_text,
                quality_score, is_flagged, flags, checks, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(&analysis.id)
        .bind(&analysis.session_id)
        .bind(&analysis.question_id)
        .bind(&analysis.question_text)
        .bind(&analysis.response_text)
        .bind(i32::from(analysis.quality_score))
        .bind(analysis.is_flagged)
        .bind(serde_json::to_value(&analysis.flags)?)
        .bind(serde_json::to_value(&analysis.checks)?)
        .bind(analysis.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_text_analyses(&self, session_id: &str) -> Result<Vec<TextAnalysis>, StorageError> {
        let rows = sqlx::query(&format!(
            "SELECT {TEXT_ANALYSIS_COLUMNS} FROM text_analyses
             WHERE session_id = $1 ORDER BY created_at, id"
        ))
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_text_analysis).collect()
    }
}
