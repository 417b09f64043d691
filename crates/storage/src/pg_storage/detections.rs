//! DetectionStore implementation for PgStorage.

use async_trait::async_trait;
use survey_guard_core::DetectionResult;

use super::{row_to_detection, PgStorage, DETECTION_COLUMNS};
use crate::error::StorageError;
use crate::traits::DetectionStore;

#[async_trait]
impl DetectionStore for PgStorage {
    async fn save_detection_result(&self, result: &DetectionResult) -> Result<(), StorageError> {
        let method_scores = serde_json::to_value(&result.method_scores)?;
        let flags = serde_json::to_value(&result.flags)?;
        sqlx::query(
            "INSERT INTO detection_results (id, session_id, is_bot, confidence_score, risk_level,
                method_scores, flags, event_count, processing_time_ms, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(&result.id)
        .bind(&result.session_id)
        .bind(result.is_bot)
        .bind(result.confidence_score)
        .bind(result.risk_level.as_str())
        .bind(method_scores)
        .bind(flags)
        .bind(i32::try_from(result.event_count).unwrap_or(i32::MAX))
        .bind(i64::try_from(result.processing_time_ms).unwrap_or(i64::MAX))
        .bind(result.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match StorageError::from(e) {
            StorageError::MissingParent(_) => {
                StorageError::NotFound { entity: "session", id: result.session_id.clone() }
            },
            other => other,
        })?;
        Ok(())
    }

    async fn latest_detection_result(
        &self,
        session_id: &str,
    ) -> Result<Option<DetectionResult>, StorageError> {
        let row = sqlx::query(&format!(
            "SELECT {DETECTION_COLUMNS} FROM detection_results
             WHERE session_id = $1 ORDER BY created_at DESC, id DESC LIMIT 1"
        ))
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(|r| row_to_detection(&r)).transpose()
    }
}
