use async_trait::async_trait;
use survey_guard_core::DetectionResult;

use crate::error::StorageError;

#[async_trait]
pub trait DetectionStore: Send + Sync {
    async fn save_detection_result(&self, result: &DetectionResult) -> Result<(), StorageError>;

    /// Most recent result for the session, if it was ever analyzed.
    async fn latest_detection_result(
        &self,
        session_id: &str,
    ) -> Result<Option<DetectionResult>, StorageError>;
}
