//! EventStore implementation for PgStorage.

use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder, Row};
use survey_guard_core::{BehaviorEvent, SessionStatus};

use super::{count_to_u64, PgStorage};
use crate::error::StorageError;
use crate::traits::EventStore;

/// Four binds per row keeps each statement well under the 65535 parameter cap.
const INSERT_CHUNK: usize = 1000;

#[async_trait]
impl EventStore for PgStorage {
    async fn insert_events(
        &self,
        session_id: &str,
        events: &[BehaviorEvent],
    ) -> Result<u32, StorageError> {
        let mut tx = self.pool.begin().await?;

        // Serializes concurrent batches, completion and the stale sweep for this session.
        let status: Option<String> =
            sqlx::query_scalar("SELECT status FROM sessions WHERE id = $1 FOR UPDATE")
                .bind(session_id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(status) = status else {
            return Err(StorageError::NotFound { entity: "session", id: session_id.to_owned() });
        };
        if status == SessionStatus::Completed.as_str() {
            return Err(StorageError::SessionClosed(session_id.to_owned()));
        }

        for chunk in events.chunks(INSERT_CHUNK) {
            let mut builder = QueryBuilder::<Postgres>::new(
                "INSERT INTO behavior_events (session_id, event_type, occurred_at, payload) ",
            );
            builder.push_values(chunk, |mut row, event| {
                row.push_bind(session_id.to_owned())
                    .push_bind(event.event_type().as_str())
                    .push_bind(event.timestamp)
                    .push_bind(event.data.payload());
            });
            builder.build().execute(&mut *tx).await?;
        }

        let added = i32::try_from(events.len())
            .map_err(|e| StorageError::corrupt("event batch exceeds i32::MAX", e))?;
        let total: i32 = sqlx::query_scalar(
            "UPDATE sessions
             SET event_count = event_count + $1, last_activity_at = NOW(), updated_at = NOW()
             WHERE id = $2
             RETURNING event_count",
        )
        .bind(added)
        .bind(session_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::debug!(session_id, inserted = events.len(), total, "stored behavior events");
        Ok(u32::try_from(total).unwrap_or(0))
    }

    async fn get_events(&self, session_id: &str) -> Result<Vec<BehaviorEvent>, StorageError> {
        let rows = sqlx::query(
            "SELECT event_type, occurred_at, payload FROM behavior_events
             WHERE session_id = $1 ORDER BY occurred_at, id",
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        let mut events = Vec::with_capacity(rows.len());
        for row in &rows {
            let event_type: String = row.try_get("event_type")?;
            match BehaviorEvent::from_parts(
                &event_type,
                row.try_get("occurred_at")?,
                row.try_get("payload")?,
            ) {
                Ok(event) => events.push(event),
                Err(e) => {
                    tracing::warn!(session_id, %event_type, error = %e, "skipping corrupt stored event");
                },
            }
        }
        Ok(events)
    }

    async fn count_events(&self, session_id: &str) -> Result<u64, StorageError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM behavior_events WHERE session_id = $1")
                .bind(session_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count_to_u64(count))
    }
}
