//! SessionStore implementation for PgStorage.

use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use survey_guard_core::{
    ANONYMOUS_RESPONDENT, PaginatedResult, RiskLevel, Session, SessionFilter, SessionStatus,
    UNKNOWN_PLATFORM,
};

use super::{count_to_u64, row_to_session, to_i64, PgStorage, SESSION_COLUMNS};
use crate::error::StorageError;
use crate::traits::SessionStore;

/// Appends `WHERE ...` for the dashboard filters. Binds only what is set.
///
/// `unknown` and `anonymous` also select legacy rows with a NULL column, the
/// same grouping the hierarchy queries apply.
fn push_session_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &SessionFilter) {
    builder.push(" WHERE TRUE");
    if let Some(survey_id) = &filter.survey_id {
        builder.push(" AND survey_id = ").push_bind(survey_id.clone());
    }
    if let Some(platform_id) = &filter.platform_id {
        builder.push(" AND (platform_id = ").push_bind(platform_id.clone());
        if platform_id == UNKNOWN_PLATFORM {
            builder.push(" OR platform_id IS NULL");
        }
        builder.push(")");
    }
    if let Some(respondent_id) = &filter.respondent_id {
        builder.push(" AND (respondent_id = ").push_bind(respondent_id.clone());
        if respondent_id == ANONYMOUS_RESPONDENT {
            builder.push(" OR respondent_id IS NULL");
        }
        builder.push(")");
    }
    if let Some(is_bot) = filter.is_bot {
        builder.push(" AND is_bot = ").push_bind(is_bot);
    }
    if let Some(status) = filter.status {
        builder.push(" AND status = ").push_bind(status.as_str());
    }
}

#[async_trait]
impl SessionStore for PgStorage {
    async fn create_session(&self, session: &Session) -> Result<(), StorageError> {
        // `platform` is the legacy column; it always mirrors `platform_id`.
        sqlx::query(
            "INSERT INTO sessions (id, survey_id, platform, platform_id, respondent_id, user_agent,
                ip_address, metadata, status, event_count, created_at, updated_at)
             VALUES ($1, $2, $3, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(&session.id)
        .bind(&session.survey_id)
        .bind(&session.platform_id)
        .bind(&session.respondent_id)
        .bind(&session.user_agent)
        .bind(&session.ip_address)
        .bind(&session.metadata)
        .bind(session.status.as_str())
        .bind(i32::try_from(session.event_count).map_err(|e| {
            StorageError::corrupt("event_count exceeds i32::MAX", e)
        })?)
        .bind(session.created_at)
        .bind(session.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_session(&self, id: &str) -> Result<Option<Session>, StorageError> {
        let row = sqlx::query(&format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| row_to_session(&r)).transpose()
    }

    async fn update_session_status(
        &self,
        id: &str,
        status: SessionStatus,
    ) -> Result<bool, StorageError> {
        let result = sqlx::query("UPDATE sessions SET status = $1, updated_at = NOW() WHERE id = $2")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn record_detection_summary(
        &self,
        id: &str,
        is_bot: bool,
        confidence_score: f64,
        risk_level: RiskLevel,
    ) -> Result<(), StorageError> {
        let result = sqlx::query(
            "UPDATE sessions
             SET is_bot = $1, confidence_score = $2, risk_level = $3, status = $4, updated_at = NOW()
             WHERE id = $5",
        )
        .bind(is_bot)
        .bind(confidence_score)
        .bind(risk_level.as_str())
        .bind(SessionStatus::Analyzed.as_str())
        .bind(id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound { entity: "session", id: id.to_owned() });
        }
        Ok(())
    }

    async fn delete_session(&self, id: &str) -> Result<bool, StorageError> {
        let result =
            sqlx::query("DELETE FROM sessions WHERE id = $1").bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn close_stale_sessions(&self, max_age_hours: i64) -> Result<usize, StorageError> {
        let hours = i32::try_from(max_age_hours.max(0)).unwrap_or(i32::MAX);
        let result = sqlx::query(
            "UPDATE sessions SET status = $1, updated_at = NOW()
             WHERE status = $2
               AND COALESCE(last_activity_at, created_at) < NOW() - make_interval(hours => $3)",
        )
        .bind(SessionStatus::Completed.as_str())
        .bind(SessionStatus::Active.as_str())
        .bind(hours)
        .execute(&self.pool)
        .await?;
        Ok(usize::try_from(result.rows_affected()).unwrap_or(usize::MAX))
    }

    async fn list_sessions(
        &self,
        filter: &SessionFilter,
        offset: usize,
        limit: usize,
    ) -> Result<PaginatedResult<Session>, StorageError> {
        let mut count_query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM sessions");
        push_session_filter(&mut count_query, filter);
        let total: i64 = count_query.build_query_scalar().fetch_one(&self.pool).await?;

        let mut query = QueryBuilder::<Postgres>::new(format!("SELECT {SESSION_COLUMNS} FROM sessions"));
        push_session_filter(&mut query, filter);
        query
            .push(" ORDER BY created_at DESC, id LIMIT ")
            .push_bind(to_i64(limit))
            .push(" OFFSET ")
            .push_bind(to_i64(offset));
        let rows = query.build().fetch_all(&self.pool).await?;
        let items = rows.iter().map(row_to_session).collect::<Result<Vec<_>, _>>()?;

        Ok(PaginatedResult {
            items,
            total: count_to_u64(total),
            offset: offset as u64,
            limit: limit as u64,
        })
    }
}
