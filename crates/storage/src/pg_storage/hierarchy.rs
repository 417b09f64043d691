//! HierarchyStore implementation for PgStorage.
//!
//! Every query filters or groups on the `(survey_id, platform_id,
//! respondent_id, id)` prefix so the composite session indexes apply.

use async_trait::async_trait;
use sqlx::Row;
use survey_guard_core::{
    DashboardOverview, PaginatedResult, PlatformSummary, RespondentSummary, Session, SurveySummary,
    MAX_QUERY_LIMIT,
};

use super::{
    count_to_u64, platform_predicate, respondent_predicate, row_to_session, row_to_stats, to_i64,
    PgStorage, GROUP_STATS_COLUMNS, SESSION_COLUMNS,
};
use crate::error::StorageError;
use crate::traits::HierarchyStore;

fn row_to_survey(row: &sqlx::postgres::PgRow) -> Result<SurveySummary, StorageError> {
    Ok(SurveySummary {
        survey_id: row.try_get("survey_id")?,
        platform_count: count_to_u64(row.try_get("platform_count")?),
        respondent_count: count_to_u64(row.try_get("respondent_count")?),
        stats: row_to_stats(row)?,
    })
}

fn survey_select() -> String {
    format!(
        "SELECT survey_id,
            COUNT(DISTINCT COALESCE(platform_id, 'unknown')) AS platform_count,
            COUNT(DISTINCT COALESCE(respondent_id, 'anonymous')) AS respondent_count,
            {GROUP_STATS_COLUMNS}
         FROM sessions"
    )
}

#[async_trait]
impl HierarchyStore for PgStorage {
    async fn list_surveys(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<PaginatedResult<SurveySummary>, StorageError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(DISTINCT survey_id) FROM sessions")
            .fetch_one(&self.pool)
            .await?;
        let rows = sqlx::query(&format!(
            "{} GROUP BY survey_id ORDER BY MAX(created_at) DESC, survey_id LIMIT $1 OFFSET $2",
            survey_select()
        ))
        .bind(to_i64(limit))
        .bind(to_i64(offset))
        .fetch_all(&self.pool)
        .await?;
        Ok(PaginatedResult {
            items: rows.iter().map(row_to_survey).collect::<Result<_, _>>()?,
            total: count_to_u64(total),
            offset: offset as u64,
            limit: limit as u64,
        })
    }

    async fn get_survey(&self, survey_id: &str) -> Result<Option<SurveySummary>, StorageError> {
        let row = sqlx::query(&format!("{} WHERE survey_id = $1 GROUP BY survey_id", survey_select()))
            .bind(survey_id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| row_to_survey(&r)).transpose()
    }

    async fn list_platforms(
        &self,
        survey_id: &str,
    ) -> Result<Vec<PlatformSummary>, StorageError> {
        let rows = sqlx::query(&format!(
            "SELECT COALESCE(platform_id, 'unknown') AS platform_key,
                COUNT(DISTINCT COALESCE(respondent_id, 'anonymous')) AS respondent_count,
                {GROUP_STATS_COLUMNS}
             FROM sessions
             WHERE survey_id = $1
             GROUP BY platform_key
             ORDER BY session_count DESC, platform_key"
        ))
        .bind(survey_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<PlatformSummary, StorageError> {
                Ok(PlatformSummary {
                    survey_id: survey_id.to_owned(),
                    platform_id: row.try_get("platform_key")?,
                    respondent_count: count_to_u64(row.try_get("respondent_count")?),
                    stats: row_to_stats(row)?,
                })
            })
            .collect()
    }

    async fn list_respondents(
        &self,
        survey_id: &str,
        platform_id: &str,
        offset: usize,
        limit: usize,
    ) -> Result<PaginatedResult<RespondentSummary>, StorageError> {
        let platform = platform_predicate(2);
        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(DISTINCT COALESCE(respondent_id, 'anonymous')) FROM sessions
             WHERE survey_id = $1 AND {platform}"
        ))
        .bind(survey_id)
        .bind(platform_id)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query(&format!(
            "SELECT COALESCE(respondent_id, 'anonymous') AS respondent_key, {GROUP_STATS_COLUMNS}
             FROM sessions
             WHERE survey_id = $1 AND {platform}
             GROUP BY respondent_key
             ORDER BY last_seen DESC, respondent_key
             LIMIT $3 OFFSET $4"
        ))
        .bind(survey_id)
        .bind(platform_id)
        .bind(to_i64(limit))
        .bind(to_i64(offset))
        .fetch_all(&self.pool)
        .await?;

        let items = rows
            .iter()
            .map(|row| -> Result<RespondentSummary, StorageError> {
                Ok(RespondentSummary {
                    survey_id: survey_id.to_owned(),
                    platform_id: platform_id.to_owned(),
                    respondent_id: row.try_get("respondent_key")?,
                    stats: row_to_stats(row)?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PaginatedResult {
            items,
            total: count_to_u64(total),
            offset: offset as u64,
            limit: limit as u64,
        })
    }

    async fn list_respondent_sessions(
        &self,
        survey_id: &str,
        platform_id: &str,
        respondent_id: &str,
    ) -> Result<Vec<Session>, StorageError> {
        let rows = sqlx::query(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions
             WHERE survey_id = $1 AND {} AND {}
             ORDER BY created_at DESC, id
             LIMIT $4",
            platform_predicate(2),
            respondent_predicate(3),
        ))
        .bind(survey_id)
        .bind(platform_id)
        .bind(respondent_id)
        .bind(to_i64(MAX_QUERY_LIMIT))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_session).collect()
    }

    async fn find_session_in_hierarchy(
        &self,
        survey_id: &str,
        platform_id: &str,
        respondent_id: &str,
        session_id: &str,
    ) -> Result<Option<Session>, StorageError> {
        let row = sqlx::query(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions
             WHERE survey_id = $1 AND {} AND {} AND id = $4",
            platform_predicate(2),
            respondent_predicate(3),
        ))
        .bind(survey_id)
        .bind(platform_id)
        .bind(respondent_id)
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(|r| row_to_session(&r)).transpose()
    }

    async fn dashboard_overview(&self) -> Result<DashboardOverview, StorageError> {
        let row = sqlx::query(&format!(
            "SELECT COUNT(DISTINCT survey_id) AS survey_count,
                COUNT(DISTINCT COALESCE(platform_id, 'unknown')) AS platform_count,
                COUNT(DISTINCT COALESCE(respondent_id, 'anonymous')) AS respondent_count,
                COUNT(*) FILTER (WHERE status = 'active') AS active_sessions,
                COALESCE(SUM(event_count), 0)::BIGINT AS total_events,
                {GROUP_STATS_COLUMNS}
             FROM sessions"
        ))
        .fetch_one(&self.pool)
        .await?;

        let text_row = sqlx::query(
            "SELECT COUNT(*) AS total, COUNT(*) FILTER (WHERE is_flagged) AS flagged
             FROM text_analyses",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(DashboardOverview {
            survey_count: count_to_u64(row.try_get("survey_count")?),
            platform_count: count_to_u64(row.try_get("platform_count")?),
            respondent_count: count_to_u64(row.try_get("respondent_count")?),
            active_sessions: count_to_u64(row.try_get("active_sessions")?),
            total_events: count_to_u64(row.try_get("total_events")?),
            text_analysis_count: count_to_u64(text_row.try_get("total")?),
            flagged_text_count: count_to_u64(text_row.try_get("flagged")?),
            stats: row_to_stats(&row)?,
        })
    }
}
