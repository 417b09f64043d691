//! Request bodies and query strings (Deserialize)

use serde::Deserialize;
use survey_guard_core::{
    BehaviorEvent, DEFAULT_QUERY_LIMIT, MAX_QUERY_LIMIT, SessionFilter, SessionStatus,
    normalize_platform_id,
};
use survey_guard_service::ResponseSubmission;

const fn default_limit() -> usize {
    DEFAULT_QUERY_LIMIT
}

#[derive(Debug, Deserialize)]
pub struct PaginationQuery {
    #[serde(default)]
    pub offset: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

impl PaginationQuery {
    /// Cap limit to prevent DoS via unbounded queries.
    pub fn capped_limit(&self) -> usize {
        self.limit.min(MAX_QUERY_LIMIT)
    }
}

#[derive(Debug, Deserialize)]
pub struct SessionListQuery {
    pub survey_id: Option<String>,
    pub platform_id: Option<String>,
    pub respondent_id: Option<String>,
    pub is_bot: Option<bool>,
    pub status: Option<String>,
    #[serde(default)]
    pub offset: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

impl SessionListQuery {
    pub fn capped_limit(&self) -> usize {
        self.limit.min(MAX_QUERY_LIMIT)
    }

    pub fn filter(&self) -> Result<SessionFilter, String> {
        let status = self
            .status
            .as_deref()
            .map(str::parse::<SessionStatus>)
            .transpose()
            .map_err(|e| e.to_string())?;
        Ok(SessionFilter {
            survey_id: non_empty(self.survey_id.as_deref()),
            platform_id: non_empty(self.platform_id.as_deref())
                .map(|p| normalize_platform_id(Some(&p))),
            respondent_id: non_empty(self.respondent_id.as_deref()),
            is_bot: self.is_bot,
            status,
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(ToOwned::to_owned)
}

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub survey_id: String,
    #[serde(default, alias = "platform_id")]
    pub platform: Option<String>,
    pub respondent_id: Option<String>,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct IngestEventsRequest {
    pub events: Vec<BehaviorEvent>,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeResponseRequest {
    pub question_id: Option<String>,
    pub question_text: String,
    pub response_text: String,
}

impl From<AnalyzeResponseRequest> for ResponseSubmission {
    fn from(req: AnalyzeResponseRequest) -> Self {
        Self {
            question_id: req.question_id,
            question_text: req.question_text,
            response_text: req.response_text,
        }
    }
}
