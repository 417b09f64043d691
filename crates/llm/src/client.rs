use std::time::Duration;

use crate::ai_types::{ChatRequest, ChatResponse};
use crate::error::LlmError;
use crate::rate_limit::RateLimiter;

/// Default LLM model to use.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
/// Default OpenAI-compatible endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";
/// Per-request timeout unless `SURVEY_GUARD_LLM_TIMEOUT_SECS` overrides it.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// Requests per minute unless `SURVEY_GUARD_LLM_RATE_LIMIT_PER_MIN` overrides it.
pub const DEFAULT_RATE_LIMIT_PER_MIN: u32 = 100;

const MAX_RETRIES: u32 = 3;

/// Client for LLM API calls.
pub struct LlmClient {
    pub(crate) client: reqwest::Client,
    pub(crate) api_key: String,
    pub(crate) base_url: String,
    pub(crate) model: String,
    pub(crate) timeout: Duration,
    pub(crate) limiter: RateLimiter,
    pub(crate) retry_delay_unit: Duration,
}

impl std::fmt::Debug for LlmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmClient")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl LlmClient {
    /// Creates a new LLM client with the given API key and base URL.
    ///
    /// Model, timeout and rate limit come from `OPENAI_MODEL`,
    /// `SURVEY_GUARD_LLM_TIMEOUT_SECS` and `SURVEY_GUARD_LLM_RATE_LIMIT_PER_MIN`.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built (TLS backend failure).
    pub fn new(api_key: String, base_url: String) -> Result<Self, LlmError> {
        let model = survey_guard_core::env_non_empty("OPENAI_MODEL")
            .unwrap_or_else(|| DEFAULT_MODEL.to_owned());
        let timeout_secs = survey_guard_core::env_parse_with_default(
            "SURVEY_GUARD_LLM_TIMEOUT_SECS",
            DEFAULT_TIMEOUT_SECS,
        );
        let per_minute = survey_guard_core::env_parse_with_default(
            "SURVEY_GUARD_LLM_RATE_LIMIT_PER_MIN",
            DEFAULT_RATE_LIMIT_PER_MIN,
        );
        let timeout = Duration::from_secs(timeout_secs.max(1));
        let base_url = base_url.trim_end_matches('/').to_owned();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::ClientInit(e.to_string()))?;
        Ok(Self {
            client,
            api_key,
            base_url,
            model,
            timeout,
            limiter: RateLimiter::per_minute(per_minute),
            retry_delay_unit: Duration::from_secs(1),
        })
    }

    /// Sets a custom model for this client.
    #[must_use]
    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    /// Replaces the request rate limit.
    #[must_use]
    pub fn with_rate_limit(mut self, per_minute: u32) -> Self {
        self.limiter = RateLimiter::per_minute(per_minute);
        self
    }

    /// Scales the 1/2/4 backoff schedule; one second by default.
    #[must_use]
    pub fn with_retry_delay_unit(mut self, unit: Duration) -> Self {
        self.retry_delay_unit = unit;
        self
    }

    /// Returns the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the model name.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send a chat completion request and return the extracted content string.
    ///
    /// Transient failures (transport errors, 429 and 5xx gateway statuses)
    /// are retried up to three times with 1, 2 and 4 unit delays. Every
    /// attempt first takes a rate-limiter slot.
    ///
    /// # Errors
    /// Returns an error if the HTTP request fails, the API returns a
    /// non-success status, the response body cannot be parsed, the choices
    /// array is empty, or no rate-limit slot frees up within the timeout.
    pub async fn chat_completion(&self, request: &ChatRequest) -> Result<String, LlmError> {
        let mut attempt = 0;
        loop {
            self.limiter.acquire(self.timeout).await?;
            let err = match self.send_once(request).await {
                Ok(content) => return Ok(content),
                Err(err) if err.is_transient() => err,
                Err(err) => return Err(err),
            };
            if attempt == MAX_RETRIES {
                return Err(LlmError::RetriesExhausted(Box::new(err)));
            }
            let delay = self.retry_delay_unit * 2u32.pow(attempt);
            attempt += 1;
            tracing::warn!(attempt, max = MAX_RETRIES, ?delay, error = %err, "retrying LLM request");
            tokio::time::sleep(delay).await;
        }
    }

    async fn send_once(&self, request: &ChatRequest) -> Result<String, LlmError> {
        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::HttpStatus {
                code: status.as_u16(),
                body: truncate(&body, 500).to_owned(),
            });
        }

        let body = response.text().await?;
        let parsed: ChatResponse = serde_json::from_str(&body).map_err(|source| {
            LlmError::JsonParse {
                context: format!("chat completion response (body: {})", truncate(&body, 200)),
                source,
            }
        })?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(LlmError::EmptyResponse)
    }
}

/// Truncates a string to the given maximum length at a char boundary.
#[must_use]
pub fn truncate(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        s
    } else {
        let mut end = max_len;
        while end > 0 && !s.is_char_boundary(end) {
            end = end.saturating_sub(1);
        }
        s.get(..end).unwrap_or("")
    }
}

/// Strip a markdown code fence (```` ```json ```` or bare) around model output.
#[must_use]
pub fn strip_markdown_json(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(inner) = trimmed.strip_prefix("```").and_then(|s| s.strip_suffix("```")) else {
        return trimmed;
    };
    // Drop the language tag line, if any.
    match inner.split_once('\n') {
        Some((_, body)) => body.trim(),
        None => inner.trim(),
    }
}
