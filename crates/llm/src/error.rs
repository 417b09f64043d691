//! Failures talking to the chat-completions endpoint.

use std::time::Duration;

use thiserror::Error;

/// Upstream statuses worth another attempt: throttling and gateway trouble.
const RETRYABLE_STATUSES: [u16; 5] = [429, 500, 502, 503, 529];

#[derive(Debug, Error)]
pub enum LlmError {
    /// Transport failure: connect, TLS, timeout or body read.
    #[error("request to model endpoint failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// Non-2xx answer; `body` is truncated.
    #[error("model endpoint returned {code}: {body}")]
    HttpStatus { code: u16, body: String },

    #[error("could not parse {context}: {source}")]
    JsonParse {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("model returned no choices")]
    EmptyResponse,

    #[error("could not build HTTP client: {0}")]
    ClientInit(String),

    /// Local token bucket stayed empty for longer than the request timeout.
    #[error("local rate limit reached, next slot in {wait:?}")]
    RateLimited { wait: Duration },

    #[error("gave up after retries: {0}")]
    RetriesExhausted(Box<LlmError>),
}

impl LlmError {
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::HttpRequest(_) => true,
            Self::HttpStatus { code, .. } => RETRYABLE_STATUSES.contains(code),
            _ => false,
        }
    }
}
