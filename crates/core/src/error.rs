use std::result::Result as StdResult;

use thiserror::Error;

/// Errors raised while building or decoding domain values.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unknown event type: {0}")]
    UnknownEventType(String),

    #[error("Invalid payload for {event_type} event: {source}")]
    InvalidPayload {
        event_type: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = StdResult<T, CoreError>;
