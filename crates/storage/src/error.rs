//! Storage-layer errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Primary key or unique index collision.
    #[error("duplicate: {0}")]
    Duplicate(String),

    /// Session is completed and refuses further events.
    #[error("session {0} is completed and accepts no more events")]
    SessionClosed(String),

    /// Row references a parent that does not exist (SQLSTATE 23503).
    #[error("missing parent row: {0}")]
    MissingParent(String),

    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),

    /// A stored value no longer maps onto the domain type.
    #[error("data corruption: {context}")]
    DataCorruption {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("migration error: {0}")]
    Migration(String),
}

impl StorageError {
    /// Pool exhaustion and I/O failures are worth retrying.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Database(sqlx::Error::PoolTimedOut | sqlx::Error::Io(_)))
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub(crate) fn corrupt(
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::DataCorruption { context: context.into(), source: Box::new(source) }
    }
}

/// Maps constraint violations onto their own variants; `RowNotFound` becomes a
/// context-free `NotFound` that callers remap when they know the entity.
impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => Self::NotFound { entity: "row", id: "unknown".into() },
            sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
                Some("23505") => Self::Duplicate(db_err.message().to_owned()),
                Some("23503") => Self::MissingParent(db_err.message().to_owned()),
                _ => Self::Database(err),
            },
            _ => Self::Database(err),
        }
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::corrupt("JSON column encode/decode", err)
    }
}
