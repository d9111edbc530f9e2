use thiserror::Error;

/// Errors surfaced by the record stores and model constructors.
///
/// Aggregation never produces one of these; a zero denominator yields `0`.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{kind} not found: {key}")]
    NotFound { kind: &'static str, key: String },
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("Invalid seed data: {0}")]
    Seed(#[from] serde_json::Error),
}

impl Error {
    pub fn not_found(kind: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            kind,
            key: key.to_string(),
        }
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
