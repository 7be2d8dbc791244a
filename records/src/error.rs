use thiserror::Error;

use crate::model::VibeOutOfRange;

/// Failures surfaced by a [`crate::RecordStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database connection failed: {0}")]
    Connection(String),
    #[error("constraint violated: {0}")]
    Constraint(String),
    #[error("unknown {kind} '{name}'")]
    UnknownReference { kind: &'static str, name: String },
    #[error("invalid row: {0}")]
    InvalidRow(String),
    #[error("class {0} not found")]
    NotFound(i64),
    #[error("sqlite error: {0}")]
    Sqlite(rusqlite::Error),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(code, message)
                if code.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                StoreError::Constraint(message.unwrap_or_else(|| code.to_string()))
            }
            other => StoreError::Sqlite(other),
        }
    }
}

impl From<VibeOutOfRange> for StoreError {
    fn from(err: VibeOutOfRange) -> Self {
        StoreError::InvalidRow(err.to_string())
    }
}
