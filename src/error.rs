//! LingoChamp Error Types
//!
//! Centralized error handling. Every failure here is recoverable: callers
//! fall back to a simpler mechanism or a fixed message.

use thiserror::Error;

/// Central error type for LingoChamp
#[derive(Error, Debug)]
pub enum LingoError {
    #[error("TTS engine error: {0}")]
    Tts(String),

    #[error("Hint generator error: {0}")]
    Hint(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Lock poisoned: {0}")]
    Lock(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result type alias for LingoChamp operations
pub type LingoResult<T> = Result<T, LingoError>;

/// Helper to convert Mutex poison errors
impl<T> From<std::sync::PoisonError<T>> for LingoError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        LingoError::Lock(err.to_string())
    }
}
