//! Magno Error Types
//!
//! Centralized error handling for the command pipeline. Backend and
//! extraction messages surface verbatim in user-facing error responses, so
//! their display carries no prefix.

use thiserror::Error;

/// Central error type for Magno
#[derive(Error, Debug)]
pub enum MagnoError {
    #[error("{0}")]
    Extraction(String),

    #[error("{0}")]
    Backend(String),

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result type alias for Magno operations
pub type MagnoResult<T> = Result<T, MagnoError>;
