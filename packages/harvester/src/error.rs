//! Typed errors for the harvester library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) so callers can match
//! on the failure class: board trouble is recoverable per source, history
//! store trouble aborts the run.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that can occur during a harvest run.
#[derive(Debug, Error)]
pub enum HarvestError {
    /// A board fetch failed outright
    #[error("source error: {0}")]
    Source(#[from] SourceError),

    /// History store I/O failed
    #[error("history store error at {path}: {source}")]
    Store {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Another writer holds the history store lock
    #[error("history store busy: {path}")]
    StoreBusy { path: PathBuf },

    /// Settings file could not be read or parsed
    #[error("config error at {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// JSON serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Notification hook failed
    #[error("notify error: {0}")]
    Notify(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl HarvestError {
    /// Store I/O error with the offending path attached.
    pub fn store(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Store {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Config error with the offending path attached.
    pub fn config(
        path: impl AsRef<Path>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Config {
            path: path.as_ref().to_path_buf(),
            source: Box::new(source),
        }
    }
}

/// Errors that can occur while fetching from a single board.
#[derive(Debug, Error)]
pub enum SourceError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Non-success status from the board
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Response body did not match the board's expected shape
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(Box::new(err))
    }
}

impl From<skillsire_client::SkillsireError> for SourceError {
    fn from(err: skillsire_client::SkillsireError) -> Self {
        match err {
            skillsire_client::SkillsireError::Http(e) => Self::Http(Box::new(e)),
            skillsire_client::SkillsireError::Api { status, message } => {
                Self::Api { status, message }
            }
        }
    }
}

/// Result type alias for harvest operations.
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for board fetch operations.
pub type SourceResult<T> = std::result::Result<T, SourceError>;
