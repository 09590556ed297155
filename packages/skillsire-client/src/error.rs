use thiserror::Error;

/// Errors returned by Skillsire client operations.
#[derive(Debug, Error)]
pub enum SkillsireError {
    /// Transport-level failure: connect, timeout, or body read.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success response from the API.
    #[error("Skillsire API error {status}: {message}")]
    Api { status: u16, message: String },
}

pub type Result<T> = std::result::Result<T, SkillsireError>;
