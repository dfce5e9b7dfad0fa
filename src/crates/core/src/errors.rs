//! Error types shared by the core crate

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HslTalksError {
    /// Every authored reply has been handed out.
    #[error("Reply script complete")]
    ScriptComplete,

    #[error("Reply script has no replies")]
    EmptyScript,

    #[error("Invalid reply script: {0}")]
    InvalidScript(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for HslTalksError {
    fn from(error: serde_json::Error) -> Self {
        HslTalksError::InvalidScript(error.to_string())
    }
}

pub type HslTalksResult<T> = Result<T, HslTalksError>;
