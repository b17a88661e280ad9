//! Error types for RoboBot.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Knowledge base error ({path}): {reason}")]
    KnowledgeBase { path: PathBuf, reason: String },

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid match options: {0}")]
    InvalidMatchOptions(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl ChatError {
    pub(crate) fn knowledge_base(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        ChatError::KnowledgeBase {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// True for errors that mean the service is misconfigured rather than
    /// transiently failing.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            ChatError::KnowledgeBase { .. }
                | ChatError::Config(_)
                | ChatError::InvalidMatchOptions(_)
                | ChatError::Toml(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ChatError>;
