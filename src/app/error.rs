use thiserror::Error;

use crate::config::ConfigError;
use crate::feed::FeedError;
use crate::pipeline::RunAborted;

#[derive(Error, Debug)]
pub enum PagefeedError {
    #[error(transparent)]
    Run(#[from] Box<RunAborted>),

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Feed error: {0}")]
    Feed(#[from] FeedError),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl From<RunAborted> for PagefeedError {
    fn from(aborted: RunAborted) -> Self {
        Self::Run(Box::new(aborted))
    }
}

impl PagefeedError {
    /// Whether this error is a run-level pipeline failure (as opposed to I/O or setup).
    pub fn is_run_failure(&self) -> bool {
        matches!(self, Self::Run(_))
    }
}

pub type Result<T> = std::result::Result<T, PagefeedError>;
