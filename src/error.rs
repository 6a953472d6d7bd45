use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PdError {
    /// Invalid parameter combination or out-of-range indexer argument.
    #[error("Configuration error: {0}")]
    Configuration(String),
    /// Discovered records disagree with the run being merged.
    #[error("Consistency error in {path}: {reason}")]
    Consistency { path: PathBuf, reason: String },
    #[error("Corrupt artifact {path}: {reason}")]
    CorruptArtifact { path: PathBuf, reason: String },
    #[error("Diagram error: {0}")]
    Diagram(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PdError {
    pub fn config(reason: impl Into<String>) -> Self {
        PdError::Configuration(reason.into())
    }

    pub fn corrupt(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        PdError::CorruptArtifact {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
