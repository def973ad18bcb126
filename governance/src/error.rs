//! Error types for governance runs
//!
//! Validation findings are data (`ValidationOutcome`), not errors. The
//! variants here cover infrastructure failures that stop a run outright:
//! unreadable directories, snapshot I/O, configuration problems.

use std::path::PathBuf;
use thiserror::Error;

use crate::config::ConfigError;
use crate::snapshot::SnapshotIoError;

/// Governance result type alias
pub type Result<T> = std::result::Result<T, GovernanceError>;

/// Infrastructure error taxonomy
#[derive(Debug, Error)]
pub enum GovernanceError {
    #[error("Failed to read directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Docs root {0} exists but is not a directory")]
    NotADirectory(PathBuf),

    #[error("Failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to create directory {path}: {source}")]
    DirectoryCreate {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize JSON: {source}")]
    JsonSerialize { source: serde_json::Error },

    #[error(transparent)]
    Snapshot(#[from] SnapshotIoError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Other(String),
}

impl From<String> for GovernanceError {
    fn from(s: String) -> Self {
        GovernanceError::Other(s)
    }
}

impl From<&str> for GovernanceError {
    fn from(s: &str) -> Self {
        GovernanceError::Other(s.to_string())
    }
}

impl GovernanceError {
    pub(crate) fn directory_read(path: impl Into<PathBuf>, err: walkdir::Error) -> Self {
        let path = err
            .path()
            .map(std::path::Path::to_path_buf)
            .unwrap_or_else(|| path.into());
        GovernanceError::DirectoryRead {
            path,
            source: err.into(),
        }
    }
}
