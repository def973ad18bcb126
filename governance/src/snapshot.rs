//! Status snapshot: the roadmap statuses observed by the last clean run.
//!
//! Transition checks need a previous status, which the front matter alone
//! cannot provide. The snapshot is an opt-in JSON file; without one only the
//! gate preconditions are checked.
//!
//! Writes use the temp-file + fsync + rename pattern so an interrupted run
//! never leaves a truncated snapshot behind.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::schema::{FieldEnum, RoadmapIndex};
use crate::state_machine::RoadmapStatus;

pub const SCHEMA_VERSION: &str = "status-snapshot@1";

/// Default snapshot filename, relative to the docs root.
pub const DEFAULT_FILENAME: &str = ".governance-status.json";

/// Errors from snapshot I/O operations.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotIoError {
    /// Snapshot file exists but contains invalid data.
    #[error("Status snapshot corrupted at {path}: {reason}")]
    Corrupted { path: PathBuf, reason: String },

    /// Filesystem I/O error.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Snapshot schema version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: String, found: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub schema_version: String,
    pub generated_at: String,
    /// Roadmap id to status.
    pub statuses: BTreeMap<String, String>,
}

impl StatusSnapshot {
    pub fn new(statuses: BTreeMap<String, String>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            statuses,
        }
    }

    /// Capture every item in `index` whose status is a member of the state set.
    pub fn from_index(index: &RoadmapIndex) -> Self {
        let statuses = index
            .iter()
            .filter_map(|(id, status)| {
                let status = RoadmapStatus::parse(status?)?;
                Some((id.to_string(), status.as_str().to_string()))
            })
            .collect();
        Self::new(statuses)
    }

    pub fn previous_status(&self, id: &str) -> Option<RoadmapStatus> {
        self.statuses
            .get(id)
            .map(String::as_str)
            .and_then(RoadmapStatus::parse)
    }

    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }
}

/// Read a snapshot. A missing file is not an error: it returns `None`.
pub fn read_snapshot(path: &Path) -> Result<Option<StatusSnapshot>, SnapshotIoError> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path).map_err(|e| SnapshotIoError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    let snapshot: StatusSnapshot =
        serde_json::from_str(&content).map_err(|e| SnapshotIoError::Corrupted {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    if snapshot.schema_version != SCHEMA_VERSION {
        return Err(SnapshotIoError::VersionMismatch {
            expected: SCHEMA_VERSION.to_string(),
            found: snapshot.schema_version,
        });
    }

    Ok(Some(snapshot))
}

/// Write a snapshot atomically, refreshing `generated_at`.
pub fn write_snapshot(path: &Path, snapshot: &mut StatusSnapshot) -> Result<(), SnapshotIoError> {
    snapshot.generated_at = chrono::Utc::now().to_rfc3339();

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir).map_err(|e| SnapshotIoError::Io {
        path: dir.clone(),
        source: e,
    })?;

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| DEFAULT_FILENAME.to_string());
    let temp_path = dir.join(format!(".{file_name}.tmp"));
    let json = serde_json::to_string_pretty(snapshot)?;

    let mut file = std::fs::File::create(&temp_path).map_err(|e| SnapshotIoError::Io {
        path: temp_path.clone(),
        source: e,
    })?;
    file.write_all(json.as_bytes())
        .map_err(|e| SnapshotIoError::Io {
            path: temp_path.clone(),
            source: e,
        })?;
    file.sync_all().map_err(|e| SnapshotIoError::Io {
        path: temp_path.clone(),
        source: e,
    })?;

    std::fs::rename(&temp_path, path).map_err(|e| SnapshotIoError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(())
}
