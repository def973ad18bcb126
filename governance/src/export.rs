//! Dashboard data snapshots: `roadmap-data.json` and `bdd-data.json`.
//!
//! Both files are regenerated wholesale on every export.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::bdd::FeatureFile;
use crate::error::{GovernanceError, Result};
use crate::frontmatter::Record;
use crate::schema::FieldEnum;
use crate::schema::roadmap::Priority;
use crate::state_machine::RoadmapStatus;

pub const ROADMAP_DATA_FILE: &str = "roadmap-data.json";
pub const BDD_DATA_FILE: &str = "bdd-data.json";

/// A parsed Roadmap Item with the file it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoadmapEntry {
    pub file: String,
    #[serde(flatten)]
    pub record: Record,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadmapData {
    pub items: Vec<RoadmapEntry>,
    pub generated_at: String,
    pub valid_statuses: Vec<&'static str>,
    pub valid_priorities: Vec<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BddTest {
    pub file: String,
    pub feature: Option<String>,
    pub scenarios: usize,
    pub tags: Vec<String>,
    pub capabilities: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BddData {
    pub tests: Vec<BddTest>,
    pub generated_at: String,
}

pub fn roadmap_data(entries: Vec<RoadmapEntry>) -> RoadmapData {
    RoadmapData {
        items: entries,
        generated_at: now(),
        valid_statuses: RoadmapStatus::ALL.iter().copied().map(RoadmapStatus::as_str).collect(),
        valid_priorities: Priority::ALL.iter().copied().map(Priority::as_str).collect(),
    }
}

/// `relative` renders each feature path the way reports do.
pub fn bdd_data(files: &[FeatureFile], relative: impl Fn(&Path) -> String) -> BddData {
    let tests = files
        .iter()
        .map(|file| BddTest {
            file: relative(&file.path),
            feature: file.feature.clone(),
            scenarios: file.scenarios,
            tags: file.tags.clone(),
            capabilities: file.capabilities(),
        })
        .collect();
    BddData {
        tests,
        generated_at: now(),
    }
}

/// Write both snapshots into `dir`, creating it if needed.
pub fn write_export(dir: &Path, roadmap: &RoadmapData, bdd: &BddData) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir).map_err(|source| GovernanceError::DirectoryCreate {
        path: dir.to_path_buf(),
        source,
    })?;

    let written = vec![
        write_json(&dir.join(ROADMAP_DATA_FILE), roadmap)?,
        write_json(&dir.join(BDD_DATA_FILE), bdd)?,
    ];
    tracing::info!(
        dir = %dir.display(),
        items = roadmap.items.len(),
        tests = bdd.tests.len(),
        "dashboard data exported"
    );
    Ok(written)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<PathBuf> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|source| GovernanceError::JsonSerialize { source })?;
    std::fs::write(path, json).map_err(|source| GovernanceError::FileWrite {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(path.to_path_buf())
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}
