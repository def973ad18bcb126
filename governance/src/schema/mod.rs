//! Per-kind schema validators.
//!
//! Each validator is a pure function from a parsed front-matter record (plus
//! cross-reference context) to a `ValidationOutcome`.

pub mod adr;
pub mod change;
pub mod fields;
pub mod nfr;
pub mod roadmap;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::finding::ValidationOutcome;
use crate::frontmatter::Record;
use crate::ids::IdKind;

pub use fields::{FieldEnum, is_strict_date};

/// Governance record kinds stored as Markdown files.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Roadmap,
    Adr,
    Change,
    Nfr,
}

impl RecordKind {
    pub fn all() -> [Self; 4] {
        [Self::Roadmap, Self::Adr, Self::Change, Self::Nfr]
    }

    pub fn id_kind(self) -> IdKind {
        match self {
            Self::Roadmap => IdKind::Road,
            Self::Adr => IdKind::Adr,
            Self::Change => IdKind::Change,
            Self::Nfr => IdKind::Nfr,
        }
    }

    /// File name prefix, e.g. `ROAD-` for `roads/ROAD-001.md`.
    pub fn file_prefix(self) -> &'static str {
        self.id_kind().prefix()
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Roadmap => "Roadmap Item",
            Self::Adr => "ADR",
            Self::Change => "Change Entry",
            Self::Nfr => "NFR",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::all()
            .into_iter()
            .find(|kind| id.starts_with(kind.file_prefix()))
    }

    pub fn validate(self, record: &Record, ctx: &ValidationContext<'_>) -> ValidationOutcome {
        match self {
            Self::Roadmap => roadmap::validate(record, ctx),
            Self::Adr => adr::validate(record),
            Self::Change => change::validate(record, ctx),
            Self::Nfr => nfr::validate(record),
        }
    }
}

/// Roadmap ids known to the current run, with their declared status.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RoadmapIndex {
    statuses: BTreeMap<String, Option<String>>,
}

impl RoadmapIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an item. The first registration of an id wins.
    pub fn insert(&mut self, id: impl Into<String>, status: Option<String>) -> bool {
        let id = id.into();
        if self.statuses.contains_key(&id) {
            return false;
        }
        self.statuses.insert(id, status);
        true
    }

    pub fn contains(&self, id: &str) -> bool {
        self.statuses.contains_key(id)
    }

    pub fn status(&self, id: &str) -> Option<&str> {
        self.statuses.get(id).and_then(Option::as_deref)
    }

    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }

    /// Ids in sorted order with their declared status.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.statuses
            .iter()
            .map(|(id, status)| (id.as_str(), status.as_deref()))
    }
}

/// Cross-reference data a validator may consult.
#[derive(Clone, Copy, Debug)]
pub struct ValidationContext<'a> {
    pub roadmap: &'a RoadmapIndex,
    pub required_signature_roles: &'a [String],
}

impl<'a> ValidationContext<'a> {
    pub fn new(roadmap: &'a RoadmapIndex, required_signature_roles: &'a [String]) -> Self {
        Self {
            roadmap,
            required_signature_roles,
        }
    }
}
