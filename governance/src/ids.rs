//! Canonical identifier formats for governance records.

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static ROAD_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"^ROAD-\d+$"));
static ADR_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"^ADR-\d+$"));
static CHANGE_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"^CHANGE-\d+$"));
static CAP_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"^CAP-\d+$"));
static US_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"^US-\d+$"));
static PER_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"^PER-\d+$"));
static NFR_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"^NFR-[A-Z]+-\d+$"));

/// Template placeholders authors forget to replace (`ROAD-XXX`, `YYYY-MM-DD`, ...).
static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"\b(?:ROAD|ADR|CHANGE|CAP|US|PER|NFR)-X{2,}\b|YYYY-MM-DD"));

#[allow(clippy::unwrap_used)] // patterns are literals covered by tests
pub(crate) fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap()
}

/// Record identifier families.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdKind {
    Road,
    Adr,
    Change,
    Capability,
    UserStory,
    Persona,
    Nfr,
}

impl IdKind {
    pub fn all() -> [Self; 7] {
        [
            Self::Road,
            Self::Adr,
            Self::Change,
            Self::Capability,
            Self::UserStory,
            Self::Persona,
            Self::Nfr,
        ]
    }

    /// Prefix shared by every id of this kind, including the dash.
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Road => "ROAD-",
            Self::Adr => "ADR-",
            Self::Change => "CHANGE-",
            Self::Capability => "CAP-",
            Self::UserStory => "US-",
            Self::Persona => "PER-",
            Self::Nfr => "NFR-",
        }
    }

    /// Human-readable pattern used in error messages.
    pub fn pattern(self) -> &'static str {
        match self {
            Self::Road => r"ROAD-\d+",
            Self::Adr => r"ADR-\d+",
            Self::Change => r"CHANGE-\d+",
            Self::Capability => r"CAP-\d+",
            Self::UserStory => r"US-\d+",
            Self::Persona => r"PER-\d+",
            Self::Nfr => r"NFR-[A-Z]+-\d+",
        }
    }

    fn regex(self) -> &'static Regex {
        match self {
            Self::Road => &ROAD_RE,
            Self::Adr => &ADR_RE,
            Self::Change => &CHANGE_RE,
            Self::Capability => &CAP_RE,
            Self::UserStory => &US_RE,
            Self::Persona => &PER_RE,
            Self::Nfr => &NFR_RE,
        }
    }

    pub fn matches(self, id: &str) -> bool {
        self.regex().is_match(id)
    }

    /// Infer the kind from an id's prefix (format is not checked).
    pub fn infer(id: &str) -> Option<Self> {
        Self::all()
            .into_iter()
            .find(|kind| id.starts_with(kind.prefix()))
    }
}

/// Whether `value` still carries an unresolved template placeholder.
pub fn is_placeholder(value: &str) -> bool {
    PLACEHOLDER_RE.is_match(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_patterns() {
        assert!(IdKind::Road.matches("ROAD-001"));
        assert!(!IdKind::Road.matches("ROAD-1a"));
        assert!(!IdKind::Road.matches("road-001"));
        assert!(IdKind::Adr.matches("ADR-12"));
        assert!(IdKind::Change.matches("CHANGE-3"));
        assert!(IdKind::Capability.matches("CAP-999"));
        assert!(IdKind::UserStory.matches("US-4"));
        assert!(IdKind::Persona.matches("PER-2"));
        assert!(IdKind::Nfr.matches("NFR-PERF-001"));
        assert!(!IdKind::Nfr.matches("NFR-001"));
        assert!(!IdKind::Nfr.matches("NFR-perf-001"));
    }

    #[test]
    fn test_infer_from_prefix() {
        assert_eq!(IdKind::infer("ROAD-7"), Some(IdKind::Road));
        assert_eq!(IdKind::infer("CHANGE-7"), Some(IdKind::Change));
        assert_eq!(IdKind::infer("NFR-SEC-1"), Some(IdKind::Nfr));
        assert_eq!(IdKind::infer("TASK-1"), None);
    }

    #[test]
    fn test_placeholders() {
        assert!(is_placeholder("ROAD-XXX"));
        assert!(is_placeholder("NFR-XXX-000"));
        assert!(is_placeholder("YYYY-MM-DD"));
        assert!(is_placeholder("Depends on ADR-XX"));
        assert!(!is_placeholder("ROAD-001"));
        assert!(!is_placeholder("Extra large"));
    }
}
