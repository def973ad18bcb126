//! Non-Functional Requirement schema (`nfr/NFR-*.md`).

use super::fields::{FieldEnum, check_enum, check_id, require, warn_placeholders};
use crate::finding::ValidationOutcome;
use crate::frontmatter::Record;
use crate::ids::IdKind;

pub const REQUIRED_FIELDS: &[&str] = &["id", "type"];

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum NfrType {
    Performance,
    Security,
    Accessibility,
}

impl FieldEnum for NfrType {
    const ALL: &'static [Self] = &[Self::Performance, Self::Security, Self::Accessibility];

    fn as_str(self) -> &'static str {
        match self {
            Self::Performance => "performance",
            Self::Security => "security",
            Self::Accessibility => "accessibility",
        }
    }
}

impl NfrType {
    /// Id category conventionally used for this type (`NFR-PERF-001`).
    pub fn id_category(self) -> &'static str {
        match self {
            Self::Performance => "PERF",
            Self::Security => "SEC",
            Self::Accessibility => "ACC",
        }
    }

    fn from_id_category(category: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.id_category() == category)
    }
}

pub fn validate(record: &Record) -> ValidationOutcome {
    let mut out = ValidationOutcome::new();
    require(record, REQUIRED_FIELDS, &mut out);
    let id = check_id(record, "id", IdKind::Nfr, &mut out);
    let declared = check_enum::<NfrType>(record, "type", &mut out);

    if let (Some(id), Some(declared)) = (id, declared)
        && let Some(category) = id.split('-').nth(1)
        && let Some(implied) = NfrType::from_id_category(category)
        && implied != declared
    {
        out.warning(format!(
            "NFR id {id} suggests type {} but type is {}",
            implied.as_str(),
            declared.as_str()
        ));
    }

    warn_placeholders(record, &mut out);
    out
}
