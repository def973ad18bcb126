//! Architecture Decision Record schema (`adr/ADR-*.md`).
//!
//! ADR status is a free enum: any membership-valid value is accepted, there
//! is no transition graph.

use super::fields::{FieldEnum, check_date, check_enum, check_id, require, warn_placeholders};
use crate::finding::ValidationOutcome;
use crate::frontmatter::Record;
use crate::ids::IdKind;

pub const REQUIRED_FIELDS: &[&str] = &["id", "title", "status", "category"];

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum AdrStatus {
    Proposed,
    Accepted,
    Deprecated,
    Superseded,
}

impl FieldEnum for AdrStatus {
    const ALL: &'static [Self] = &[
        Self::Proposed,
        Self::Accepted,
        Self::Deprecated,
        Self::Superseded,
    ];

    fn as_str(self) -> &'static str {
        match self {
            Self::Proposed => "proposed",
            Self::Accepted => "accepted",
            Self::Deprecated => "deprecated",
            Self::Superseded => "superseded",
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum AdrCategory {
    Architecture,
    Infrastructure,
    Security,
    Performance,
}

impl FieldEnum for AdrCategory {
    const ALL: &'static [Self] = &[
        Self::Architecture,
        Self::Infrastructure,
        Self::Security,
        Self::Performance,
    ];

    fn as_str(self) -> &'static str {
        match self {
            Self::Architecture => "architecture",
            Self::Infrastructure => "infrastructure",
            Self::Security => "security",
            Self::Performance => "performance",
        }
    }
}

pub fn validate(record: &Record) -> ValidationOutcome {
    let mut out = ValidationOutcome::new();
    require(record, REQUIRED_FIELDS, &mut out);
    check_id(record, "id", IdKind::Adr, &mut out);
    let status = check_enum::<AdrStatus>(record, "status", &mut out);
    check_enum::<AdrCategory>(record, "category", &mut out);
    check_date(record, "date", &mut out);

    if status == Some(AdrStatus::Superseded) && !record.has("superseded_by") {
        out.warning("Superseded ADR should name its replacement in superseded_by");
    }

    warn_placeholders(record, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontmatter::extract;

    fn run(yaml: &str) -> ValidationOutcome {
        let rec = extract(&format!("---\n{yaml}\n---\n"))
            .record
            .expect("fixture should parse");
        validate(&rec)
    }

    #[test]
    fn test_valid_adr() {
        let out = run("id: ADR-001\ntitle: Use YAML front matter\nstatus: accepted\ncategory: architecture\ndate: 2024-03-01");
        assert!(out.is_clean(), "{out:?}");
    }

    #[test]
    fn test_withdrawn_status_rejected() {
        let out = run("id: ADR-002\ntitle: T\nstatus: \"withdrawn\"\ncategory: security");
        assert_eq!(out.errors.len(), 1);
        assert!(out.errors[0].starts_with("Invalid status: \"withdrawn\""));
    }

    #[test]
    fn test_any_member_status_accepted() {
        for status in ["proposed", "accepted", "deprecated"] {
            let out = run(&format!(
                "id: ADR-003\ntitle: T\nstatus: {status}\ncategory: performance"
            ));
            assert!(out.errors.is_empty(), "{status}: {:?}", out.errors);
        }
    }

    #[test]
    fn test_category_and_required_fields() {
        let out = run("id: ADR-4\nstatus: accepted\ncategory: process");
        assert_eq!(
            out.errors,
            vec![
                "Missing required field: title".to_string(),
                "Invalid category: \"process\" (allowed: architecture, infrastructure, security, performance)"
                    .to_string(),
            ]
        );
    }

    #[test]
    fn test_superseded_without_replacement_warns() {
        let out = run("id: ADR-5\ntitle: T\nstatus: superseded\ncategory: infrastructure");
        assert!(out.errors.is_empty());
        assert_eq!(out.warnings.len(), 1);
    }
}
