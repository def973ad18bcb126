//! Change Entry schema (`changes/CHANGE-*.md`).
//!
//! Drafts get structural checks only. Publishing additionally requires the
//! referenced roadmap item to be complete, a fully approved signature list
//! covering the configured roles, and no failed compliance checks.

use regex_lite::Regex;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::sync::LazyLock;

use super::ValidationContext;
use super::fields::{
    FieldEnum, check_date, check_enum, check_enum_value, check_id, describe, is_strict_date,
    require, scalar_text, warn_placeholders,
};
use crate::finding::{Severity, ValidationOutcome};
use crate::frontmatter::Record;
use crate::ids::{IdKind, compile, is_placeholder};
use crate::state_machine::RoadmapStatus;

static SEMVER_RE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"^v?\d+\.\d+\.\d+(?:[-+][0-9A-Za-z.+-]+)?$"));

pub const REQUIRED_FIELDS: &[&str] = &[
    "id", "road_id", "title", "date", "version", "status", "categories",
];
pub const COMPLIANCE_CHECKS: &[&str] = &["adr_check", "bdd_check", "nfr_checks"];
pub const SIGNATURE_FIELDS: &[&str] = &["agent", "role", "status", "timestamp"];
pub const APPROVED: &str = "approved";

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ChangeStatus {
    Draft,
    Published,
}

impl FieldEnum for ChangeStatus {
    const ALL: &'static [Self] = &[Self::Draft, Self::Published];

    fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
        }
    }
}

/// Keep-a-changelog section names.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ChangeCategory {
    Added,
    Changed,
    Deprecated,
    Removed,
    Fixed,
    Security,
}

impl FieldEnum for ChangeCategory {
    const ALL: &'static [Self] = &[
        Self::Added,
        Self::Changed,
        Self::Deprecated,
        Self::Removed,
        Self::Fixed,
        Self::Security,
    ];

    fn as_str(self) -> &'static str {
        match self {
            Self::Added => "Added",
            Self::Changed => "Changed",
            Self::Deprecated => "Deprecated",
            Self::Removed => "Removed",
            Self::Fixed => "Fixed",
            Self::Security => "Security",
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ComplianceStatus {
    Pending,
    Pass,
    Fail,
    Na,
}

impl FieldEnum for ComplianceStatus {
    const ALL: &'static [Self] = &[Self::Pending, Self::Pass, Self::Fail, Self::Na];

    fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Pass => "pass",
            Self::Fail => "fail",
            Self::Na => "na",
        }
    }
}

pub fn validate(record: &Record, ctx: &ValidationContext<'_>) -> ValidationOutcome {
    let mut out = ValidationOutcome::new();

    require(record, REQUIRED_FIELDS, &mut out);
    check_id(record, "id", IdKind::Change, &mut out);
    let published = check_enum::<ChangeStatus>(record, "status", &mut out)
        == Some(ChangeStatus::Published);
    check_date(record, "date", &mut out);

    if let Some(version) = record.get_path("version").and_then(scalar_text)
        && !version.trim().is_empty()
        && !is_placeholder(&version)
        && !SEMVER_RE.is_match(&version)
    {
        out.warning(format!(
            "Version \"{version}\" is not a semantic version (expected MAJOR.MINOR.PATCH)"
        ));
    }

    check_categories(record, &mut out);
    check_road_reference(record, published, ctx, &mut out);
    check_compliance(record, published, &mut out);
    check_signatures(record, published, ctx.required_signature_roles, &mut out);
    warn_placeholders(record, &mut out);
    out
}

fn check_categories(record: &Record, out: &mut ValidationOutcome) {
    match record.get_path("categories") {
        None | Some(Value::Null) => {}
        Some(Value::Array(items)) if items.is_empty() => {
            out.error("categories must list at least one category");
        }
        Some(Value::Array(items)) => {
            for item in items {
                match item.as_str() {
                    Some(category) => {
                        check_enum_value::<ChangeCategory>("category", category, out);
                    }
                    None => out.error(format!(
                        "Invalid category: {} (allowed: {})",
                        describe(item),
                        ChangeCategory::allowed()
                    )),
                }
            }
        }
        Some(other) => out.error(format!(
            "Invalid categories: {} (expected a list)",
            describe(other)
        )),
    }
}

fn check_road_reference(
    record: &Record,
    published: bool,
    ctx: &ValidationContext<'_>,
    out: &mut ValidationOutcome,
) {
    let Some(road_id) = check_id(record, "road_id", IdKind::Road, out) else {
        return;
    };
    if !ctx.roadmap.contains(road_id) {
        out.error(format!("Referenced roadmap item not found: {road_id}"));
        return;
    }
    if published {
        let status = ctx.roadmap.status(road_id);
        if status != Some(RoadmapStatus::Complete.as_str()) {
            out.error(format!(
                "Published CHANGE entries require {road_id} to be complete (status is {})",
                status.map_or_else(|| "missing".to_string(), |s| format!("\"{s}\""))
            ));
        }
    }
}

struct ComplianceEntry<'v> {
    label: String,
    status: Option<&'v Value>,
}

fn compliance_entries<'v>(label: &str, value: &'v Value) -> Vec<ComplianceEntry<'v>> {
    let entry = |label: String, status: Option<&'v Value>| ComplianceEntry { label, status };
    match value {
        Value::Object(map) if map.contains_key("status") => {
            vec![entry(label.to_string(), map.get("status"))]
        }
        // Keyed by NFR id: `nfr_checks: {NFR-PERF-001: {status: pass}}`
        Value::Object(map) => map
            .iter()
            .map(|(key, item)| entry(format!("{label}.{key}"), entry_status(item)))
            .collect(),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| entry(format!("{label}[{i}]"), entry_status(item)))
            .collect(),
        // Shorthand: `adr_check: pass`
        scalar => vec![entry(label.to_string(), Some(scalar))],
    }
}

fn entry_status(item: &Value) -> Option<&Value> {
    match item {
        Value::Object(map) => map.get("status"),
        other => Some(other),
    }
}

fn check_compliance(record: &Record, published: bool, out: &mut ValidationOutcome) {
    let checks: &Map<String, Value> = match record.get_path("compliance") {
        None | Some(Value::Null) => {
            if published {
                out.warning("Missing compliance section");
            }
            return;
        }
        Some(Value::Object(map)) => map,
        Some(other) => {
            out.error(format!(
                "Invalid compliance: {} (expected a mapping)",
                describe(other)
            ));
            return;
        }
    };

    let severity = if published {
        Severity::Error
    } else {
        Severity::Warning
    };

    for check in COMPLIANCE_CHECKS {
        let label = format!("compliance.{check}");
        let Some(value) = checks.get(*check) else {
            if published {
                out.warning(format!("Missing {label}"));
            }
            continue;
        };

        for entry in compliance_entries(&label, value) {
            let status = match entry.status {
                None | Some(Value::Null) => {
                    out.push(severity, format!("Missing status for {}", entry.label));
                    continue;
                }
                Some(Value::String(s)) => s.as_str(),
                Some(other) => {
                    out.error(format!(
                        "Invalid {} status: {} (allowed: {})",
                        entry.label,
                        describe(other),
                        ComplianceStatus::allowed()
                    ));
                    continue;
                }
            };
            let parsed =
                check_enum_value::<ComplianceStatus>(&format!("{} status", entry.label), status, out);
            if !published {
                continue;
            }
            match parsed {
                Some(ComplianceStatus::Fail) => {
                    out.error(format!("Compliance check failed: {}", entry.label));
                }
                Some(ComplianceStatus::Pending) => {
                    out.warning(format!("Compliance check still pending: {}", entry.label));
                }
                _ => {}
            }
        }
    }
}

fn check_signatures(
    record: &Record,
    published: bool,
    required_roles: &[String],
    out: &mut ValidationOutcome,
) {
    let signatures: &[Value] = match record.get_path("signatures") {
        None | Some(Value::Null) => &[],
        Some(Value::Array(items)) => items,
        Some(other) => {
            out.error(format!(
                "Invalid signatures: {} (expected a list)",
                describe(other)
            ));
            return;
        }
    };

    if signatures.is_empty() {
        if published {
            out.error("Published CHANGE entries must have signatures array");
        }
        return;
    }

    let severity = if published {
        Severity::Error
    } else {
        Severity::Warning
    };
    let mut roles = BTreeSet::new();

    for (i, signature) in signatures.iter().enumerate() {
        let n = i + 1;
        let Some(map) = signature.as_object() else {
            out.push(
                severity,
                format!("Signature #{n} must be a mapping with agent, role, status, timestamp"),
            );
            continue;
        };

        for field in SIGNATURE_FIELDS {
            let present = match map.get(*field) {
                None | Some(Value::Null) => false,
                Some(Value::String(s)) => !s.trim().is_empty(),
                Some(_) => true,
            };
            if !present {
                out.push(severity, format!("Signature #{n} missing field: {field}"));
            }
        }

        if let Some(role) = map.get("role").and_then(Value::as_str) {
            roles.insert(role.trim().to_ascii_lowercase());
        }

        if let Some(timestamp) = map.get("timestamp").and_then(scalar_text)
            && !timestamp.trim().is_empty()
            && !is_timestamp(&timestamp)
        {
            out.warning(format!(
                "Signature #{n} timestamp \"{timestamp}\" is not an ISO 8601 date or datetime"
            ));
        }

        if published
            && let Some(status) = map.get("status").and_then(Value::as_str)
            && status != APPROVED
        {
            let agent = map
                .get("agent")
                .and_then(Value::as_str)
                .unwrap_or("unknown agent");
            out.error(format!(
                "Signature #{n} ({agent}) is not approved (status \"{status}\")"
            ));
        }
    }

    if published {
        let missing: Vec<&str> = required_roles
            .iter()
            .map(String::as_str)
            .filter(|role| !roles.contains(&role.to_ascii_lowercase()))
            .collect();
        if !missing.is_empty() {
            out.error(format!(
                "Missing required signature roles: {}",
                missing.join(", ")
            ));
        }
    }
}

fn is_timestamp(value: &str) -> bool {
    is_strict_date(value) || chrono::DateTime::parse_from_rfc3339(value).is_ok()
}
