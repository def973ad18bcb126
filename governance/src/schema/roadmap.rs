//! Roadmap Item schema (`roads/ROAD-*.md`).

use serde_json::Value;

use super::fields::{
    FieldEnum, check_date, check_enum, check_id, check_id_value, describe, require,
    warn_placeholders,
};
use super::ValidationContext;
use crate::finding::ValidationOutcome;
use crate::frontmatter::Record;
use crate::ids::{IdKind, is_placeholder};
use crate::state_machine::RoadmapStatus;

pub const REQUIRED_FIELDS: &[&str] = &["id", "title", "status"];
pub const DATE_FIELDS: &[&str] = &["created", "started", "completed"];
pub const REFERENCE_FIELDS: &[&str] = &["depends_on", "blocked_by", "blocks"];

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl FieldEnum for Priority {
    const ALL: &'static [Self] = &[Self::High, Self::Medium, Self::Low];

    fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

/// `governance.bdd.status`
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum BddStatus {
    Draft,
    Approved,
}

impl FieldEnum for BddStatus {
    const ALL: &'static [Self] = &[Self::Draft, Self::Approved];

    fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Approved => "approved",
        }
    }
}

/// `governance.nfrs.status`
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum NfrStatus {
    Pending,
    Validating,
    Pass,
    Fail,
}

impl FieldEnum for NfrStatus {
    const ALL: &'static [Self] = &[Self::Pending, Self::Validating, Self::Pass, Self::Fail];

    fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Validating => "validating",
            Self::Pass => "pass",
            Self::Fail => "fail",
        }
    }
}

pub fn validate(record: &Record, ctx: &ValidationContext<'_>) -> ValidationOutcome {
    let mut out = ValidationOutcome::new();

    require(record, REQUIRED_FIELDS, &mut out);
    let id = check_id(record, "id", IdKind::Road, &mut out);
    check_enum::<RoadmapStatus>(record, "status", &mut out);
    check_enum::<Priority>(record, "priority", &mut out);

    if let Some(phase) = record.get_path("phase")
        && !phase.is_null()
        && phase.as_u64().is_none()
    {
        out.error(format!(
            "Invalid phase: {} (expected a non-negative integer)",
            describe(phase)
        ));
    }

    for field in DATE_FIELDS {
        check_date(record, field, &mut out);
    }

    for field in REFERENCE_FIELDS {
        check_references(record, field, id, ctx, &mut out);
    }

    check_governance(record, &mut out);
    warn_placeholders(record, &mut out);
    out
}

fn check_references(
    record: &Record,
    field: &str,
    own_id: Option<&str>,
    ctx: &ValidationContext<'_>,
    out: &mut ValidationOutcome,
) {
    let Some(value) = record.get_path(field) else {
        return;
    };
    let items = match value {
        Value::Null => return,
        Value::Array(items) => items,
        other => {
            out.error(format!(
                "Invalid {field}: {} (expected a list of roadmap ids)",
                describe(other)
            ));
            return;
        }
    };

    for (i, item) in items.iter().enumerate() {
        let label = format!("{field}[{i}]");
        let Some(reference) = item.as_str() else {
            out.error(format!(
                "Invalid {label} format: {} (expected {})",
                describe(item),
                IdKind::Road.pattern()
            ));
            continue;
        };
        if !check_id_value(&label, reference, IdKind::Road, out) {
            continue;
        }
        if Some(reference) == own_id {
            out.error(format!("{field} must not reference the item itself ({reference})"));
        } else if !ctx.roadmap.is_empty() && !ctx.roadmap.contains(reference) {
            out.warning(format!(
                "{field} references unknown roadmap item: {reference}"
            ));
        }
    }
}

fn check_governance(record: &Record, out: &mut ValidationOutcome) {
    match record.get_path("governance") {
        None | Some(Value::Null) => {
            out.warning("Missing governance section");
            return;
        }
        Some(Value::Object(_)) => {}
        Some(other) => {
            out.error(format!(
                "Invalid governance: {} (expected a mapping)",
                describe(other)
            ));
            return;
        }
    }

    for section in ["adrs", "bdd", "nfrs"] {
        if !record.has(&format!("governance.{section}")) {
            out.warning(format!("Missing governance.{section} section"));
        }
    }

    if let Some(validated) = record.get_path("governance.adrs.validated")
        && !validated.is_null()
        && !validated.is_boolean()
    {
        out.error(format!(
            "Invalid governance.adrs.validated: {} (expected true or false)",
            describe(validated)
        ));
    }

    check_enum::<BddStatus>(record, "governance.bdd.status", out);
    for counter in ["total", "passed", "failed"] {
        let path = format!("governance.bdd.{counter}");
        if let Some(value) = record.get_path(&path)
            && !value.is_null()
            && value.as_u64().is_none()
        {
            out.warning(format!(
                "Invalid {path}: {} (expected a non-negative integer)",
                describe(value)
            ));
        }
    }

    check_enum::<NfrStatus>(record, "governance.nfrs.status", out);

    match record.get_path("governance.nfrs.applicable") {
        None | Some(Value::Null) => {}
        Some(Value::Array(items)) => {
            for (i, item) in items.iter().enumerate() {
                let label = format!("governance.nfrs.applicable[{i}]");
                match item.as_str() {
                    Some(nfr) => {
                        check_id_value(&label, nfr, IdKind::Nfr, out);
                    }
                    None => out.error(format!(
                        "Invalid {label} format: {} (expected {})",
                        describe(item),
                        IdKind::Nfr.pattern()
                    )),
                }
            }
        }
        Some(other) => out.error(format!(
            "Invalid governance.nfrs.applicable: {} (expected a list of NFR ids)",
            describe(other)
        )),
    }

    if let Some(results) = record.get_path("governance.nfrs.results")
        && !results.is_null()
        && !results.is_object()
    {
        out.error(format!(
            "Invalid governance.nfrs.results: {} (expected a mapping of NFR id to result)",
            describe(results)
        ));
    }
}

/// Whether a declared id is a template leftover rather than a real id.
pub fn is_template(record: &Record) -> bool {
    record.str_at("id").is_some_and(is_placeholder)
}
