//! Field-level checks shared by every record validator.

use regex_lite::Regex;
use serde_json::Value;
use std::sync::LazyLock;

use crate::finding::ValidationOutcome;
use crate::frontmatter::Record;
use crate::ids::{IdKind, compile, is_placeholder};

static DATE_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"^\d{4}-\d{2}-\d{2}$"));

/// Closed set of string values a front-matter field may take.
pub trait FieldEnum: Sized + Copy + 'static {
    const ALL: &'static [Self];

    fn as_str(self) -> &'static str;

    fn parse(value: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.as_str() == value)
    }

    /// Comma-separated allowed values for error messages.
    fn allowed() -> String {
        Self::ALL
            .iter()
            .copied()
            .map(Self::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Emit `Missing required field: <name>` for every absent field.
pub(crate) fn require(record: &Record, fields: &[&str], out: &mut ValidationOutcome) {
    for field in fields {
        if !record.has(field) {
            out.error(format!("Missing required field: {field}"));
        }
    }
}

/// Check the id stored at `path` against `kind`. Returns the id when it is well-formed.
pub(crate) fn check_id<'r>(
    record: &'r Record,
    path: &str,
    kind: IdKind,
    out: &mut ValidationOutcome,
) -> Option<&'r str> {
    let value = record.get_path(path)?;
    if value.is_null() {
        return None;
    }
    let Some(id) = value.as_str() else {
        out.error(format!(
            "Invalid {path} format: {} (expected {})",
            describe(value),
            kind.pattern()
        ));
        return None;
    };
    check_id_value(path, id, kind, out).then_some(id)
}

/// Format check for a single id. Blank values and template placeholders are
/// skipped here; they are reported by `require` and `warn_placeholders`.
pub(crate) fn check_id_value(
    label: &str,
    id: &str,
    kind: IdKind,
    out: &mut ValidationOutcome,
) -> bool {
    if id.trim().is_empty() || is_placeholder(id) {
        return false;
    }
    if !kind.matches(id) {
        out.error(format!(
            "Invalid {label} format: \"{id}\" (expected {})",
            kind.pattern()
        ));
        return false;
    }
    true
}

/// Enum membership for the value at `path`, if present.
pub(crate) fn check_enum<E: FieldEnum>(
    record: &Record,
    path: &str,
    out: &mut ValidationOutcome,
) -> Option<E> {
    match record.get_path(path)? {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => check_enum_value(path, s, out),
        other => {
            out.error(format!(
                "Invalid {path}: {} (allowed: {})",
                describe(other),
                E::allowed()
            ));
            None
        }
    }
}

pub(crate) fn check_enum_value<E: FieldEnum>(
    label: &str,
    value: &str,
    out: &mut ValidationOutcome,
) -> Option<E> {
    let parsed = E::parse(value);
    if parsed.is_none() {
        out.error(format!(
            "Invalid {label}: \"{value}\" (allowed: {})",
            E::allowed()
        ));
    }
    parsed
}

/// Strict `YYYY-MM-DD` calendar date. Violations are warnings.
pub(crate) fn check_date(record: &Record, path: &str, out: &mut ValidationOutcome) {
    let Some(value) = record.get_path(path) else {
        return;
    };
    if value.is_null() {
        return;
    }
    let text = scalar_text(value);
    match text.as_deref() {
        Some(s) if is_placeholder(s) => {}
        Some(s) if is_strict_date(s) => {}
        _ => out.warning(format!(
            "Invalid date format for {path}: {} (expected YYYY-MM-DD)",
            describe(value)
        )),
    }
}

pub fn is_strict_date(value: &str) -> bool {
    DATE_RE.is_match(value) && chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

/// Warn about every string value that still carries a template placeholder.
pub(crate) fn warn_placeholders(record: &Record, out: &mut ValidationOutcome) {
    for (key, value) in record.as_map() {
        walk_placeholders(key, value, out);
    }
}

fn walk_placeholders(path: &str, value: &Value, out: &mut ValidationOutcome) {
    match value {
        Value::String(s) if is_placeholder(s) => {
            out.warning(format!("Unresolved template placeholder in {path}: \"{s}\""));
        }
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                walk_placeholders(&format!("{path}[{i}]"), item, out);
            }
        }
        Value::Object(map) => {
            for (key, item) in map {
                walk_placeholders(&format!("{path}.{key}"), item, out);
            }
        }
        _ => {}
    }
}

/// Render a scalar as text; YAML may hand back `1.2` as a number.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Short description of a value for error messages.
pub(crate) fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => format!("\"{s}\""),
        Value::Array(_) => "a list".to_string(),
        Value::Object(_) => "a mapping".to_string(),
    }
}
