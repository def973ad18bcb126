//! Run report: per-file findings aggregated into one summary.
//!
//! Rendering to text is split into tagged lines so the CLI decides how to
//! colour them; the library never writes to stdout.

use serde::{Deserialize, Serialize};

use crate::error::{GovernanceError, Result};
use crate::finding::ValidationOutcome;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// Records (files) checked.
    pub total: usize,
    /// Error messages across all records.
    pub errors: usize,
    /// Warning messages across all records.
    pub warnings: usize,
    /// Records with zero errors.
    pub passed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub file: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub summary: Summary,
    pub errors: Vec<Entry>,
    pub warnings: Vec<Entry>,
    pub passed: Vec<String>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one record's outcome.
    pub fn record(&mut self, file: impl Into<String>, outcome: ValidationOutcome) {
        let file = file.into();
        self.summary.total += 1;
        self.summary.errors += outcome.errors.len();
        self.summary.warnings += outcome.warnings.len();

        if outcome.errors.is_empty() {
            self.summary.passed += 1;
            self.passed.push(file.clone());
        }
        self.errors.extend(outcome.errors.into_iter().map(|message| Entry {
            file: file.clone(),
            message,
        }));
        self.warnings.extend(outcome.warnings.into_iter().map(|message| Entry {
            file: file.clone(),
            message,
        }));
    }

    /// Fold another report into this one (`--ci` runs several passes).
    pub fn merge(&mut self, other: Report) {
        self.summary.total += other.summary.total;
        self.summary.errors += other.summary.errors;
        self.summary.warnings += other.summary.warnings;
        self.summary.passed += other.summary.passed;
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
        self.passed.extend(other.passed);
    }

    pub fn has_errors(&self) -> bool {
        self.summary.errors > 0
    }

    /// 0 when there are no errors; warnings never fail a run.
    pub fn exit_code(&self) -> i32 {
        i32::from(self.has_errors())
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|source| GovernanceError::JsonSerialize { source })
    }

    pub fn render_human(&self, title: &str) -> Vec<Line> {
        let mut lines = vec![
            Line::new(LineKind::Heading, title),
            Line::new(LineKind::Heading, "=".repeat(title.chars().count())),
        ];

        if !self.errors.is_empty() {
            lines.push(Line::blank());
            lines.push(Line::new(
                LineKind::Heading,
                format!("ERRORS ({})", self.errors.len()),
            ));
            for entry in &self.errors {
                lines.push(Line::new(
                    LineKind::Error,
                    format!("  ✗ {}: {}", entry.file, entry.message),
                ));
            }
        }

        if !self.warnings.is_empty() {
            lines.push(Line::blank());
            lines.push(Line::new(
                LineKind::Heading,
                format!("WARNINGS ({})", self.warnings.len()),
            ));
            for entry in &self.warnings {
                lines.push(Line::new(
                    LineKind::Warning,
                    format!("  ⚠ {}: {}", entry.file, entry.message),
                ));
            }
        }

        if !self.passed.is_empty() {
            lines.push(Line::blank());
            lines.push(Line::new(
                LineKind::Heading,
                format!("PASSED ({})", self.passed.len()),
            ));
            for file in &self.passed {
                lines.push(Line::new(LineKind::Passed, format!("  ✓ {file}")));
            }
        }

        lines.push(Line::blank());
        let s = &self.summary;
        lines.push(Line::new(
            if self.has_errors() {
                LineKind::Error
            } else {
                LineKind::Passed
            },
            format!(
                "Summary: {} checked, {} error{}, {} warning{}, {} passed",
                s.total,
                s.errors,
                plural(s.errors),
                s.warnings,
                plural(s.warnings),
                s.passed
            ),
        ));
        lines
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Heading,
    Error,
    Warning,
    Passed,
    Plain,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub kind: LineKind,
    pub text: String,
}

impl Line {
    pub fn new(kind: LineKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    fn blank() -> Self {
        Self::new(LineKind::Plain, "")
    }
}
