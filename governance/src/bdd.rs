//! BDD feature files and their capability tags.
//!
//! Only the Gherkin surface needed for traceability is read: tag lines,
//! the `Feature:` name and the number of scenarios. Step text is ignored.

use serde::Serialize;
use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::finding::{Severity, ValidationOutcome};
use crate::ids::IdKind;

/// Tag prefix that marks a capability reference.
pub const CAPABILITY_TAG_PREFIX: &str = "@CAP-";

const SCENARIO_KEYWORDS: &[&str] = &[
    "Scenario:",
    "Scenario Outline:",
    "Scenario Template:",
    "Example:",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureFile {
    pub path: PathBuf,
    pub feature: Option<String>,
    pub scenarios: usize,
    /// Every `@tag` in the file, first occurrence order, without duplicates.
    pub tags: Vec<String>,
}

impl FeatureFile {
    /// Tags that start with `@CAP-`, well-formed or not.
    pub fn capability_tags(&self) -> impl Iterator<Item = &str> {
        self.tags
            .iter()
            .map(String::as_str)
            .filter(|tag| tag.starts_with(CAPABILITY_TAG_PREFIX))
    }

    /// Capability ids (`CAP-001`) referenced by well-formed tags.
    pub fn capabilities(&self) -> Vec<String> {
        self.capability_tags()
            .map(|tag| tag.trim_start_matches('@'))
            .filter(|id| IdKind::Capability.matches(id))
            .map(str::to_string)
            .collect()
    }
}

pub fn parse_feature(path: impl Into<PathBuf>, text: &str) -> FeatureFile {
    let mut feature = None;
    let mut scenarios = 0;
    let mut tags: Vec<String> = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.starts_with('@') {
            for token in line.split_whitespace() {
                if token.starts_with('#') {
                    break;
                }
                if token.len() > 1 && token.starts_with('@') && !tags.iter().any(|t| t == token) {
                    tags.push(token.to_string());
                }
            }
        } else if let Some(name) = line.strip_prefix("Feature:") {
            if feature.is_none() {
                feature = Some(name.trim().to_string());
            }
        } else if SCENARIO_KEYWORDS.iter().any(|kw| line.starts_with(kw)) {
            scenarios += 1;
        }
    }

    FeatureFile {
        path: path.into(),
        feature,
        scenarios,
        tags,
    }
}

/// Check one feature file's capability tags against the known capability ids.
///
/// With `strict`, a file without any capability tag is an error instead of
/// a warning.
pub fn validate_feature(
    file: &FeatureFile,
    known: &BTreeSet<String>,
    strict: bool,
) -> ValidationOutcome {
    let mut out = ValidationOutcome::new();
    let mut found = false;

    for tag in file.capability_tags() {
        found = true;
        let id = tag.trim_start_matches('@');
        if !IdKind::Capability.matches(id) {
            out.error(format!(
                "Malformed capability tag: {tag} (expected @{})",
                IdKind::Capability.pattern()
            ));
        } else if !known.contains(id) {
            out.error(format!("Unknown capability tag: {tag}"));
        }
    }

    if !found {
        let severity = if strict {
            Severity::Error
        } else {
            Severity::Warning
        };
        out.push(severity, "No capability tag found");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const LOGIN: &str = "\
@CAP-001 @smoke
Feature: Login
  As a user I want to sign in

  @US-004 # story link
  Scenario: Valid credentials
    Given a registered user
    When they sign in
    Then they see the dashboard

  @CAP-001
  Scenario Outline: Locked account
    Given <user>
";

    fn known(ids: &[&str]) -> BTreeSet<String> {
        ids.iter().map(|id| id.to_string()).collect()
    }

    #[test]
    fn test_parse_feature() {
        let file = parse_feature("features/login.feature", LOGIN);
        assert_eq!(file.feature.as_deref(), Some("Login"));
        assert_eq!(file.scenarios, 2);
        assert_eq!(file.tags, vec!["@CAP-001", "@smoke", "@US-004"]);
        assert_eq!(file.capabilities(), vec!["CAP-001".to_string()]);
    }

    #[test]
    fn test_known_capability_passes() {
        let file = parse_feature("login.feature", LOGIN);
        assert!(validate_feature(&file, &known(&["CAP-001"]), true).is_clean());
    }

    #[test]
    fn test_unknown_capability_is_error() {
        let file = parse_feature("x.feature", "@CAP-999\nFeature: X\n");
        let out = validate_feature(&file, &known(&["CAP-001"]), false);
        assert_eq!(out.errors, vec!["Unknown capability tag: @CAP-999".to_string()]);
    }

    #[test]
    fn test_malformed_capability_is_error() {
        let file = parse_feature("x.feature", "@CAP-abc\nFeature: X\n");
        let out = validate_feature(&file, &known(&[]), false);
        assert_eq!(
            out.errors,
            vec![r"Malformed capability tag: @CAP-abc (expected @CAP-\d+)".to_string()]
        );
    }

    #[test]
    fn test_missing_capability_tag_respects_strict() {
        let file = parse_feature("x.feature", "@smoke\nFeature: X\nScenario: a\n");
        let lenient = validate_feature(&file, &known(&[]), false);
        assert!(lenient.errors.is_empty());
        assert_eq!(lenient.warnings, vec!["No capability tag found".to_string()]);

        let strict = validate_feature(&file, &known(&[]), true);
        assert_eq!(strict.errors, vec!["No capability tag found".to_string()]);
        assert!(strict.warnings.is_empty());
    }
}
