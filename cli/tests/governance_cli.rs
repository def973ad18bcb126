//! Governance CLI integration tests
//!
//! Exit codes and report output of the three binaries.
//!
//! ## Exit Codes
//! - 0: no errors (warnings allowed)
//! - 1: validation errors
//! - 2: infrastructure error

use std::fs;
use std::path::Path;

use anyhow::Result;
use predicates::str::contains;
use pretty_assertions::assert_eq;
use serde_json::Value as JsonValue;
use tempfile::TempDir;

/// Run `bin` in `cwd` with no user config and plain output.
fn governance_command(bin: &str, cwd: &Path) -> Result<assert_cmd::Command> {
    let mut cmd = assert_cmd::Command::cargo_bin(bin)?;
    cmd.current_dir(cwd);
    cmd.env("XDG_CONFIG_HOME", cwd.join(".config"));
    cmd.env("NO_COLOR", "1");
    cmd.env_remove("RUST_LOG");
    cmd.env_remove("DOCGOV_DOCS_ROOT");
    Ok(cmd)
}

fn write(root: &Path, rel: &str, content: &str) -> std::io::Result<()> {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)
}

fn json_stdout(output: &std::process::Output) -> Result<JsonValue> {
    Ok(serde_json::from_slice(&output.stdout)?)
}

const PROPOSED_ROAD: &str = "---\nid: ROAD-001\ntitle: Linter\nstatus: proposed\n---\n";

// =============================================================================
// governance-lint
// =============================================================================

#[test]
fn lint_empty_docs_root_exits_0() -> Result<()> {
    let repo = TempDir::new()?;
    fs::create_dir_all(repo.path().join("docs"))?;

    governance_command("governance-lint", repo.path())?
        .args(["--docs-root", "docs"])
        .assert()
        .code(0)
        .stdout(contains("Summary: 0 checked"));
    Ok(())
}

#[test]
fn lint_withdrawn_adr_exits_1_with_json_summary() -> Result<()> {
    let repo = TempDir::new()?;
    write(
        repo.path(),
        "docs/adr/ADR-001.md",
        "---\nid: ADR-001\ntitle: Old\nstatus: withdrawn\ncategory: architecture\n---\n",
    )?;

    let output = governance_command("governance-lint", repo.path())?
        .args(["--adrs", "--docs-root", "docs", "--format", "json"])
        .output()?;
    assert_eq!(output.status.code(), Some(1));

    let report = json_stdout(&output)?;
    assert_eq!(report["summary"]["total"], 1);
    assert_eq!(report["summary"]["errors"], 1);
    assert_eq!(report["errors"][0]["file"], "adr/ADR-001.md");
    let message = report["errors"][0]["message"].as_str().unwrap_or_default();
    assert!(message.starts_with("Invalid status:"), "{message}");
    Ok(())
}

#[test]
fn lint_single_record_by_id() -> Result<()> {
    let repo = TempDir::new()?;
    write(repo.path(), "docs/roads/ROAD-001.md", PROPOSED_ROAD)?;

    governance_command("governance-lint", repo.path())?
        .args(["ROAD-001", "--docs-root", "docs"])
        .assert()
        .code(0)
        .stdout(contains("✓ roads/ROAD-001.md"));

    governance_command("governance-lint", repo.path())?
        .args(["ROAD-404", "--docs-root", "docs"])
        .assert()
        .code(1)
        .stdout(contains("Record not found: ROAD-404"));
    Ok(())
}

#[test]
fn lint_ci_runs_every_pass() -> Result<()> {
    let repo = TempDir::new()?;
    write(repo.path(), "docs/roads/ROAD-001.md", PROPOSED_ROAD)?;
    write(repo.path(), "docs/capabilities/CAP-001.md", "---\nid: CAP-001\n---\n")?;
    write(
        repo.path(),
        "docs/features/login.feature",
        "@CAP-404\nFeature: Login\n  Scenario: ok\n",
    )?;

    let output = governance_command("governance-lint", repo.path())?
        .args(["--ci", "--docs-root", "docs", "--format", "json"])
        .output()?;
    assert_eq!(output.status.code(), Some(1));

    let report = json_stdout(&output)?;
    assert_eq!(report["summary"]["total"], 2);
    assert_eq!(report["errors"][0]["message"], "Unknown capability tag: @CAP-404");
    assert_eq!(report["passed"][0], "roads/ROAD-001.md");
    Ok(())
}

#[test]
fn lint_ci_conflicts_with_selectors() -> Result<()> {
    let repo = TempDir::new()?;
    governance_command("governance-lint", repo.path())?
        .args(["--ci", "--adrs"])
        .assert()
        .failure();
    Ok(())
}

#[test]
fn docs_root_that_is_a_file_exits_2() -> Result<()> {
    let repo = TempDir::new()?;
    fs::write(repo.path().join("docs"), "not a directory")?;

    for bin in ["governance-lint", "validate-changes", "validate-bdd-tags"] {
        governance_command(bin, repo.path())?
            .args(["--docs-root", "docs"])
            .assert()
            .code(2)
            .stderr(contains("Error:"));
    }
    Ok(())
}

#[test]
fn update_snapshot_then_detect_skipped_status() -> Result<()> {
    let repo = TempDir::new()?;
    write(repo.path(), "docs/roads/ROAD-001.md", PROPOSED_ROAD)?;

    governance_command("governance-lint", repo.path())?
        .args(["--docs-root", "docs", "--update-snapshot"])
        .assert()
        .code(0)
        .stderr(contains("Status snapshot updated"));

    let snapshot_path = repo.path().join("docs").join(".governance-status.json");
    let snapshot: JsonValue = serde_json::from_str(&fs::read_to_string(&snapshot_path)?)?;
    assert_eq!(snapshot["schema_version"], "status-snapshot@1");
    assert_eq!(snapshot["statuses"]["ROAD-001"], "proposed");

    write(
        repo.path(),
        "docs/roads/ROAD-001.md",
        "---\nid: ROAD-001\ntitle: Linter\nstatus: bdd_pending\ngovernance:\n  adrs:\n    validated: true\n    validated_by: architect\n---\n",
    )?;

    let output = governance_command("governance-lint", repo.path())?
        .args(["--docs-root", "docs", "--format", "json", "--snapshot"])
        .arg(&snapshot_path)
        .output()?;
    assert_eq!(output.status.code(), Some(1));
    let report = json_stdout(&output)?;
    assert_eq!(
        report["errors"][0]["message"],
        "Invalid status transition: proposed -> bdd_pending"
    );
    Ok(())
}

#[test]
fn corrupted_snapshot_is_an_infrastructure_error() -> Result<()> {
    let repo = TempDir::new()?;
    write(repo.path(), "docs/roads/ROAD-001.md", PROPOSED_ROAD)?;
    write(repo.path(), "snapshot.json", "{ not json")?;

    governance_command("governance-lint", repo.path())?
        .args(["--docs-root", "docs", "--snapshot", "snapshot.json"])
        .assert()
        .code(2)
        .stderr(contains("failed to read status snapshot"));
    Ok(())
}

const BDD_COMPLETE_ROAD: &str = "---\nid: ROAD-001\ntitle: Linter\nstatus: bdd_complete\ngovernance:\n  adrs:\n    validated: true\n    validated_by: architect\n---\n";

fn recorded_status(snapshot_path: &Path) -> Result<JsonValue> {
    let snapshot: JsonValue = serde_json::from_str(&fs::read_to_string(snapshot_path)?)?;
    Ok(snapshot["statuses"]["ROAD-001"].clone())
}

#[test]
fn partial_runs_never_record_roadmap_statuses() -> Result<()> {
    let repo = TempDir::new()?;
    write(repo.path(), "docs/roads/ROAD-001.md", PROPOSED_ROAD)?;
    write(
        repo.path(),
        "docs/adr/ADR-001.md",
        "---\nid: ADR-001\ntitle: Keep\nstatus: accepted\ncategory: architecture\n---\n",
    )?;
    let snapshot_path = repo.path().join("docs").join(".governance-status.json");

    governance_command("governance-lint", repo.path())?
        .args(["--docs-root", "docs", "--update-snapshot"])
        .assert()
        .code(0);
    assert_eq!(recorded_status(&snapshot_path)?, "proposed");

    // Skips adr_validated and bdd_pending.
    write(repo.path(), "docs/roads/ROAD-001.md", BDD_COMPLETE_ROAD)?;

    for selection in [&["--adrs"][..], &["--nfrs"][..], &["ADR-001"][..], &["ROAD-001"][..]] {
        governance_command("governance-lint", repo.path())?
            .args(["--docs-root", "docs", "--update-snapshot"])
            .args(selection)
            .assert()
            .stderr(contains("Status snapshot not updated"));
        assert_eq!(recorded_status(&snapshot_path)?, "proposed", "{selection:?}");
    }

    let output = governance_command("governance-lint", repo.path())?
        .args(["--docs-root", "docs", "--format", "json", "--snapshot"])
        .arg(&snapshot_path)
        .output()?;
    assert_eq!(output.status.code(), Some(1));
    let report = json_stdout(&output)?;
    assert_eq!(
        report["errors"][0]["message"],
        "Invalid status transition: proposed -> bdd_complete"
    );
    Ok(())
}

#[test]
fn run_with_errors_leaves_snapshot_untouched() -> Result<()> {
    let repo = TempDir::new()?;
    write(repo.path(), "docs/roads/ROAD-001.md", PROPOSED_ROAD)?;
    let snapshot_path = repo.path().join("docs").join(".governance-status.json");

    governance_command("governance-lint", repo.path())?
        .args(["--docs-root", "docs", "--update-snapshot"])
        .assert()
        .code(0);
    let before = fs::read_to_string(&snapshot_path)?;

    write(repo.path(), "docs/roads/ROAD-001.md", BDD_COMPLETE_ROAD)?;

    governance_command("governance-lint", repo.path())?
        .args(["--docs-root", "docs", "--update-snapshot"])
        .assert()
        .code(1)
        .stdout(contains("Invalid status transition: proposed -> bdd_complete"))
        .stderr(contains("Status snapshot not updated"));
    assert_eq!(fs::read_to_string(&snapshot_path)?, before);
    Ok(())
}

#[test]
fn export_dir_writes_dashboard_data() -> Result<()> {
    let repo = TempDir::new()?;
    write(repo.path(), "docs/roads/ROAD-001.md", PROPOSED_ROAD)?;
    write(
        repo.path(),
        "docs/features/login.feature",
        "@CAP-001\nFeature: Login\n  Scenario: ok\n  Scenario: locked\n",
    )?;

    governance_command("governance-lint", repo.path())?
        .args(["--docs-root", "docs", "--export-dir", "site/data"])
        .assert()
        .code(0);

    let roadmap: JsonValue = serde_json::from_str(&fs::read_to_string(
        repo.path().join("site/data/roadmap-data.json"),
    )?)?;
    assert_eq!(roadmap["items"][0]["id"], "ROAD-001");
    assert_eq!(roadmap["items"][0]["file"], "roads/ROAD-001.md");

    let bdd: JsonValue = serde_json::from_str(&fs::read_to_string(
        repo.path().join("site/data/bdd-data.json"),
    )?)?;
    assert_eq!(bdd["tests"][0]["file"], "features/login.feature");
    assert_eq!(bdd["tests"][0]["scenarios"], 2);
    Ok(())
}

#[test]
fn config_file_sets_docs_root() -> Result<()> {
    let repo = TempDir::new()?;
    write(
        repo.path(),
        "governance/adr/ADR-001.md",
        "---\nid: ADR-001\ntitle: Old\nstatus: withdrawn\ncategory: architecture\n---\n",
    )?;
    write(repo.path(), "governance.toml", "docs_root = \"governance\"\n")?;

    governance_command("governance-lint", repo.path())?
        .arg("--adrs")
        .assert()
        .code(1)
        .stdout(contains("adr/ADR-001.md"));
    Ok(())
}

// =============================================================================
// validate-changes
// =============================================================================

const COMPLETE_ROAD: &str = "---
id: ROAD-001
title: Linter
status: complete
governance:
  adrs:
    validated: true
    validated_by: architect
  bdd:
    status: approved
  nfrs:
    status: pass
---
";

#[test]
fn published_change_without_signatures_exits_1() -> Result<()> {
    let repo = TempDir::new()?;
    write(repo.path(), "docs/roads/ROAD-001.md", COMPLETE_ROAD)?;
    write(
        repo.path(),
        "docs/changes/CHANGE-001.md",
        "---\nid: CHANGE-001\nroad_id: ROAD-001\ntitle: Ship\ndate: 2024-04-02\nversion: 1.0.0\nstatus: published\ncategories: [Added]\ncompliance:\n  adr_check: {status: pass}\n  bdd_check: {status: pass}\n  nfr_checks: []\nsignatures: []\n---\n",
    )?;

    governance_command("validate-changes", repo.path())?
        .args(["CHANGE-001", "--docs-root", "docs"])
        .assert()
        .code(1)
        .stdout(contains("Published CHANGE entries must have signatures array"));
    Ok(())
}

#[test]
fn draft_change_passes() -> Result<()> {
    let repo = TempDir::new()?;
    write(repo.path(), "docs/roads/ROAD-001.md", PROPOSED_ROAD)?;
    write(
        repo.path(),
        "docs/changes/CHANGE-002.md",
        "---\nid: CHANGE-002\nroad_id: ROAD-001\ntitle: Draft\ndate: 2024-04-02\nversion: 0.1.0\nstatus: draft\ncategories: [Fixed]\n---\n",
    )?;

    let output = governance_command("validate-changes", repo.path())?
        .args(["--docs-root", "docs", "--format", "json"])
        .output()?;
    assert_eq!(output.status.code(), Some(0));
    let report = json_stdout(&output)?;
    assert_eq!(report["summary"]["passed"], 1);
    Ok(())
}

// =============================================================================
// validate-bdd-tags
// =============================================================================

#[test]
fn unknown_capability_tag_exits_1() -> Result<()> {
    let repo = TempDir::new()?;
    write(repo.path(), "docs/capabilities/CAP-001.md", "---\nid: CAP-001\n---\n")?;
    write(
        repo.path(),
        "docs/features/pay.feature",
        "@CAP-999\nFeature: Pay\n  Scenario: card\n",
    )?;

    governance_command("validate-bdd-tags", repo.path())?
        .args(["--docs-root", "docs"])
        .assert()
        .code(1)
        .stdout(contains("Unknown capability tag: @CAP-999"));
    Ok(())
}

#[test]
fn untagged_feature_fails_only_in_strict_mode() -> Result<()> {
    let repo = TempDir::new()?;
    write(repo.path(), "docs/features/plain.feature", "Feature: Plain\n")?;

    governance_command("validate-bdd-tags", repo.path())?
        .args(["--docs-root", "docs"])
        .assert()
        .code(0)
        .stdout(contains("No capability tag found"));

    governance_command("validate-bdd-tags", repo.path())?
        .args(["--docs-root", "docs", "--strict"])
        .assert()
        .code(1);
    Ok(())
}
