//! `governance-lint`: roadmap, ADR and NFR validation, or everything with `--ci`.
//!
//! ## Exit Codes
//!
//! - 0: no errors (warnings allowed)
//! - 1: validation errors
//! - 2: infrastructure error (config, docs root, snapshot I/O)

use anyhow::Context;
use clap::Parser;
use docgov_governance::export::{bdd_data, roadmap_data, write_export};
use docgov_governance::snapshot::{DEFAULT_FILENAME, read_snapshot, write_snapshot};
use docgov_governance::{Pass, Report, Runner};
use std::path::{Path, PathBuf};

use crate::common::CommonArgs;

/// Validate governance front matter under the docs root
#[derive(Debug, Parser)]
#[command(name = "governance-lint", version)]
pub struct LintCli {
    /// Validate one record (ROAD-001, ADR-002, NFR-PERF-001, CHANGE-003)
    #[arg(value_name = "ID")]
    pub id: Option<String>,

    /// Validate every Roadmap Item (the default)
    #[arg(long = "all-roads")]
    pub all_roads: bool,

    /// Validate every ADR
    #[arg(long)]
    pub adrs: bool,

    /// Validate every NFR
    #[arg(long)]
    pub nfrs: bool,

    /// Run roadmap, ADR, NFR, change and BDD tag validation in sequence
    #[arg(long, conflicts_with_all = ["id", "all_roads", "adrs", "nfrs"])]
    pub ci: bool,

    /// Status snapshot used for transition checks
    #[arg(long, value_name = "FILE")]
    pub snapshot: Option<PathBuf>,

    /// Rewrite the status snapshot after a full roadmap run with no errors
    #[arg(long = "update-snapshot")]
    pub update_snapshot: bool,

    /// Write roadmap-data.json and bdd-data.json into DIR
    #[arg(long = "export-dir", value_name = "DIR")]
    pub export_dir: Option<PathBuf>,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl LintCli {
    pub fn run(self) -> anyhow::Result<i32> {
        self.common.init_logging();
        let config = self.common.load_config()?;

        let snapshot_path = self
            .snapshot
            .clone()
            .or_else(|| config.snapshot.path.clone())
            .or_else(|| {
                self.update_snapshot
                    .then(|| config.docs_root.join(DEFAULT_FILENAME))
            });
        let previous = match &snapshot_path {
            Some(path) => read_snapshot(path)
                .with_context(|| format!("failed to read status snapshot {}", path.display()))?,
            None => None,
        };

        let runner = Runner::from_config(&config).with_snapshot(previous);
        runner.corpus().check_root()?;

        let (title, report) = self.select(&runner)?;
        self.common.emit(&report, &title)?;

        if self.update_snapshot
            && let Some(path) = &snapshot_path
        {
            if self.checks_all_roads() {
                update_snapshot(&self.common, &runner, &report, path)?;
            } else {
                tracing::warn!(path = %path.display(), "status snapshot not updated: roadmap pass not run");
                self.common.note(
                    "Status snapshot not updated: only a full roadmap run (default, --all-roads or --ci) may record statuses",
                );
            }
        }

        if let Some(dir) = &self.export_dir {
            let roadmap = roadmap_data(runner.roadmap_entries()?);
            let bdd = bdd_data(&runner.feature_files()?, |p| runner.corpus().relative(p));
            write_export(dir, &roadmap, &bdd)?;
            self.common
                .note(&format!("Dashboard data written to {}", dir.display()));
        }

        Ok(report.exit_code())
    }

    /// Whether the selection validates every Roadmap Item, transitions included.
    fn checks_all_roads(&self) -> bool {
        self.ci || (self.id.is_none() && (self.all_roads || (!self.adrs && !self.nfrs)))
    }

    fn select(&self, runner: &Runner) -> anyhow::Result<(String, Report)> {
        if self.ci {
            return Ok(("Governance CI".to_string(), runner.run_ci()?));
        }
        if let Some(id) = &self.id {
            return Ok((format!("Governance record {id}"), runner.run_single(id)?));
        }

        let mut passes = Vec::new();
        if self.all_roads || (!self.adrs && !self.nfrs) {
            passes.push(Pass::Roadmap);
        }
        if self.adrs {
            passes.push(Pass::Adrs);
        }
        if self.nfrs {
            passes.push(Pass::Nfrs);
        }

        let title = passes
            .iter()
            .copied()
            .map(Pass::title)
            .collect::<Vec<_>>()
            .join(" + ");
        let mut report = Report::new();
        for pass in passes {
            report.merge(runner.run(pass)?);
        }
        Ok((title, report))
    }
}

fn update_snapshot(
    common: &CommonArgs,
    runner: &Runner,
    report: &Report,
    path: &Path,
) -> anyhow::Result<()> {
    if report.has_errors() {
        tracing::warn!(path = %path.display(), "status snapshot not updated: run has errors");
        common.note("Status snapshot not updated: fix the errors above first");
        return Ok(());
    }
    let mut snapshot = runner.status_snapshot()?;
    write_snapshot(path, &mut snapshot)
        .with_context(|| format!("failed to write status snapshot {}", path.display()))?;
    common.note(&format!(
        "Status snapshot updated: {} ({} items)",
        path.display(),
        snapshot.len()
    ));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> LintCli {
        LintCli::try_parse_from(std::iter::once("governance-lint").chain(args.iter().copied()))
            .expect("arguments should parse")
    }

    #[test]
    fn test_full_roadmap_selections() {
        assert!(parse(&[]).checks_all_roads());
        assert!(parse(&["--all-roads"]).checks_all_roads());
        assert!(parse(&["--all-roads", "--adrs"]).checks_all_roads());
        assert!(parse(&["--ci"]).checks_all_roads());
    }

    #[test]
    fn test_partial_selections_skip_snapshot() {
        assert!(!parse(&["--adrs"]).checks_all_roads());
        assert!(!parse(&["--nfrs"]).checks_all_roads());
        assert!(!parse(&["ROAD-001"]).checks_all_roads());
        assert!(!parse(&["CHANGE-001"]).checks_all_roads());
    }
}
