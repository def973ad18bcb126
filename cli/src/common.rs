//! Flags, logging and report output shared by the three binaries.

use anyhow::Context;
use clap::{Args, ValueEnum};
use docgov_governance::config::{ConfigLoader, GovernanceConfig};
use docgov_governance::report::{Line, LineKind, Report};
use owo_colors::OwoColorize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Exit codes shared by every governance binary
pub mod exit_codes {
    pub const OK: i32 = 0;
    pub const VALIDATION_FAILED: i32 = 1;
    pub const INFRASTRUCTURE_ERROR: i32 = 2;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
}

#[derive(Debug, Args)]
pub struct CommonArgs {
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,

    /// Docs root holding roads/, adr/, changes/, nfr/ (overrides config)
    #[arg(long = "docs-root", value_name = "DIR")]
    pub docs_root: Option<PathBuf>,

    /// Config file (default: ./governance.toml, then the user config dir)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Disable coloured output
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Debug logging on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl CommonArgs {
    /// Load layered config, then apply flag overrides.
    pub fn load_config(&self) -> anyhow::Result<GovernanceConfig> {
        let loader = match self.config.clone().or_else(ConfigLoader::find_config_file) {
            Some(path) => ConfigLoader::new().with_file(path),
            None => ConfigLoader::new(),
        };
        let mut config = loader
            .load()
            .context("failed to load governance configuration")?;
        if let Some(root) = &self.docs_root {
            config.docs_root = root.clone();
        }
        Ok(config)
    }

    pub fn init_logging(&self) {
        let default_level = if self.verbose { "debug" } else { "warn" };
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .or_else(|_| EnvFilter::try_new(default_level))
                    .unwrap_or_else(|_| EnvFilter::new(default_level)),
            )
            .with_writer(std::io::stderr)
            .with_ansi(self.use_color())
            .try_init();
    }

    pub fn use_color(&self) -> bool {
        !self.no_color
            && std::env::var_os("NO_COLOR").is_none()
            && supports_color::on(supports_color::Stream::Stdout).is_some()
    }

    /// Print `report` on stdout in the selected format.
    pub fn emit(&self, report: &Report, title: &str) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Json => println!("{}", report.to_json()?),
            OutputFormat::Human => {
                let color = self.use_color();
                for line in report.render_human(title) {
                    println!("{}", paint(&line, color));
                }
            }
        }
        Ok(())
    }

    /// Progress notes go to stderr and only in human mode, so JSON stays parseable.
    pub fn note(&self, message: &str) {
        if self.format == OutputFormat::Human {
            eprintln!("{message}");
        }
    }
}

fn paint(line: &Line, color: bool) -> String {
    if !color {
        return line.text.clone();
    }
    match line.kind {
        LineKind::Heading => line.text.bold().to_string(),
        LineKind::Error => line.text.red().to_string(),
        LineKind::Warning => line.text.yellow().to_string(),
        LineKind::Passed => line.text.green().to_string(),
        LineKind::Plain => line.text.clone(),
    }
}

const INFRASTRUCTURE_FAILURE: u8 = exit_codes::INFRASTRUCTURE_ERROR as u8;

/// Map a command result to the process exit code. Errors are infrastructure failures.
pub fn exit_with(result: anyhow::Result<i32>) -> ExitCode {
    match result {
        Ok(code) => ExitCode::from(u8::try_from(code).unwrap_or(INFRASTRUCTURE_FAILURE)),
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(INFRASTRUCTURE_FAILURE)
        }
    }
}
