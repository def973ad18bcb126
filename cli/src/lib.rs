//! Command-line adapters over `docgov_governance`.
//!
//! Each binary parses its flags, loads layered config, runs the library and
//! maps the report to an exit code via [`common::exit_with`].

pub mod bdd_cmd;
pub mod changes_cmd;
pub mod common;
pub mod lint_cmd;

pub use bdd_cmd::BddCli;
pub use changes_cmd::ChangesCli;
pub use common::{CommonArgs, OutputFormat, exit_codes, exit_with};
pub use lint_cmd::LintCli;
