use clap::Parser;
use docgov_cli::{LintCli, exit_with};
use std::process::ExitCode;

fn main() -> ExitCode {
    exit_with(LintCli::parse().run())
}
