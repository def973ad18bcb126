use clap::Parser;
use docgov_cli::{BddCli, exit_with};
use std::process::ExitCode;

fn main() -> ExitCode {
    exit_with(BddCli::parse().run())
}
