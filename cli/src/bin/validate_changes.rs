use clap::Parser;
use docgov_cli::{ChangesCli, exit_with};
use std::process::ExitCode;

fn main() -> ExitCode {
    exit_with(ChangesCli::parse().run())
}
