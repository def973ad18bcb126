//! `validate-bdd-tags`: capability tag references in feature files.

use clap::Parser;
use docgov_governance::{Pass, Runner};

use crate::common::CommonArgs;

/// Check `@CAP-` tags in feature files against the known capabilities
#[derive(Debug, Parser)]
#[command(name = "validate-bdd-tags", version)]
pub struct BddCli {
    /// Treat feature files without any capability tag as errors
    #[arg(long)]
    pub strict: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl BddCli {
    pub fn run(self) -> anyhow::Result<i32> {
        self.common.init_logging();
        let config = self.common.load_config()?;
        let runner = Runner::from_config(&config).with_strict_bdd(self.strict);
        runner.corpus().check_root()?;

        let report = runner.run(Pass::BddTags)?;
        self.common.emit(&report, Pass::BddTags.title())?;
        Ok(report.exit_code())
    }
}
