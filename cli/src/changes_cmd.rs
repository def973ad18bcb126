//! `validate-changes`: Change Entry validation, all entries or one.

use clap::Parser;
use docgov_governance::Runner;

use crate::common::CommonArgs;

/// Validate Change Entries under the docs root
#[derive(Debug, Parser)]
#[command(name = "validate-changes", version)]
pub struct ChangesCli {
    /// Validate only this entry (e.g. CHANGE-004)
    #[arg(value_name = "CHANGE-ID")]
    pub id: Option<String>,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl ChangesCli {
    pub fn run(self) -> anyhow::Result<i32> {
        self.common.init_logging();
        let config = self.common.load_config()?;
        let runner = Runner::from_config(&config);
        runner.corpus().check_root()?;

        let report = runner.run_changes(self.id.as_deref())?;
        let title = match &self.id {
            Some(id) => format!("Change Entry {id}"),
            None => "Change Entries".to_string(),
        };
        self.common.emit(&report, &title)?;
        Ok(report.exit_code())
    }
}
