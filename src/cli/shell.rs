//! Launch an interactive Flowman shell for a staged project.

use anyhow::Result;
use clap::Args;

use crate::cli::common::{CommandContext, with_suggestions};
use crate::driver::Driver;

#[derive(Debug, Args)]
#[command(about = "Launch an interactive Flowman shell for a staged project")]
pub struct ShellCommand {
    /// Package whose staging area to use (first package if omitted)
    #[arg(long, value_name = "NAME")]
    pub package: Option<String>,

    /// Project to open (first project if omitted)
    #[arg(long, value_name = "NAME")]
    pub project: Option<String>,
}

impl ShellCommand {
    pub async fn execute(self, context: &CommandContext) -> Result<()> {
        let driver = Driver::new(&context.descriptor, &context.repository);
        driver
            .shell(self.package.as_deref(), self.project.as_deref())
            .await
            .map_err(|err| with_suggestions(err, &context.descriptor))
    }
}
