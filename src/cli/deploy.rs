//! Execute the descriptor's deployments.

use anyhow::Result;
use clap::Args;

use crate::cli::common::{CommandContext, with_suggestions};
use crate::driver::Driver;

#[derive(Debug, Args)]
#[command(about = "Deploy packed artifacts to their target locations")]
pub struct DeployCommand {
    /// Deployment to execute (all deployments if omitted)
    #[arg(long, value_name = "NAME")]
    pub deployment: Option<String>,
}

impl DeployCommand {
    pub fn execute(self, context: &CommandContext) -> Result<()> {
        let driver = Driver::new(&context.descriptor, &context.repository);
        driver
            .deploy(self.deployment.as_deref())
            .map_err(|err| with_suggestions(err, &context.descriptor))
    }
}
