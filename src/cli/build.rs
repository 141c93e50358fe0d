//! Build the staging area of one or all packages.

use anyhow::Result;
use clap::Args;

use crate::cli::common::{CommandContext, with_suggestions};
use crate::driver::Driver;

#[derive(Debug, Args)]
#[command(about = "Build the staging areas of the descriptor's packages")]
pub struct BuildCommand {
    /// Package to build (all packages if omitted)
    #[arg(long, value_name = "NAME")]
    pub package: Option<String>,
}

impl BuildCommand {
    pub fn execute(self, context: &CommandContext) -> Result<()> {
        let driver = Driver::new(&context.descriptor, &context.repository);
        driver
            .build(self.package.as_deref())
            .map_err(|err| with_suggestions(err, &context.descriptor))
    }
}
