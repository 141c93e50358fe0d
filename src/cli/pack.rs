//! Build and pack one or all packages into their final artifacts.

use anyhow::Result;
use clap::Args;

use crate::cli::common::{CommandContext, with_suggestions};
use crate::driver::Driver;

#[derive(Debug, Args)]
#[command(about = "Build and pack the descriptor's packages into artifacts")]
pub struct PackCommand {
    /// Package to pack (all packages if omitted)
    #[arg(long, value_name = "NAME")]
    pub package: Option<String>,
}

impl PackCommand {
    pub fn execute(self, context: &CommandContext) -> Result<()> {
        let driver = Driver::new(&context.descriptor, &context.repository);
        driver
            .pack(self.package.as_deref())
            .map_err(|err| with_suggestions(err, &context.descriptor))
    }
}
