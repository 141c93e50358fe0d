//! Command line interface.
//!
//! Every subcommand operates on the same pair of inputs: the deployment
//! descriptor selected with `-f` and the local Maven repository holding the
//! Flowman artifacts. [`Cli::execute`] loads both once and hands the resolved
//! [`CommandContext`](common::CommandContext) to the selected subcommand.

mod build;
pub(crate) mod common;
mod deploy;
mod list;
mod pack;
mod shell;


use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::constants::{DEPLOYMENT_DESCRIPTOR, ENV_LOCAL_REPOSITORY};

use self::build::BuildCommand;
use self::common::CommandContext;
use self::deploy::DeployCommand;
use self::list::ListCommand;
use self::pack::PackCommand;
use self::shell::ShellCommand;
use self::test::TestCommand;

#[derive(Debug, Parser)]
#[command(
    name = "flowpack",
    version,
    about = "Package and deploy Flowman projects from a deployment descriptor"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path of the deployment descriptor
    #[arg(
        short = 'f',
        long,
        value_name = "PATH",
        default_value = DEPLOYMENT_DESCRIPTOR,
        global = true
    )]
    descriptor: PathBuf,

    /// Additional key=value pairs for variable interpolation
    #[arg(short = 'D', long = "define", value_name = "KEY=VALUE", global = true)]
    defines: Vec<String>,

    /// Local Maven repository holding the Flowman artifacts
    #[arg(long, value_name = "PATH", env = ENV_LOCAL_REPOSITORY, global = true)]
    local_repository: Option<String>,

    /// Enable debug output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Build the selected packages
    Build(BuildCommand),
    /// Run the Flowman tests of the selected packages
    Test(TestCommand),
    /// Open an interactive Flowman shell inside a built package
    Shell(ShellCommand),
    /// Build and pack the selected packages
    Pack(PackCommand),
    /// Deploy packed artifacts to their configured locations
    Deploy(DeployCommand),
    /// List the packages, deployments and projects of the descriptor
    List(ListCommand),
}

impl Cli {
    /// Execute the selected subcommand.
    pub async fn execute(self) -> Result<()> {
        self.init_logging();

        let context = CommandContext::load(
            &self.descriptor,
            &self.defines,
            self.local_repository.as_deref(),
        )?;

        match self.command {
            Commands::Build(cmd) => cmd.execute(&context),
            Commands::Test(cmd) => cmd.execute(&context).await,
            Commands::Shell(cmd) => cmd.execute(&context).await,
            Commands::Pack(cmd) => cmd.execute(&context),
            Commands::Deploy(cmd) => cmd.execute(&context),
            Commands::List(cmd) => cmd.execute(&context),
        }
    }

    /// Install the global tracing subscriber.
    ///
    /// An explicit `RUST_LOG` takes precedence over the `--verbose` and
    /// `--quiet` flags.
    fn init_logging(&self) {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            let directive = if self.verbose {
                "flowpack_cli=debug"
            } else if self.quiet {
                "flowpack_cli=error"
            } else {
                "flowpack_cli=info"
            };
            EnvFilter::new(directive)
        });
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .try_init()
            .ok();
    }
}
