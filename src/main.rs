//! Flowpack CLI entry point
//!
//! This is the main executable for the Flowman deployment packager.
//! It handles command-line argument parsing, error display, and command execution.
//!
//! The CLI drives the lifecycle of the packages declared in a deployment
//! descriptor:
//! - `build` - Assemble packages from the local Maven repository
//! - `test` - Run the Flowman tests of the bundled projects
//! - `shell` - Open an interactive Flowman shell inside a package
//! - `pack` - Produce the distributable artifacts
//! - `deploy` - Publish packed artifacts to their target locations
//! - `list` - Show the entities declared in the descriptor

use anyhow::Result;
use clap::Parser;
use flowpack_cli::cli;
use flowpack_cli::core::error::user_friendly_error;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = cli::Cli::parse();

    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    // Execute the command
    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
