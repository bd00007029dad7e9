//! Inflator CLI entry point
//!
//! Invoked by the host orchestrator with the path of a run configuration. Writes the
//! aggregated manifest stream to stdout; diagnostics go to stderr.

use anyhow::Result;
use clap::Parser;
use inflator_cli::cli;
use inflator_cli::core::error::user_friendly_error;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
