//! Safewrite CLI Binary
//!
//! Command-line interface for the safe-write subsystem.

use anyhow::Context;
use clap::Parser;
use safewrite::logging::init_logging;
use safewrite::tooling::cli::{Cli, CliContext};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = cli.resolve_config().context("Failed to load configuration")?;
    init_logging(Some(&config.logging)).context("Failed to initialize logging")?;

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let output = runtime.block_on(async {
        let context = CliContext::new(&config)?;
        context.execute(&cli.command).await
    })?;

    if !output.is_empty() {
        println!("{}", output);
    }
    Ok(())
}
