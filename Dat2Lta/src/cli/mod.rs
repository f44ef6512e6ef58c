//! dat2lta CLI - Command-line interface for the DAT to LTA converter

pub mod commands;
pub mod progress;

use clap::Parser;
use commands::Commands;

#[derive(Parser)]
#[command(name = "dat2lta")]
#[command(version, about = "dat2lta: LithTech Jupiter (v85) DAT to LTA converter", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Run the dat2lta CLI
///
/// # Errors
/// Returns an error if the selected command fails.
pub fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();
    cli.command.execute()
}
