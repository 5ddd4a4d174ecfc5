//! PakScout CLI - Command-line interface for inspecting PAK archives

pub mod commands;
pub mod progress;

use clap::{ArgAction, Parser};
use commands::Commands;
use tracing::Level;

#[derive(Parser)]
#[command(name = "pakscout")]
#[command(about = "PakScout: inspect and extract Larian PAK archives", long_about = None, version)]
struct Cli {
    /// Increase log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Run the PakScout CLI
pub fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    cli.command.execute()?;

    Ok(())
}
