//! Race Harness CLI
//!
//! Provides commands for:
//! - `run`: One lock mode, repeated for a number of trials
//! - `compare`: Unlocked then locked, side by side
//! - `preset`: Built-in problem / fixed / comparison scenarios
//! - `config`: A suite described by a TOML file

use anyhow::Result;
use clap::Parser;

use race_harness::cli::{Cli, Commands};
use race_harness::logging::{init_logging, LogConfig};

fn main() -> Result<()> {
    // Initialize logging
    init_logging(LogConfig::from_env())
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {}", e))?;

    // Parse CLI arguments
    let cli = Cli::parse();

    // Execute command
    match cli.command {
        Commands::Run(args) => {
            race_harness::cli::run::execute(args)?;
        }
        Commands::Compare(args) => {
            race_harness::cli::run::execute_compare(args)?;
        }
        Commands::Preset(args) => {
            race_harness::cli::preset::execute(args)?;
        }
        Commands::Config(args) => {
            race_harness::cli::config::execute(args)?;
        }
    }

    Ok(())
}
