//! Command-line interface
//!
//! Provides the `race-harness` subcommands.

pub mod config;
pub mod preset;
pub mod run;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use crate::config::HarnessConfig;
use crate::report::generate_report;
use crate::runner::TrialSuite;

/// Race Condition Harness CLI
#[derive(Parser)]
#[command(name = "race-harness")]
#[command(about = "Shared counter race condition demonstration, with and without a lock")]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Run one lock mode for a number of trials
    Run(run::RunArgs),
    /// Run unlocked then locked and compare
    Compare(run::CompareArgs),
    /// Run a built-in preset
    Preset(preset::PresetArgs),
    /// Run a suite described by a TOML file
    Config(config::ConfigArgs),
}

/// Run a suite and render its report in the configured format
pub fn run_suite(config: HarnessConfig) -> Result<String> {
    info!(
        workers = config.workload.workers,
        increments = config.workload.increments_per_worker,
        delay_us = config.workload.delay_us,
        mode = ?config.suite.mode,
        trials = config.suite.trials,
        "running suite"
    );

    let suite = TrialSuite::new(config);
    let results = suite.run()?;
    Ok(generate_report(&results, suite.config().report.format))
}
