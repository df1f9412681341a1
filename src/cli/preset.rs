//! Built-in preset command

use anyhow::Result;
use clap::{Args, ValueEnum};

use crate::config::HarnessConfig;
use crate::report::ReportFormat;

/// Built-in presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PresetName {
    /// Unlocked counter, three trials
    Problem,
    /// Locked counter, three trials
    Fixed,
    /// Unlocked and locked side by side
    Comparison,
}

impl PresetName {
    pub fn config(&self) -> HarnessConfig {
        match self {
            PresetName::Problem => HarnessConfig::problem(),
            PresetName::Fixed => HarnessConfig::fixed(),
            PresetName::Comparison => HarnessConfig::comparison(),
        }
    }
}

/// Arguments for the preset command
#[derive(Args, Debug, Clone)]
pub struct PresetArgs {
    /// Preset to run
    #[arg(value_enum)]
    pub name: PresetName,

    /// Override the preset's report format
    #[arg(long, short, value_enum)]
    pub format: Option<ReportFormat>,
}

impl PresetArgs {
    pub fn to_config(&self) -> HarnessConfig {
        let mut config = self.name.config();
        if let Some(format) = self.format {
            config.report.format = format;
        }
        config
    }
}

/// Execute the preset command
pub fn execute(args: PresetArgs) -> Result<()> {
    let report = super::run_suite(args.to_config())?;
    println!("{}", report);
    Ok(())
}
