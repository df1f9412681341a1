//! Run a suite from a TOML file

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use crate::config::HarnessConfig;
use crate::report::ReportFormat;

/// Arguments for the config command
#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Path to the TOML configuration
    pub path: PathBuf,

    /// Override the file's report format
    #[arg(long, short, value_enum)]
    pub format: Option<ReportFormat>,
}

/// Execute the config command
pub fn execute(args: ConfigArgs) -> Result<()> {
    let mut config = HarnessConfig::from_file(&args.path)
        .with_context(|| format!("loading {}", args.path.display()))?;
    if let Some(format) = args.format {
        config.report.format = format;
    }

    let report = super::run_suite(config)?;
    println!("{}", report);
    Ok(())
}
