//! Ad-hoc run and compare commands

use anyhow::Result;
use clap::Args;

use crate::config::{HarnessConfig, ReportConfig, SuiteConfig, SuiteMode, WorkloadConfig};
use crate::report::ReportFormat;

/// Workload and suite flags shared by `run` and `compare`
#[derive(Args, Debug, Clone)]
pub struct WorkloadArgs {
    /// Number of concurrent workers
    #[arg(long, short, default_value = "10")]
    pub workers: usize,

    /// Increments performed by each worker
    #[arg(long, short, default_value = "100")]
    pub increments: u64,

    /// Pause between read and write in microseconds (0 yields instead)
    #[arg(long, default_value = "10")]
    pub delay_us: u64,

    /// Runs per lock mode
    #[arg(long, short, default_value = "1")]
    pub trials: u32,

    /// Give up if the suite takes longer than this
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Report format
    #[arg(long, short, value_enum, default_value_t = ReportFormat::Pretty)]
    pub format: ReportFormat,
}

impl WorkloadArgs {
    /// Build the harness configuration for a suite mode
    pub fn to_config(&self, mode: SuiteMode) -> HarnessConfig {
        HarnessConfig {
            workload: WorkloadConfig {
                workers: self.workers,
                increments_per_worker: self.increments,
                delay_us: self.delay_us,
            },
            suite: SuiteConfig {
                mode,
                trials: self.trials,
                timeout_secs: self.timeout_secs,
            },
            report: ReportConfig {
                format: self.format,
            },
        }
    }
}

/// Arguments for the run command
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub workload: WorkloadArgs,

    /// Guard every increment with the shared lock
    #[arg(long)]
    pub lock: bool,
}

impl RunArgs {
    pub fn to_config(&self) -> HarnessConfig {
        let mode = if self.lock {
            SuiteMode::Locked
        } else {
            SuiteMode::Unlocked
        };
        self.workload.to_config(mode)
    }
}

/// Arguments for the compare command
#[derive(Args, Debug, Clone)]
pub struct CompareArgs {
    #[command(flatten)]
    pub workload: WorkloadArgs,
}

/// Execute the run command
pub fn execute(args: RunArgs) -> Result<()> {
    let report = super::run_suite(args.to_config())?;
    println!("{}", report);
    Ok(())
}

/// Execute the compare command
pub fn execute_compare(args: CompareArgs) -> Result<()> {
    let report = super::run_suite(args.workload.to_config(SuiteMode::Compare))?;
    println!("{}", report);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;

    #[test]
    fn test_run_defaults() {
        let cli = Cli::parse_from(["race-harness", "run"]);
        let Commands::Run(args) = cli.command else {
            panic!("expected run command");
        };

        let config = args.to_config();
        assert_eq!(config.workload.workers, 10);
        assert_eq!(config.workload.increments_per_worker, 100);
        assert_eq!(config.workload.delay_us, 10);
        assert_eq!(config.suite.mode, SuiteMode::Unlocked);
        assert_eq!(config.suite.trials, 1);
        assert_eq!(config.suite.timeout_secs, None);
        assert_eq!(config.report.format, ReportFormat::Pretty);
    }

    #[test]
    fn test_run_with_flags() {
        let cli = Cli::parse_from([
            "race-harness",
            "run",
            "--workers",
            "5",
            "--increments",
            "1000",
            "--delay-us",
            "100",
            "--lock",
            "--trials",
            "3",
            "--timeout-secs",
            "60",
            "--format",
            "compact",
        ]);
        let Commands::Run(args) = cli.command else {
            panic!("expected run command");
        };

        let config = args.to_config();
        assert_eq!(config.workload.workers, 5);
        assert_eq!(config.workload.increments_per_worker, 1000);
        assert_eq!(config.workload.delay_us, 100);
        assert_eq!(config.suite.mode, SuiteMode::Locked);
        assert_eq!(config.suite.trials, 3);
        assert_eq!(config.suite.timeout_secs, Some(60));
        assert_eq!(config.report.format, ReportFormat::Compact);
    }

    #[test]
    fn test_compare_mode() {
        let cli = Cli::parse_from(["race-harness", "compare", "-w", "4", "-i", "25"]);
        let Commands::Compare(args) = cli.command else {
            panic!("expected compare command");
        };

        let config = args.workload.to_config(SuiteMode::Compare);
        assert_eq!(config.workload.workers, 4);
        assert_eq!(config.workload.increments_per_worker, 25);
        assert_eq!(config.suite.mode, SuiteMode::Compare);
    }

    #[test]
    fn test_run_suite_rejects_zero_workers() {
        let cli = Cli::parse_from(["race-harness", "run", "--workers", "0", "--lock"]);
        let Commands::Run(args) = cli.command else {
            panic!("expected run command");
        };

        assert!(crate::cli::run_suite(args.to_config()).is_err());
    }

    #[test]
    fn test_run_suite_rejects_huge_worker_count() {
        let cli = Cli::parse_from([
            "race-harness",
            "compare",
            "--workers",
            "9223372036854775807",
            "--increments",
            "1",
        ]);
        let Commands::Compare(args) = cli.command else {
            panic!("expected compare command");
        };

        let err = crate::cli::run_suite(args.workload.to_config(SuiteMode::Compare)).unwrap_err();
        assert!(err.to_string().contains("at most"));
    }
}
