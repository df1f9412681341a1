//! Report generation for the contention harness
//!
//! This module renders suite results: expected versus actual counter
//! values, lost updates, timings and a side-by-side comparison when both
//! lock modes ran.

use serde::{Deserialize, Serialize};
use std::fmt::Write;

use crate::metrics::{RunResult, SuiteResults, TrialSummary};

/// Report format options
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
pub enum ReportFormat {
    /// Pretty box-drawing format for terminal display
    #[default]
    Pretty,
    /// Simple text format
    Simple,
    /// Compact single-line-per-mode format
    Compact,
    /// Machine-readable JSON
    Json,
}

/// Generate a formatted report from suite results
pub fn generate_report(results: &SuiteResults, format: ReportFormat) -> String {
    match format {
        ReportFormat::Pretty => generate_pretty_report(results),
        ReportFormat::Simple => generate_simple_report(results),
        ReportFormat::Compact => generate_compact_report(results),
        ReportFormat::Json => generate_json_report(results),
    }
}

fn mode_name(use_lock: bool) -> &'static str {
    if use_lock {
        "LOCKED"
    } else {
        "UNLOCKED"
    }
}

/// Generate a pretty box-drawing report
fn generate_pretty_report(results: &SuiteResults) -> String {
    let mut report = String::new();
    let workload = &results.config.workload;

    // Header
    writeln!(report, "╔════════════════════════════════════════════════════════════════╗").unwrap();
    writeln!(report, "║            RACE CONDITION HARNESS RESULTS                      ║").unwrap();
    writeln!(report, "╠════════════════════════════════════════════════════════════════╣").unwrap();
    writeln!(report, "║ Workers:           {:>12}                                ║", workload.workers).unwrap();
    writeln!(report, "║ Increments/worker: {:>12}                                ║", format_number(workload.increments_per_worker)).unwrap();
    writeln!(report, "║ Delay:             {:>12}                                ║", format!("{}μs", workload.delay_us)).unwrap();
    writeln!(report, "║ Expected value:    {:>12}                                ║", format_number(workload.run_config(true).expected_total())).unwrap();

    for summary in results.summaries() {
        writeln!(report, "╠════════════════════════════════════════════════════════════════╣").unwrap();
        writeln!(report, "║ {:<63}║", format!("{}:", mode_name(summary.use_lock))).unwrap();

        for (i, run) in summary.runs.iter().enumerate() {
            let line = format!(
                "   trial {}: final={} lost={} ({:.1}%) {} {}",
                i + 1,
                format_number(run.final_value),
                format_number(run.lost_updates()),
                run.loss_rate() * 100.0,
                format_duration(run.elapsed.as_secs_f64()),
                run.verdict().label()
            );
            writeln!(report, "║{:<64}║", truncate(&line, 64)).unwrap();
        }

        if summary.trials() > 1 {
            let line = format!(
                "   matched {}/{} mean lost={:.1} ({:.1}%) mean time={}",
                summary.matches(),
                summary.trials(),
                summary.mean_lost(),
                summary.mean_loss_rate() * 100.0,
                format_duration(summary.mean_elapsed().as_secs_f64())
            );
            writeln!(report, "║{:<64}║", truncate(&line, 64)).unwrap();
        }
    }

    // Comparison Section
    if let (Some(unlocked), Some(locked)) = (&results.unlocked, &results.locked) {
        writeln!(report, "╠════════════════════════════════════════════════════════════════╣").unwrap();
        writeln!(report, "║ COMPARISON:                   {:>15} {:>15}  ║", "Unlocked", "Locked").unwrap();
        for line in comparison_rows(unlocked, locked) {
            writeln!(report, "║   {:.<28}{:>15} {:>15}  ║", line.0, line.1, line.2).unwrap();
        }
    }

    // Faults Section
    let faults: Vec<_> = results
        .all_runs()
        .flat_map(|r| r.faults.iter().map(move |f| (r.use_lock, f)))
        .collect();
    if !faults.is_empty() {
        writeln!(report, "╠════════════════════════════════════════════════════════════════╣").unwrap();
        writeln!(report, "║ WORKER FAULTS:                                                 ║").unwrap();
        for (use_lock, fault) in faults {
            let msg = format!("{} worker {}: {}", mode_name(use_lock), fault.worker_id, fault.message);
            writeln!(report, "║   - {:<59}║", truncate(&msg, 59)).unwrap();
        }
    }

    // Footer
    writeln!(report, "╚════════════════════════════════════════════════════════════════╝").unwrap();

    report
}

/// Cut a line to `width` characters, marking the cut with "..."
fn truncate(line: &str, width: usize) -> String {
    if line.chars().count() > width {
        format!("{}...", line.chars().take(width - 3).collect::<String>())
    } else {
        line.to_string()
    }
}

/// Rows of the side-by-side table: label, unlocked, locked
fn comparison_rows(unlocked: &TrialSummary, locked: &TrialSummary) -> Vec<(&'static str, String, String)> {
    let verdict = |s: &TrialSummary| {
        if s.all_matched() {
            "correct".to_string()
        } else {
            "incorrect".to_string()
        }
    };

    vec![
        (
            "Final value",
            format_number(unlocked.min_final()),
            format_number(locked.min_final()),
        ),
        ("Correctness", verdict(unlocked), verdict(locked)),
        (
            "Lost updates",
            format_number(unlocked.total_lost()),
            format_number(locked.total_lost()),
        ),
        (
            "Loss rate",
            format!("{:.1}%", unlocked.mean_loss_rate() * 100.0),
            format!("{:.1}%", locked.mean_loss_rate() * 100.0),
        ),
        (
            "Worker faults",
            unlocked.fault_count().to_string(),
            locked.fault_count().to_string(),
        ),
        (
            "Time (s)",
            format!("{:.4}", unlocked.mean_elapsed().as_secs_f64()),
            format!("{:.4}", locked.mean_elapsed().as_secs_f64()),
        ),
    ]
}

/// Generate a simple text report
fn generate_simple_report(results: &SuiteResults) -> String {
    let mut report = String::new();
    let workload = &results.config.workload;

    writeln!(report, "=== RACE CONDITION HARNESS RESULTS ===").unwrap();
    writeln!(report).unwrap();
    writeln!(report, "Workers: {}", workload.workers).unwrap();
    writeln!(report, "Increments per worker: {}", format_number(workload.increments_per_worker)).unwrap();
    writeln!(report, "Delay: {}μs", workload.delay_us).unwrap();
    writeln!(report).unwrap();

    for summary in results.summaries() {
        writeln!(report, "{}:", mode_name(summary.use_lock)).unwrap();
        for (i, run) in summary.runs.iter().enumerate() {
            write_simple_run(&mut report, i + 1, run);
        }
        writeln!(report, "  Matched: {}/{}", summary.matches(), summary.trials()).unwrap();
        writeln!(report, "  Mean loss rate: {:.1}%", summary.mean_loss_rate() * 100.0).unwrap();
        writeln!(report).unwrap();
    }

    let faults: Vec<_> = results.all_runs().flat_map(|r| r.faults.iter()).collect();
    if !faults.is_empty() {
        writeln!(report, "WORKER FAULTS:").unwrap();
        for fault in faults {
            writeln!(report, "  - worker {}: {}", fault.worker_id, fault.message).unwrap();
        }
    }

    report
}

fn write_simple_run(report: &mut String, trial: usize, run: &RunResult) {
    writeln!(report, "  Trial {}:", trial).unwrap();
    writeln!(report, "    Expected: {}", format_number(run.expected)).unwrap();
    writeln!(report, "    Actual: {}", format_number(run.final_value)).unwrap();
    writeln!(
        report,
        "    Lost: {} ({:.1}%)",
        format_number(run.lost_updates()),
        run.loss_rate() * 100.0
    )
    .unwrap();
    writeln!(report, "    Time: {:.4}s", run.elapsed.as_secs_f64()).unwrap();
    writeln!(report, "    Throughput: {:.0} increments/s", run.throughput()).unwrap();
    writeln!(report, "    Verdict: {}", run.verdict().label()).unwrap();
}

/// Generate a compact report, one line per lock mode
fn generate_compact_report(results: &SuiteResults) -> String {
    results
        .summaries()
        .map(|summary| {
            format!(
                "[{}] trials={} matched={}/{} final={}/{} lost={} elapsed={:.2}s",
                mode_name(summary.use_lock),
                summary.trials(),
                summary.matches(),
                summary.trials(),
                format_number(summary.min_final()),
                format_number(summary.expected()),
                format_number(summary.total_lost()),
                summary.mean_elapsed().as_secs_f64()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Generate a JSON report
fn generate_json_report(results: &SuiteResults) -> String {
    serde_json::to_string_pretty(results)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize results: {}\"}}", e))
}

/// Format a number with thousands separators
fn format_number(n: u64) -> String {
    let s = n.to_string();
    let chars: Vec<char> = s.chars().rev().collect();
    let mut result = String::new();

    for (i, c) in chars.iter().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(*c);
    }

    result.chars().rev().collect()
}

/// Format duration in human-readable format
fn format_duration(secs: f64) -> String {
    if secs < 1.0 {
        format!("{:.1}ms", secs * 1000.0)
    } else if secs < 60.0 {
        format!("{:.2}s", secs)
    } else {
        let total = secs.round() as u64;
        format!("{}m {}s", total / 60, total % 60)
    }
}
