//! Human-readable batch progress lines and end-of-run summaries.

use lb_enrich::{BatchReport, RunReport};

pub fn batch_line(report: &BatchReport) -> String {
    let mut line = format!(
        "[{}] batch {}/{}: {} succeeded, {} failed | {}/{} done, {:.1}% success | {:.1}s",
        report.mode,
        report.number,
        report.total_batches,
        report.batch.succeeded,
        report.batch.failed,
        report.cumulative.attempted,
        report.planned,
        report.cumulative.success_rate(),
        report.batch_elapsed.as_secs_f64(),
    );
    if let Some(avg) = report.average_per_success() {
        line.push_str(&format!(", {:.2}s per success", avg.as_secs_f64()));
    }
    line
}

pub fn summary_lines(report: &RunReport) -> Vec<String> {
    let mut lines = vec![
        format!("{} complete in {:.1}s", report.mode, report.elapsed.as_secs_f64()),
        format!(
            "  attempted {}, succeeded {}, failed {} ({:.1}% success)",
            report.tally.attempted,
            report.tally.succeeded,
            report.tally.failed,
            report.tally.success_rate(),
        ),
    ];
    if report.skipped > 0 {
        lines.push(format!("  skipped {} (duplicate or already stored)", report.skipped));
    }
    if let Some(path) = &report.failure_artifact {
        lines.push(format!("  failures written to {}", path.display()));
    }
    lines
}
