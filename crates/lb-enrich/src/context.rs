//! Run-scoped accounting.
//!
//! Each batch produces a [`BatchOutcome`] of its own; the driver folds it into
//! the [`RunContext`] once the batch has finished, so no counter is shared
//! between concurrently running units.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use lb_core::enums::RunMode;
use lb_core::failure::FailureEntry;

use crate::sink::FailureSink;

/// Attempted / succeeded / failed counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunTally {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl RunTally {
    /// Succeeded units as a percentage of attempted ones (0 when idle).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn success_rate(&self) -> f64 {
        if self.attempted == 0 {
            0.0
        } else {
            self.succeeded as f64 / self.attempted as f64 * 100.0
        }
    }

    fn add(&mut self, other: Self) {
        self.attempted += other.attempted;
        self.succeeded += other.succeeded;
        self.failed += other.failed;
    }
}

/// What one finished batch hands back to the run.
#[derive(Debug)]
pub(crate) struct BatchOutcome {
    pub number: usize,
    pub tally: RunTally,
    pub failures: Vec<FailureEntry>,
    pub elapsed: Duration,
}

/// Progress snapshot emitted after each batch.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport {
    pub mode: RunMode,
    /// 1-based.
    pub number: usize,
    pub total_batches: usize,
    pub batch: RunTally,
    pub cumulative: RunTally,
    /// Units in the whole run.
    pub planned: usize,
    pub batch_elapsed: Duration,
    pub run_elapsed: Duration,
}

impl BatchReport {
    /// Mean wall time per successful unit so far.
    #[must_use]
    pub fn average_per_success(&self) -> Option<Duration> {
        let succeeded = u32::try_from(self.cumulative.succeeded).ok()?;
        (succeeded > 0).then(|| self.run_elapsed / succeeded)
    }
}

/// End-of-run summary.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub mode: RunMode,
    pub tally: RunTally,
    /// Candidates dropped before the run (duplicates, already stored).
    pub skipped: usize,
    pub batches: usize,
    pub elapsed: Duration,
    pub failure_artifact: Option<PathBuf>,
}

/// Mutable state of one run, owned by the driver loop.
#[derive(Debug)]
pub(crate) struct RunContext {
    mode: RunMode,
    planned: usize,
    total_batches: usize,
    tally: RunTally,
    failures: FailureSink,
    started: Instant,
}

impl RunContext {
    pub(crate) fn new(mode: RunMode, planned: usize, total_batches: usize) -> Self {
        Self {
            mode,
            planned,
            total_batches,
            tally: RunTally::default(),
            failures: FailureSink::new(),
            started: Instant::now(),
        }
    }

    pub(crate) const fn failures(&self) -> &FailureSink {
        &self.failures
    }

    fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub(crate) fn absorb(&mut self, outcome: BatchOutcome) -> BatchReport {
        self.tally.add(outcome.tally);
        self.failures.merge(outcome.failures);
        BatchReport {
            mode: self.mode,
            number: outcome.number,
            total_batches: self.total_batches,
            batch: outcome.tally,
            cumulative: self.tally,
            planned: self.planned,
            batch_elapsed: outcome.elapsed,
            run_elapsed: self.elapsed(),
        }
    }

    pub(crate) fn finish(&self, skipped: usize, failure_artifact: Option<PathBuf>) -> RunReport {
        RunReport {
            mode: self.mode,
            tally: self.tally,
            skipped,
            batches: self.total_batches,
            elapsed: self.elapsed(),
            failure_artifact,
        }
    }
}
