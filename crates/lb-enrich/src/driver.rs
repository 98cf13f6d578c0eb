//! Resumable batch driver.
//!
//! A run is planned first (which names to attempt), then walked in fixed-size
//! batches strictly one after another. Inside a batch every unit runs through
//! the [`BoundedExecutor`]; a unit fetches registry metadata, ecosystem stats
//! and the daily series in that order, stopping at the first failure, then
//! builds the record and writes it. Ingest inserts only absent names, so an
//! interrupted ingest can simply be run again.

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::Utc;
use lb_config::PipelineConfig;
use lb_core::builder::build_update;
use lb_core::enums::{RunMode, UnitState};
use lb_core::failure::FailureEntry;
use lb_core::record::RecordUpdate;
use lb_core::weekly::{TrendWindow, aggregate_weekly};
use lb_db::PackageStore;
use lb_db::error::DatabaseError;

use crate::context::{BatchOutcome, BatchReport, RunContext, RunReport, RunTally};
use crate::error::{EnrichError, UnitError};
use crate::executor::BoundedExecutor;
use crate::upstream::Upstream;

/// The names a run will attempt, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPlan {
    pub mode: RunMode,
    pub names: Vec<String>,
    /// Candidates dropped while planning.
    pub skipped: usize,
}

impl RunPlan {
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// One unit's walk through its lifecycle.
struct Unit<'n> {
    name: &'n str,
    state: UnitState,
}

impl<'n> Unit<'n> {
    const fn new(name: &'n str) -> Self {
        Self {
            name,
            state: UnitState::Pending,
        }
    }

    fn advance(&mut self, next: UnitState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "{}: {} -> {next}",
            self.name,
            self.state
        );
        self.state = next;
    }
}

pub struct BatchDriver<'a, U> {
    upstream: &'a U,
    store: &'a PackageStore,
    executor: BoundedExecutor,
    batch_size: usize,
    unit_timeout: Duration,
    trend_weeks: u32,
    failure_log_dir: PathBuf,
    window: Option<TrendWindow>,
}

impl<'a, U: Upstream> BatchDriver<'a, U> {
    #[must_use]
    pub fn new(upstream: &'a U, store: &'a PackageStore, config: &PipelineConfig) -> Self {
        Self {
            upstream,
            store,
            executor: BoundedExecutor::new(config.concurrency),
            batch_size: config.batch_size.max(1),
            unit_timeout: config.unit_timeout(),
            trend_weeks: config.trend_weeks,
            failure_log_dir: config.failure_log_dir.clone(),
            window: None,
        }
    }

    /// Pin the download-series window instead of deriving it from today.
    #[must_use]
    pub const fn with_window(mut self, window: TrendWindow) -> Self {
        self.window = Some(window);
        self
    }

    /// Candidate names, deduplicated keeping first occurrence, minus blanks
    /// and names already stored. The store is asked once for the whole list.
    ///
    /// # Errors
    ///
    /// Returns [`EnrichError::InputSet`] if the store lookup fails.
    pub async fn plan_ingest<I, S>(&self, candidates: I) -> Result<RunPlan, EnrichError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut offered = 0;
        let mut unique = Vec::new();
        for candidate in candidates {
            offered += 1;
            let name = candidate.as_ref().trim();
            if !name.is_empty() && seen.insert(name.to_string()) {
                unique.push(name.to_string());
            }
        }

        let existing = self.store.existing_names(&unique).await?;
        let names: Vec<String> = unique
            .into_iter()
            .filter(|name| !existing.contains(name))
            .collect();
        tracing::info!(
            offered,
            already_stored = existing.len(),
            to_ingest = names.len(),
            "ingest planned"
        );
        Ok(RunPlan {
            mode: RunMode::Ingest,
            skipped: offered - names.len(),
            names,
        })
    }

    /// Every stored name.
    ///
    /// # Errors
    ///
    /// Returns [`EnrichError::InputSet`] if the store cannot be read.
    pub async fn plan_refresh(&self) -> Result<RunPlan, EnrichError> {
        let names = self.store.all_names().await?;
        tracing::info!(to_refresh = names.len(), "refresh planned");
        Ok(RunPlan {
            mode: RunMode::Refresh,
            names,
            skipped: 0,
        })
    }

    /// Walk `plan` batch by batch, calling `on_batch` after each one, and
    /// write the failure artifact if any unit failed.
    ///
    /// # Errors
    ///
    /// Only the failure artifact write can fail the run; unit failures are
    /// reported in the returned [`RunReport`].
    pub async fn run<F>(&self, plan: RunPlan, mut on_batch: F) -> Result<RunReport, EnrichError>
    where
        F: FnMut(&BatchReport),
    {
        let window = self
            .window
            .unwrap_or_else(|| TrendWindow::current(self.trend_weeks));
        let total_batches = plan.names.len().div_ceil(self.batch_size);
        let mut ctx = RunContext::new(plan.mode, plan.names.len(), total_batches);
        tracing::info!(
            mode = %plan.mode,
            units = plan.names.len(),
            batches = total_batches,
            concurrency = self.executor.limit(),
            window = %window.range_segment(),
            "run started"
        );

        for (index, batch) in plan.names.chunks(self.batch_size).enumerate() {
            let outcome = self.run_batch(plan.mode, index + 1, batch, window).await;
            let report = ctx.absorb(outcome);
            tracing::info!(
                mode = %plan.mode,
                batch = report.number,
                of = report.total_batches,
                succeeded = report.batch.succeeded,
                failed = report.batch.failed,
                elapsed_ms = u64::try_from(report.batch_elapsed.as_millis()).unwrap_or(u64::MAX),
                "batch finished"
            );
            on_batch(&report);
        }

        let artifact = ctx
            .failures()
            .persist(&self.failure_log_dir, plan.mode, Utc::now())?;
        let report = ctx.finish(plan.skipped, artifact);
        tracing::info!(
            mode = %report.mode,
            attempted = report.tally.attempted,
            succeeded = report.tally.succeeded,
            failed = report.tally.failed,
            "run finished"
        );
        Ok(report)
    }

    /// Plan and run an ingest.
    ///
    /// # Errors
    ///
    /// See [`Self::plan_ingest`] and [`Self::run`].
    pub async fn ingest<I, S, F>(&self, candidates: I, on_batch: F) -> Result<RunReport, EnrichError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        F: FnMut(&BatchReport),
    {
        let plan = self.plan_ingest(candidates).await?;
        self.run(plan, on_batch).await
    }

    /// Plan and run a refresh.
    ///
    /// # Errors
    ///
    /// See [`Self::plan_refresh`] and [`Self::run`].
    pub async fn refresh<F>(&self, on_batch: F) -> Result<RunReport, EnrichError>
    where
        F: FnMut(&BatchReport),
    {
        let plan = self.plan_refresh().await?;
        self.run(plan, on_batch).await
    }

    async fn run_batch(
        &self,
        mode: RunMode,
        number: usize,
        names: &[String],
        window: TrendWindow,
    ) -> BatchOutcome {
        let started = Instant::now();
        let results = self
            .executor
            .run_all(names, |name| self.process_unit(mode, name, window))
            .await;

        let mut tally = RunTally::default();
        let mut failures = Vec::new();
        for (name, result) in names.iter().zip(results) {
            tally.attempted += 1;
            match result {
                Ok(()) => tally.succeeded += 1,
                Err(error) => {
                    tally.failed += 1;
                    failures.push(FailureEntry::new(
                        name.as_str(),
                        error.kind(),
                        error.to_string(),
                        number,
                    ));
                }
            }
        }
        BatchOutcome {
            number,
            tally,
            failures,
            elapsed: started.elapsed(),
        }
    }

    async fn process_unit(
        &self,
        mode: RunMode,
        name: &str,
        window: TrendWindow,
    ) -> Result<(), UnitError> {
        let mut unit = Unit::new(name);
        unit.advance(UnitState::InFlight);

        let result = match self.enrich(name, window).await {
            Ok(update) => self.write(mode, name, &update).await,
            Err(error) => Err(error),
        };

        match &result {
            Ok(()) => {
                unit.advance(UnitState::Succeeded);
                tracing::debug!(package = name, state = %unit.state, "unit finished");
            }
            Err(error) => {
                unit.advance(UnitState::Failed);
                tracing::warn!(package = name, kind = error.kind(), %error, "unit failed");
            }
        }
        result
    }

    /// The three fetches under the unit's wall-clock budget, then the build.
    async fn enrich(&self, name: &str, window: TrendWindow) -> Result<RecordUpdate, UnitError> {
        let fetches = async {
            let metadata = self.upstream.metadata(name).await?;
            let stats = self.upstream.ecosystem_stats(name).await?;
            let mut daily = self.upstream.daily_downloads(name, window).await?;
            daily.sort_by_key(|entry| entry.day);
            Ok::<_, UnitError>((metadata, stats, daily))
        };
        let (metadata, stats, daily) = tokio::time::timeout(self.unit_timeout, fetches)
            .await
            .map_err(|_| UnitError::Timeout {
                budget: self.unit_timeout,
            })??;

        Ok(build_update(
            name,
            metadata,
            stats,
            aggregate_weekly(&daily),
            Utc::now(),
        ))
    }

    async fn write(&self, mode: RunMode, name: &str, update: &RecordUpdate) -> Result<(), UnitError> {
        match mode {
            RunMode::Ingest => {
                if !self.store.insert(name, update).await? {
                    tracing::debug!(package = name, "already stored, insert skipped");
                }
            }
            RunMode::Refresh => {
                if !self.store.update(name, update).await? {
                    return Err(DatabaseError::NoResult.into());
                }
            }
        }
        Ok(())
    }
}
