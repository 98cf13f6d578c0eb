//! `npmlb ingest`, `npmlb refresh` and `npmlb sync`.

use std::path::Path;

use anyhow::Context;
use chrono::Utc;
use lb_enrich::{BatchDriver, RunPlan, RunReport};
use lb_registry::UpstreamClient;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::names::read_name_list;
use crate::progress::Progress;
use crate::summary::{batch_line, summary_lines};

fn driver(ctx: &AppContext) -> BatchDriver<'_, UpstreamClient> {
    BatchDriver::new(&ctx.upstream, &ctx.store, &ctx.config.pipeline)
}

fn count(n: usize) -> u64 {
    u64::try_from(n).unwrap_or(u64::MAX)
}

/// Run a plan with a progress bar and per-batch lines, then print the summary.
async fn execute(
    driver: &BatchDriver<'_, UpstreamClient>,
    plan: RunPlan,
    flags: &GlobalFlags,
) -> anyhow::Result<RunReport> {
    let mode = plan.mode;
    let progress = Progress::bar(count(plan.len()), mode.as_str(), flags.quiet);
    let report = driver
        .run(plan, |batch| {
            progress.inc(count(batch.batch.attempted));
            progress.set_message(&format!("{mode} batch {}/{}", batch.number, batch.total_batches));
            if !flags.quiet {
                progress.println(&batch_line(batch));
            }
        })
        .await
        .with_context(|| format!("{mode} run failed"))?;
    progress.finish_clear();

    if !flags.quiet {
        for line in summary_lines(&report) {
            println!("{line}");
        }
    }
    Ok(report)
}

pub async fn ingest(input: &Path, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let names = read_name_list(input)?;
    let driver = driver(ctx);
    let plan = driver
        .plan_ingest(&names)
        .await
        .context("failed to determine ingest set")?;
    execute(&driver, plan, flags).await?;
    Ok(())
}

pub async fn refresh(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let driver = driver(ctx);
    let plan = driver
        .plan_refresh()
        .await
        .context("failed to load stored package names")?;
    execute(&driver, plan, flags).await?;
    Ok(())
}

/// New names are ingested and previously stored ones refreshed; a package
/// ingested by this sync is not fetched a second time. The sync time is
/// recorded once both stages have run.
pub async fn sync(input: &Path, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let names = read_name_list(input)?;
    let driver = driver(ctx);
    let refresh_plan = driver
        .plan_refresh()
        .await
        .context("failed to load stored package names")?;
    let ingest_plan = driver
        .plan_ingest(&names)
        .await
        .context("failed to determine ingest set")?;

    let ingested = execute(&driver, ingest_plan, flags).await?;
    let refreshed = execute(&driver, refresh_plan, flags).await?;

    let finished = Utc::now();
    ctx.store
        .set_last_sync(finished)
        .await
        .context("failed to record sync time")?;
    tracing::info!(
        ingested = ingested.tally.succeeded,
        refreshed = refreshed.tally.succeeded,
        "sync recorded"
    );
    if !flags.quiet {
        println!("last sync set to {}", finished.to_rfc3339());
    }
    Ok(())
}
