//! Shared state for the run commands: validated config, store and client.

use anyhow::Context;
use lb_config::LbConfig;
use lb_db::PackageStore;
use lb_registry::UpstreamClient;

use crate::cli::RunArgs;

pub struct AppContext {
    pub config: LbConfig,
    pub store: PackageStore,
    pub upstream: UpstreamClient,
}

impl AppContext {
    /// Load config (`.env`, files, `NPMLB_*`), apply CLI overrides, validate,
    /// then open the store and build the upstream client.
    pub async fn init(overrides: &RunArgs) -> anyhow::Result<Self> {
        let mut config = LbConfig::load_with_dotenv().context("failed to load configuration")?;
        apply_overrides(&mut config, overrides);
        config.validate().context("invalid configuration")?;

        let store = PackageStore::open(&config.store)
            .await
            .with_context(|| format!("failed to open store at {}", config.store.path))?;
        let upstream = UpstreamClient::new(&config.upstream, &config.retry)
            .context("failed to build upstream HTTP client")?;

        tracing::debug!(
            store = %config.store.path,
            batch_size = config.pipeline.batch_size,
            concurrency = config.pipeline.concurrency,
            "context ready"
        );
        Ok(Self {
            config,
            store,
            upstream,
        })
    }
}

fn apply_overrides(config: &mut LbConfig, overrides: &RunArgs) {
    if let Some(batch_size) = overrides.batch_size {
        config.pipeline.batch_size = batch_size;
    }
    if let Some(concurrency) = overrides.concurrency {
        config.pipeline.concurrency = concurrency;
    }
}
