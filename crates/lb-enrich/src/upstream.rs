//! The three per-package fetches, behind a trait.

use std::future::Future;

use lb_core::upstream::{DailyDownloads, EcosystemStats, RegistryMetadata};
use lb_core::weekly::TrendWindow;
use lb_registry::{RegistryError, UpstreamClient};

/// Source of the data one unit is built from.
///
/// Each call is independently fallible and applies its own retries.
pub trait Upstream {
    fn metadata(&self, name: &str) -> impl Future<Output = Result<RegistryMetadata, RegistryError>>;

    fn ecosystem_stats(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<EcosystemStats, RegistryError>>;

    fn daily_downloads(
        &self,
        name: &str,
        window: TrendWindow,
    ) -> impl Future<Output = Result<Vec<DailyDownloads>, RegistryError>>;
}

impl Upstream for UpstreamClient {
    fn metadata(&self, name: &str) -> impl Future<Output = Result<RegistryMetadata, RegistryError>> {
        self.fetch_metadata(name)
    }

    fn ecosystem_stats(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<EcosystemStats, RegistryError>> {
        self.fetch_ecosystem_stats(name)
    }

    fn daily_downloads(
        &self,
        name: &str,
        window: TrendWindow,
    ) -> impl Future<Output = Result<Vec<DailyDownloads>, RegistryError>> {
        self.fetch_daily_downloads(name, window)
    }
}
