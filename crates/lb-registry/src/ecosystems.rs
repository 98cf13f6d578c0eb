//! ecosyste.ms aggregate package stats.

use lb_core::upstream::EcosystemStats;

use crate::error::RegistryError;
use crate::http::{check_response, read_json};
use crate::{UpstreamClient, encode_name};

/// Missing or `null` counters read as zero.
#[derive(serde::Deserialize)]
struct EcosystemPackage {
    #[serde(default)]
    downloads: Option<u64>,
    #[serde(default)]
    dependent_packages_count: Option<u64>,
    #[serde(default)]
    dependent_repos_count: Option<u64>,
}

impl From<EcosystemPackage> for EcosystemStats {
    fn from(pkg: EcosystemPackage) -> Self {
        Self {
            total_downloads: pkg.downloads.unwrap_or(0),
            dependent_packages_count: pkg.dependent_packages_count.unwrap_or(0),
            dependent_repos_count: pkg.dependent_repos_count.unwrap_or(0),
        }
    }
}

impl UpstreamClient {
    /// Fetch total downloads and dependent counts for `name`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] if the HTTP request fails, the service
    /// returns a non-success status, or the body is not a JSON object.
    pub async fn fetch_ecosystem_stats(&self, name: &str) -> Result<EcosystemStats, RegistryError> {
        let url = format!("{}/{}", self.ecosystem_url, encode_name(name));
        let pkg = self
            .retry
            .run("ecosystems", || async {
                let resp = check_response(self.http.get(&url).send().await?).await?;
                read_json::<EcosystemPackage>(resp).await
            })
            .await?;
        Ok(pkg.into())
    }
}
