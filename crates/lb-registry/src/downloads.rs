//! npm downloads API: daily series over a date range.

use lb_core::upstream::DailyDownloads;
use lb_core::weekly::TrendWindow;

use crate::error::RegistryError;
use crate::http::{check_response, read_json};
use crate::{UpstreamClient, encode_scoped_path};

#[derive(serde::Deserialize)]
struct RangeResponse {
    #[serde(default)]
    downloads: Vec<DailyDownloads>,
}

impl UpstreamClient {
    /// Fetch the daily download series of `name` over `window`.
    ///
    /// Entries come back in upstream order, which is chronological.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] if the HTTP request fails, the service
    /// returns a non-success status, or a day is not an ISO date.
    pub async fn fetch_daily_downloads(
        &self,
        name: &str,
        window: TrendWindow,
    ) -> Result<Vec<DailyDownloads>, RegistryError> {
        let url = format!(
            "{}/range/{}/{}",
            self.downloads_url,
            window.range_segment(),
            encode_scoped_path(name)
        );
        let body = self
            .retry
            .run("downloads", || async {
                let resp = check_response(self.http.get(&url).send().await?).await?;
                read_json::<RangeResponse>(resp).await
            })
            .await?;
        Ok(body.downloads)
    }
}
