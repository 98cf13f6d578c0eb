//! Batch driver tunables.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

const fn default_batch_size() -> usize {
    100
}

/// Concurrency ceiling: admission slots shared by the units of a batch.
const fn default_concurrency() -> usize {
    10
}

const fn default_unit_timeout_secs() -> u64 {
    300
}

const fn default_trend_weeks() -> u32 {
    8
}

/// Upper bound on `trend_weeks`, about ten years of history.
pub const MAX_TREND_WEEKS: u32 = 520;

fn default_failure_log_dir() -> PathBuf {
    PathBuf::from("data/logs")
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PipelineConfig {
    /// Units per sequential batch.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Wall-clock budget for one unit's fetches, retries included.
    #[serde(default = "default_unit_timeout_secs")]
    pub unit_timeout_secs: u64,

    /// Completed weeks requested from the download-series source.
    #[serde(default = "default_trend_weeks")]
    pub trend_weeks: u32,

    /// Directory receiving the per-run failure artifact.
    #[serde(default = "default_failure_log_dir")]
    pub failure_log_dir: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            concurrency: default_concurrency(),
            unit_timeout_secs: default_unit_timeout_secs(),
            trend_weeks: default_trend_weeks(),
            failure_log_dir: default_failure_log_dir(),
        }
    }
}

impl PipelineConfig {
    #[must_use]
    pub const fn unit_timeout(&self) -> Duration {
        Duration::from_secs(self.unit_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = PipelineConfig::default();
        assert_eq!(config.batch_size, 100);
        assert_eq!(config.concurrency, 10);
        assert_eq!(config.unit_timeout(), Duration::from_secs(300));
        assert_eq!(config.trend_weeks, 8);
        assert_eq!(config.failure_log_dir, PathBuf::from("data/logs"));
    }
}
