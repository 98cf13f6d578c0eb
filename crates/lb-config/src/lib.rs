//! # lb-config
//!
//! Layered configuration loading for the npm leaderboard using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`NPMLB_*` prefix, `__` as separator)
//! 2. Project-level `.npmlb/config.toml`
//! 3. User-level `~/.config/npmlb/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `NPMLB_PIPELINE__BATCH_SIZE` -> `pipeline.batch_size`,
//! `NPMLB_STORE__PATH` -> `store.path`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use lb_config::LbConfig;
//!
//! let config = LbConfig::load_with_dotenv().expect("config");
//! config.validate().expect("valid config");
//! println!("batch size: {}", config.pipeline.batch_size);
//! ```

mod error;
mod pipeline;
mod retry;
mod store;
mod upstream;

pub use error::ConfigError;
pub use pipeline::{MAX_TREND_WEEKS, PipelineConfig};
pub use retry::{Backoff, RetryConfig};
pub use store::StoreConfig;
pub use upstream::UpstreamConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LbConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub retry: RetryConfig,
}

impl LbConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy` -- use [`Self::load_with_dotenv`] for `.env` loading.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Figment`] if a source cannot be parsed or a value
    /// has the wrong type.
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment().extract().map_err(ConfigError::from)
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    ///
    /// Same as [`Self::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment or layer providers on top.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = PathBuf::from(".npmlb/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("NPMLB_").split("__"))
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("npmlb").join("config.toml"))
    }

    /// Reject values the pipeline cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.path.trim().is_empty() {
            return Err(ConfigError::invalid("store.path", "must not be empty"));
        }
        for (field, url) in self.upstream.urls() {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::invalid(
                    field,
                    format!("'{url}' is not an http(s) URL"),
                ));
            }
        }
        if self.upstream.request_timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "upstream.request_timeout_secs",
                "must be at least 1",
            ));
        }
        if self.pipeline.batch_size == 0 {
            return Err(ConfigError::invalid("pipeline.batch_size", "must be at least 1"));
        }
        if self.pipeline.concurrency == 0 {
            return Err(ConfigError::invalid("pipeline.concurrency", "must be at least 1"));
        }
        if self.pipeline.unit_timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "pipeline.unit_timeout_secs",
                "must be at least 1",
            ));
        }
        if !(1..=MAX_TREND_WEEKS).contains(&self.pipeline.trend_weeks) {
            return Err(ConfigError::invalid(
                "pipeline.trend_weeks",
                format!("must be between 1 and {MAX_TREND_WEEKS}"),
            ));
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::invalid("retry.max_attempts", "must be at least 1"));
        }
        if self.retry.base_delay_ms > self.retry.max_delay_ms {
            return Err(ConfigError::invalid(
                "retry.base_delay_ms",
                format!(
                    "{} exceeds retry.max_delay_ms ({})",
                    self.retry.base_delay_ms, self.retry.max_delay_ms
                ),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn default_config_is_valid() {
        let config = LbConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.pipeline.batch_size, 100);
        assert_eq!(config.pipeline.concurrency, 10);
    }

    #[test]
    fn longest_trend_window_is_accepted() {
        let mut config = LbConfig::default();
        config.pipeline.trend_weeks = MAX_TREND_WEEKS;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn figment_builds_without_files() {
        let config: LbConfig = LbConfig::figment()
            .extract()
            .expect("should extract defaults");
        assert_eq!(config.retry.max_attempts, 3);
    }

    #[rstest]
    #[case::zero_batch(|c: &mut LbConfig| c.pipeline.batch_size = 0, "pipeline.batch_size")]
    #[case::zero_concurrency(|c: &mut LbConfig| c.pipeline.concurrency = 0, "pipeline.concurrency")]
    #[case::zero_timeout(|c: &mut LbConfig| c.pipeline.unit_timeout_secs = 0, "pipeline.unit_timeout_secs")]
    #[case::zero_weeks(|c: &mut LbConfig| c.pipeline.trend_weeks = 0, "pipeline.trend_weeks")]
    #[case::too_many_weeks(|c: &mut LbConfig| c.pipeline.trend_weeks = 20_000_000, "pipeline.trend_weeks")]
    #[case::zero_attempts(|c: &mut LbConfig| c.retry.max_attempts = 0, "retry.max_attempts")]
    #[case::inverted_delays(|c: &mut LbConfig| c.retry.base_delay_ms = 20_000, "retry.base_delay_ms")]
    #[case::bad_url(|c: &mut LbConfig| c.upstream.registry_url = "registry.npmjs.org".into(), "upstream.registry_url")]
    #[case::empty_store(|c: &mut LbConfig| c.store.path = String::new(), "store.path")]
    fn validate_rejects(#[case] mutate: fn(&mut LbConfig), #[case] expected_field: &str) {
        let mut config = LbConfig::default();
        mutate(&mut config);
        match config.validate() {
            Err(ConfigError::InvalidValue { field, .. }) => assert_eq!(field, expected_field),
            other => panic!("expected InvalidValue for {expected_field}, got {other:?}"),
        }
    }
}
