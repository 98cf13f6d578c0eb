//! Upstream HTTP endpoints and client settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

fn default_registry_url() -> String {
    "https://registry.npmjs.org".to_string()
}

fn default_ecosystem_url() -> String {
    "https://packages.ecosyste.ms/api/v1/registries/npmjs.org/packages".to_string()
}

fn default_downloads_url() -> String {
    "https://api.npmjs.org/downloads".to_string()
}

fn default_user_agent() -> String {
    "npmlb/0.1".to_string()
}

/// Default per-request timeout in seconds.
const fn default_request_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamConfig {
    /// Registry metadata base URL (`GET {registry_url}/{name}`).
    #[serde(default = "default_registry_url")]
    pub registry_url: String,

    /// Ecosystem stats base URL (`GET {ecosystem_url}/{name}`).
    #[serde(default = "default_ecosystem_url")]
    pub ecosystem_url: String,

    /// Download-series base URL (`GET {downloads_url}/range/{start}:{end}/{name}`).
    #[serde(default = "default_downloads_url")]
    pub downloads_url: String,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            registry_url: default_registry_url(),
            ecosystem_url: default_ecosystem_url(),
            downloads_url: default_downloads_url(),
            user_agent: default_user_agent(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl UpstreamConfig {
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// The three base URLs with their field names, for validation.
    pub(crate) fn urls(&self) -> [(&'static str, &str); 3] {
        [
            ("upstream.registry_url", self.registry_url.as_str()),
            ("upstream.ecosystem_url", self.ecosystem_url.as_str()),
            ("upstream.downloads_url", self.downloads_url.as_str()),
        ]
    }
}
