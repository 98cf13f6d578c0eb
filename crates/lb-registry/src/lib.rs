//! # lb-registry
//!
//! HTTP clients for the three upstream services a package is enriched from:
//! - the npm registry (latest version, dependencies, description, timestamps)
//! - ecosyste.ms (total downloads, dependent package and repository counts)
//! - the npm downloads API (daily download series for a date range)
//!
//! Every call goes through [`http::check_response`] for status handling and
//! through the client's [`RetryPolicy`] for bounded retries.

pub mod downloads;
pub mod ecosystems;
pub mod npm;
pub mod retry;

mod error;
mod http;

pub use error::RegistryError;
pub use retry::RetryPolicy;

use lb_config::{RetryConfig, UpstreamConfig};

// ── Client ─────────────────────────────────────────────────────────

/// HTTP client for the upstream services, sharing one connection pool.
///
/// Cheap to clone; clones share the pool.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    registry_url: String,
    ecosystem_url: String,
    downloads_url: String,
    retry: RetryPolicy,
}

impl UpstreamClient {
    /// Create a client from upstream and retry settings.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Http`] if the underlying `reqwest::Client`
    /// fails to build.
    pub fn new(upstream: &UpstreamConfig, retry: &RetryConfig) -> Result<Self, RegistryError> {
        let http = reqwest::Client::builder()
            .user_agent(upstream.user_agent.as_str())
            .timeout(upstream.request_timeout())
            .build()?;
        Ok(Self {
            http,
            registry_url: trim_base(&upstream.registry_url),
            ecosystem_url: trim_base(&upstream.ecosystem_url),
            downloads_url: trim_base(&upstream.downloads_url),
            retry: RetryPolicy::from_config(retry),
        })
    }
}

fn trim_base(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

/// Percent-encode a package name as a single path segment
/// (`@types/node` → `%40types%2Fnode`).
fn encode_name(name: &str) -> String {
    urlencoding::encode(name).into_owned()
}

/// Percent-encode each `/`-separated part of a package name, keeping the
/// separator and the scope marker (`@types/node` stays `@types/node`).
fn encode_scoped_path(name: &str) -> String {
    name.split('/')
        .map(|part| match part.strip_prefix('@') {
            Some(scope) => format!("@{}", urlencoding::encode(scope)),
            None => urlencoding::encode(part).into_owned(),
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_builds_from_defaults() {
        let client =
            UpstreamClient::new(&UpstreamConfig::default(), &RetryConfig::default()).unwrap();
        assert_eq!(client.registry_url, "https://registry.npmjs.org");
        assert_eq!(client.retry.max_attempts, 3);
    }

    #[test]
    fn trailing_slashes_are_trimmed() {
        let upstream = UpstreamConfig {
            registry_url: "http://localhost:4873/".into(),
            ..UpstreamConfig::default()
        };
        let client = UpstreamClient::new(&upstream, &RetryConfig::default()).unwrap();
        assert_eq!(client.registry_url, "http://localhost:4873");
    }

    #[test]
    fn names_are_path_encoded() {
        assert_eq!(encode_name("express"), "express");
        assert_eq!(encode_name("@types/node"), "%40types%2Fnode");
        assert_eq!(encode_scoped_path("@types/node"), "@types/node");
        assert_eq!(encode_scoped_path("a b"), "a%20b");
        assert_eq!(encode_scoped_path("lodash.merge"), "lodash.merge");
    }

    #[test]
    fn zero_attempts_still_tries_once() {
        let retry = RetryConfig {
            max_attempts: 0,
            ..RetryConfig::default()
        };
        let client = UpstreamClient::new(&UpstreamConfig::default(), &retry).unwrap();
        assert_eq!(client.retry.max_attempts, 1);
    }
}
