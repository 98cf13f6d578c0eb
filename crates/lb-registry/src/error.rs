//! Upstream error types.

use thiserror::Error;

/// Errors that can occur when calling an upstream service.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// HTTP transport error (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream returned a non-success status code.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code returned by the service.
        status: u16,
        /// Error message or response body.
        message: String,
    },

    /// The upstream returned a 429 Too Many Requests response.
    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds to wait before retrying.
        retry_after_secs: u64,
    },

    /// A success response whose body is not the expected JSON.
    #[error("parse error: {0}")]
    Parse(String),

    /// Registry entry has no resolvable `latest` version block.
    #[error("no version information found for '{package}'")]
    NoVersionInfo { package: String },
}

impl RegistryError {
    /// Whether another attempt could plausibly succeed.
    ///
    /// Transport failures, 5xx and 429 are transient. Other 4xx, malformed
    /// bodies and missing version info will fail the same way again.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(e) => !e.is_builder(),
            Self::Api { status, .. } => *status >= 500,
            Self::RateLimited { .. } => true,
            Self::Parse(_) | Self::NoVersionInfo { .. } => false,
        }
    }

    /// Stable category label used in failure artifacts.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Http(_) => "transport",
            Self::Api { .. } | Self::RateLimited { .. } => "upstream_status",
            Self::Parse(_) => "parse",
            Self::NoVersionInfo { .. } => "no_version_info",
        }
    }
}
