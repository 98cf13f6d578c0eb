use thiserror::Error;

/// Failures while loading or validating [`crate::LbConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A layer could not be read or a value could not be deserialized.
    #[error("failed to load configuration: {0}")]
    Figment(#[from] figment::Error),

    /// A value was read but is out of range.
    #[error("{field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}
