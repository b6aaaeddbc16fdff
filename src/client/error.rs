use thiserror::Error;
use unihttp_interface::client::InvalidProxy;
use validator::ValidationErrors;

/// The errors produced when a configuration value is rejected.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigurationError {
    /// An option has an invalid value.
    #[error("Invalid value for `{option}`: {reason}")]
    InvalidValue {
        /// The option name.
        option: &'static str,
        /// Why it was rejected.
        reason: String,
    },
    /// Field validation failed.
    #[error("Invalid configuration: {0}")]
    Validation(#[from] ValidationErrors),
    /// The settings could not be loaded from the environment.
    #[error("Invalid settings: {0}")]
    Settings(#[source] Box<figment::Error>),
}

impl ConfigurationError {
    pub(crate) fn invalid(option: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            option,
            reason: reason.into(),
        }
    }
}

impl From<figment::Error> for ConfigurationError {
    fn from(e: figment::Error) -> Self {
        Self::Settings(Box::new(e))
    }
}

impl From<InvalidProxy> for ConfigurationError {
    fn from(e: InvalidProxy) -> Self {
        Self::invalid("proxy", e.to_string())
    }
}
