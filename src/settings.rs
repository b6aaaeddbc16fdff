//! Process-wide settings read from the environment.
//!
//! Settings are loaded once, explicitly, through [`Settings::from_env`]. Nothing else in the
//! crate reads environment variables.

use std::time::Duration;

use figment::providers::{Env, Serialized};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::client::ConfigurationError;
use crate::register::DependencyChain;
use crate::retry::RetryPolicy;

/// Environment variable holding the dependency chain, e.g. `curl,ureq`.
pub const DEPENDENCY_CHAIN_VAR: &str = "HTTP_DEPENDENCY_CHAIN";
/// Environment variable holding the number of retries after the first attempt.
pub const BACKOFF_TRIES_VAR: &str = "BACKOFF_DEFAULT_TRIES";
/// Environment variable holding the total retry budget, in seconds.
pub const BACKOFF_DELAY_VAR: &str = "BACKOFF_DEFAULT_DELAY";

/// Settings shared by every client of the process.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Backend priority used by clients without an explicit chain.
    #[serde(rename = "http_dependency_chain", skip_serializing_if = "Option::is_none")]
    pub dependency_chain: Option<DependencyChain>,
    /// Retries after the first attempt. Retries stay off while this or the budget is unset
    /// or `0`.
    #[serde(rename = "backoff_default_tries", skip_serializing_if = "Option::is_none")]
    pub backoff_tries: Option<u32>,
    /// Total retry budget in seconds. `0` disables retries.
    #[serde(rename = "backoff_default_delay", skip_serializing_if = "Option::is_none")]
    pub backoff_delay_secs: Option<u64>,
}

impl Settings {
    /// Defaults merged with the recognized environment variables.
    pub fn figment() -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Env::raw().only(&[DEPENDENCY_CHAIN_VAR, BACKOFF_TRIES_VAR, BACKOFF_DELAY_VAR]))
    }

    /// Load the settings from the environment.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        let settings: Settings = Self::figment().extract()?;
        tracing::debug!(?settings, "loaded settings");
        Ok(settings)
    }

    /// The configured dependency chain, or the built-in `reqwest, curl, ureq`.
    pub fn dependency_chain(&self) -> DependencyChain {
        self.dependency_chain
            .clone()
            .unwrap_or_else(DependencyChain::builtin)
    }

    /// The retry policy clients start with.
    ///
    /// Retries are enabled only when both the number of tries and the retry budget are set
    /// and non-zero.
    pub fn default_retry(&self) -> RetryPolicy {
        match (self.backoff_tries, self.backoff_delay_secs) {
            (Some(tries), Some(delay)) if tries > 0 && delay > 0 => RetryPolicy {
                max_attempts: tries.saturating_add(1),
                max_elapsed: Some(Duration::from_secs(delay)),
                ..RetryPolicy::default()
            },
            _ => RetryPolicy::disabled(),
        }
    }
}

#[cfg(test)]
mod tests {
    use figment::Jail;
    use unihttp_interface::BackendId;

    use super::*;

    #[test]
    fn test_empty_environment() {
        Jail::expect_with(|_| {
            let settings = Settings::from_env().unwrap();
            assert_eq!(settings, Settings::default());
            assert_eq!(settings.dependency_chain(), DependencyChain::builtin());
            assert!(!settings.default_retry().is_enabled());
            Ok(())
        });
    }

    #[test]
    fn test_reads_recognized_variables() {
        Jail::expect_with(|jail| {
            jail.set_env(DEPENDENCY_CHAIN_VAR, "ureq, curl");
            jail.set_env(BACKOFF_TRIES_VAR, "3");
            jail.set_env(BACKOFF_DELAY_VAR, "20");
            let settings = Settings::from_env().unwrap();
            assert_eq!(
                settings.dependency_chain().as_slice(),
                [BackendId::Ureq, BackendId::Curl]
            );
            let retry = settings.default_retry();
            assert_eq!(retry.max_attempts, 4);
            assert_eq!(retry.max_elapsed, Some(Duration::from_secs(20)));
            Ok(())
        });
    }

    #[test]
    fn test_zero_disables_retries() {
        Jail::expect_with(|jail| {
            jail.set_env(BACKOFF_TRIES_VAR, "5");
            jail.set_env(BACKOFF_DELAY_VAR, "0");
            let settings = Settings::from_env().unwrap();
            assert_eq!(settings.default_retry().max_attempts, 1);
            Ok(())
        });
    }

    #[test]
    fn test_tries_without_budget_keep_retries_disabled() {
        Jail::expect_with(|jail| {
            jail.set_env(BACKOFF_TRIES_VAR, "3");
            let settings = Settings::from_env().unwrap();
            assert_eq!(settings.backoff_tries, Some(3));
            assert!(!settings.default_retry().is_enabled());
            Ok(())
        });
        Jail::expect_with(|jail| {
            jail.set_env(BACKOFF_DELAY_VAR, "30");
            let settings = Settings::from_env().unwrap();
            assert!(!settings.default_retry().is_enabled());
            Ok(())
        });
    }

    #[test]
    fn test_invalid_values_are_configuration_errors() {
        Jail::expect_with(|jail| {
            jail.set_env(DEPENDENCY_CHAIN_VAR, "curl, hyper");
            assert!(matches!(
                Settings::from_env(),
                Err(ConfigurationError::Settings(_))
            ));
            Ok(())
        });
        Jail::expect_with(|jail| {
            jail.set_env(BACKOFF_TRIES_VAR, "many");
            assert!(Settings::from_env().is_err());
            Ok(())
        });
    }
}
