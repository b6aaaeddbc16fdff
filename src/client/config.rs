use std::time::Duration;

use serde::{Deserialize, Serialize};
use unihttp_interface::client::{ClientOptions, ProxySettings, SslVerify};
use validator::{Validate, ValidationError};

use super::ConfigurationError;
use crate::check::ErrorChecking;
use crate::register::DependencyChain;
use crate::retry::RetryPolicy;
use crate::serde_util::option_duration_ms;
use crate::settings::Settings;

/// Everything an [`HttpClient`](crate::HttpClient) is configured with.
///
/// Durations (de)serialize as integer milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ClientConfig {
    /// Overrides the dependency chain of the [`Settings`].
    pub dependency_chain: Option<DependencyChain>,
    /// Explicit proxies.
    pub proxy: ProxySettings,
    /// Honour the environment's proxy variables when no explicit proxy applies.
    pub use_system_proxy: bool,
    /// Server certificate verification.
    pub ssl_verify: SslVerify,
    /// Retry policy for every request not opting out.
    #[validate(nested)]
    pub retry: RetryPolicy,
    /// Which statuses [`HttpClient::check_for_errors`](crate::HttpClient::check_for_errors)
    /// reports.
    #[validate(nested)]
    pub error_checking: ErrorChecking,
    /// Timeout of a whole request.
    #[serde(with = "option_duration_ms")]
    pub timeout: Option<Duration>,
    /// Timeout of connection establishment.
    #[serde(with = "option_duration_ms")]
    pub connect_timeout: Option<Duration>,
    /// Follow redirect responses.
    pub follow_redirects: bool,
    /// Upper bound on followed redirects. The backend's own default applies when unset.
    #[validate(range(max = 100))]
    pub max_redirects: Option<u32>,
    /// `User-Agent` sent with every request.
    #[validate(custom(function = "validate_user_agent"))]
    pub user_agent: Option<String>,
    /// Headers sent with every request unless the request sets them itself.
    #[validate(custom(function = "validate_headers"))]
    pub default_headers: Vec<(String, String)>,
    /// Largest accepted response body, in bytes.
    #[validate(range(min = 1))]
    pub max_response_size: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            dependency_chain: None,
            proxy: ProxySettings::none(),
            use_system_proxy: true,
            ssl_verify: SslVerify::Enabled,
            retry: RetryPolicy::default(),
            error_checking: ErrorChecking::default(),
            timeout: None,
            connect_timeout: None,
            follow_redirects: true,
            max_redirects: None,
            user_agent: None,
            default_headers: vec![],
            max_response_size: None,
        }
    }
}

impl ClientConfig {
    /// The default configuration with the retry policy derived from `settings`.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            retry: settings.default_retry(),
            ..Self::default()
        }
    }

    /// Check every value, including the ones field validation cannot express.
    pub fn verify(&self) -> Result<(), ConfigurationError> {
        self.validate()?;
        if let Some(path) = self.ssl_verify.ca_bundle() {
            if !path.is_file() {
                return Err(ConfigurationError::invalid(
                    "ssl_verify",
                    format!("CA bundle {} does not exist", path.display()),
                ));
            }
        }
        if self.timeout == Some(Duration::ZERO) {
            return Err(ConfigurationError::invalid("timeout", "must not be zero"));
        }
        if self.connect_timeout == Some(Duration::ZERO) {
            return Err(ConfigurationError::invalid("connect_timeout", "must not be zero"));
        }
        Ok(())
    }

    pub(crate) fn client_options(&self) -> ClientOptions {
        ClientOptions {
            user_agent: self.user_agent.clone(),
            default_headers: self.default_headers.clone(),
            proxy: self.proxy.clone(),
            use_default_proxy: self.use_system_proxy,
            ssl_verify: self.ssl_verify.clone(),
            follow_redirects: self.follow_redirects,
            max_redirects: self.max_redirects,
            max_response_buffer_size: self.max_response_size,
            request_timeout: self.timeout,
            connect_timeout: self.connect_timeout,
        }
    }
}

/// Whether `name` is an RFC 9110 token.
pub(crate) fn is_header_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b))
}

/// Whether `value` can be sent without breaking the header block.
pub(crate) fn is_header_value(value: &str) -> bool {
    !value.bytes().any(|b| b == b'\r' || b == b'\n' || b == 0)
}

fn validate_headers(headers: &[(String, String)]) -> Result<(), ValidationError> {
    for (name, value) in headers {
        if !is_header_name(name) {
            return Err(ValidationError::new("invalid_header_name")
                .with_message(format!("{name:?} is not a valid header name").into()));
        }
        if !is_header_value(value) {
            return Err(ValidationError::new("invalid_header_value")
                .with_message(format!("value of {name} contains a line break").into()));
        }
    }
    Ok(())
}

fn validate_user_agent(user_agent: &str) -> Result<(), ValidationError> {
    if is_header_value(user_agent) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_header_value"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(ClientConfig::default().verify().is_ok());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let config = ClientConfig {
            retry: RetryPolicy {
                max_attempts: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(
            config.verify(),
            Err(ConfigurationError::Validation(_))
        ));

        let config = ClientConfig {
            default_headers: vec![("Bad Header".into(), "x".into())],
            ..Default::default()
        };
        assert!(config.verify().is_err());

        let config = ClientConfig {
            user_agent: Some("agent\r\nInjected: 1".into()),
            ..Default::default()
        };
        assert!(config.verify().is_err());

        let config = ClientConfig {
            timeout: Some(Duration::ZERO),
            ..Default::default()
        };
        assert!(matches!(
            config.verify(),
            Err(ConfigurationError::InvalidValue {
                option: "timeout",
                ..
            })
        ));
    }

    #[test]
    fn test_missing_ca_bundle_is_rejected() {
        let config = ClientConfig {
            ssl_verify: SslVerify::CaBundle("/nonexistent/unihttp/ca.pem".into()),
            ..Default::default()
        };
        assert!(matches!(
            config.verify(),
            Err(ConfigurationError::InvalidValue {
                option: "ssl_verify",
                ..
            })
        ));
    }

    #[test]
    fn test_deserialize_config() {
        let config: ClientConfig = serde_json::from_value(serde_json::json!({
            "dependency_chain": "ureq, curl",
            "proxy": "user:secret@proxy.local:3128",
            "ssl_verify": false,
            "timeout": 1500,
            "retry": { "max_attempts": 3, "strategy": "fibonacci" },
            "error_checking": { "status_mapping": { "404": "success" } }
        }))
        .unwrap();
        assert_eq!(
            config.dependency_chain.unwrap().to_string(),
            "ureq, curl"
        );
        let proxy = config.proxy.shared().unwrap();
        assert_eq!(proxy.url().host_str(), Some("proxy.local"));
        assert_eq!(proxy.credentials().unwrap().username, "user");
        assert_eq!(config.ssl_verify, SslVerify::Disabled);
        assert_eq!(config.timeout, Some(Duration::from_millis(1500)));
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.base_delay, RetryPolicy::default().base_delay);
        assert!(!config
            .error_checking
            .is_error(crate::StatusCode::new(404)));
        assert!(config.follow_redirects);
    }

    #[test]
    fn test_client_options_carry_transport_settings() {
        let config = ClientConfig {
            use_system_proxy: false,
            max_response_size: Some(1024),
            timeout: Some(Duration::from_secs(5)),
            ..Default::default()
        };
        let options = config.client_options();
        assert!(!options.use_default_proxy);
        assert_eq!(options.max_response_buffer_size, Some(1024));
        assert_eq!(options.request_timeout, Some(Duration::from_secs(5)));
    }
}
