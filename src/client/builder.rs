use std::time::Duration;

use unihttp_interface::client::{Proxy, ProxySettings, SslVerify};

use super::{ClientConfig, HttpClient};
use crate::check::ErrorChecking;
use crate::register::{DependencyChain, Registry};
use crate::retry::RetryPolicy;
use crate::settings::Settings;

/// Builds an [`HttpClient`] from a [`ClientConfig`].
#[derive(Debug, Clone, Default)]
pub struct ClientBuilder {
    pub(crate) config: ClientConfig,
}

impl ClientBuilder {
    /// Start from an existing configuration.
    pub fn from_config(config: ClientConfig) -> Self {
        Self { config }
    }

    /// Backends to try, highest priority first.
    pub fn dependency_chain(mut self, chain: DependencyChain) -> Self {
        self.config.dependency_chain = Some(chain);
        self
    }

    /// Route every request through `proxy`.
    pub fn proxy(mut self, proxy: Proxy) -> Self {
        self.config.proxy = ProxySettings::all(proxy);
        self
    }

    /// Per-scheme proxies.
    pub fn proxies(mut self, proxies: ProxySettings) -> Self {
        self.config.proxy = proxies;
        self
    }

    /// Ignore the environment's proxy variables.
    pub fn no_system_proxy(mut self) -> Self {
        self.config.use_system_proxy = false;
        self
    }

    /// Certificate verification mode. `false` disables verification.
    pub fn ssl_verify(mut self, verify: impl Into<SslVerify>) -> Self {
        self.config.ssl_verify = verify.into();
        self
    }

    /// Retry policy.
    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.config.retry = retry;
        self
    }

    /// Error checking categories and mapping.
    pub fn error_checking(mut self, error_checking: ErrorChecking) -> Self {
        self.config.error_checking = error_checking;
        self
    }

    /// Timeout of a whole request.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    /// Timeout of connection establishment.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = Some(timeout);
        self
    }

    /// Return redirect responses instead of following them.
    pub fn no_redirects(mut self) -> Self {
        self.config.follow_redirects = false;
        self
    }

    /// Follow at most `max` redirects.
    pub fn max_redirects(mut self, max: u32) -> Self {
        self.config.max_redirects = Some(max);
        self
    }

    /// `User-Agent` header value.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = Some(user_agent.into());
        self
    }

    /// Add a header sent with every request.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config
            .default_headers
            .push((name.into(), value.into()));
        self
    }

    /// Largest accepted response body, in bytes.
    pub fn max_response_size(mut self, size: u64) -> Self {
        self.config.max_response_size = Some(size);
        self
    }

    /// The configuration built so far.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Create the client over the adapters compiled into this build.
    pub fn build(self) -> crate::Result<HttpClient> {
        HttpClient::new(self.config)
    }

    /// Create the client with explicit settings and registry.
    pub fn build_with(self, settings: Settings, registry: Registry) -> crate::Result<HttpClient> {
        HttpClient::with_registry(self.config, settings, registry)
    }
}
