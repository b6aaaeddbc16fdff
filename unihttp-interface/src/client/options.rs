//! Configuration options for HTTP clients.

use std::time::Duration;

use super::{ProxySettings, SslVerify};

/// Redirect limit applied when following redirects without an explicit maximum.
pub const DEFAULT_MAX_REDIRECTS: u32 = 10;

/// Transport options for creating a backend client.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Optional User-Agent header value to use for all requests.
    pub user_agent: Option<String>,
    /// Headers to include in all requests by default.
    pub default_headers: Vec<(String, String)>,
    /// Explicit proxies. Schemes without an entry connect directly, or through the
    /// environment's proxy when `use_default_proxy` is set.
    pub proxy: ProxySettings,
    /// Whether to use the proxy settings of the environment when no explicit proxy applies.
    pub use_default_proxy: bool,
    /// How server certificates are verified.
    pub ssl_verify: SslVerify,
    /// Whether to automatically follow redirect responses.
    pub follow_redirects: bool,
    /// Maximum number of redirects to follow, when following redirects.
    pub max_redirects: Option<u32>,
    /// Optional maximum buffer size for response bodies.
    pub max_response_buffer_size: Option<u64>,
    /// Optional timeout for a whole request, including reading the body.
    pub request_timeout: Option<Duration>,
    /// Optional timeout for establishing a connection.
    pub connect_timeout: Option<Duration>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            user_agent: None,
            default_headers: vec![],
            proxy: ProxySettings::default(),
            use_default_proxy: true,
            ssl_verify: SslVerify::default(),
            follow_redirects: true,
            max_redirects: None,
            max_response_buffer_size: None,
            request_timeout: None,
            connect_timeout: None,
        }
    }
}

impl ClientOptions {
    /// The default headers that are not overridden by `request_headers`.
    pub fn default_headers_except<'a>(
        &'a self,
        request_headers: &'a [(impl AsRef<str>, impl AsRef<str>)],
    ) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        self.default_headers
            .iter()
            .filter(move |(name, _)| {
                !request_headers
                    .iter()
                    .any(|(n, _)| n.as_ref().eq_ignore_ascii_case(name))
            })
            .map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// How many redirects to follow, or `None` when redirect responses are returned as is.
    pub fn redirect_limit(&self) -> Option<u32> {
        self.follow_redirects
            .then(|| self.max_redirects.unwrap_or(DEFAULT_MAX_REDIRECTS))
    }

    /// Whether the environment's proxy variables may be consulted.
    ///
    /// Any explicit proxy turns the environment lookup off for every scheme.
    pub fn uses_environment_proxy(&self) -> bool {
        self.use_default_proxy && self.proxy.is_empty()
    }
}
