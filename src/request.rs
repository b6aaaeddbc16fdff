use std::borrow::Cow;
use std::time::Duration;

use unihttp_interface::client::{Proxy, ProxySettings, SslVerify};
use unihttp_interface::{Method, Request as RequestImpl};

use crate::body::Body;

/// A request to send with [`HttpClient::request`](crate::HttpClient::request).
#[derive(Debug, Clone)]
pub struct Request {
    pub(crate) inner: RequestImpl,
    pub(crate) check_for_errors: bool,
    pub(crate) disable_retries: bool,
    pub(crate) max_retries: Option<u32>,
    pub(crate) ssl_verify: Option<SslVerify>,
    pub(crate) proxy: Option<ProxySettings>,
}

impl Request {
    /// A request with the given method to an absolute `http` or `https` URL.
    pub fn new(method: Method, url: impl Into<Cow<'static, str>>) -> Self {
        Self {
            inner: RequestImpl {
                method,
                url: url.into(),
                parameters: vec![],
                headers: vec![],
                body: None,
                timeout: None,
            },
            check_for_errors: false,
            disable_retries: false,
            max_retries: None,
            ssl_verify: None,
            proxy: None,
        }
    }

    /// Like [`Request::new`], with the method given by name (case-insensitive).
    pub fn with_method_name(
        method: &str,
        url: impl Into<Cow<'static, str>>,
    ) -> crate::Result<Self> {
        let method = method
            .parse()
            .map_err(|e: unihttp_interface::Error| crate::Error::InvalidRequest(e.to_string()))?;
        Ok(Self::new(method, url))
    }

    /// A `GET` request.
    pub fn get(url: impl Into<Cow<'static, str>>) -> Self {
        Self::new(Method::Get, url)
    }

    /// A `HEAD` request.
    pub fn head(url: impl Into<Cow<'static, str>>) -> Self {
        Self::new(Method::Head, url)
    }

    /// An `OPTIONS` request.
    pub fn options(url: impl Into<Cow<'static, str>>) -> Self {
        Self::new(Method::Options, url)
    }

    /// A `POST` request.
    pub fn post(url: impl Into<Cow<'static, str>>) -> Self {
        Self::new(Method::Post, url)
    }

    /// A `PUT` request.
    pub fn put(url: impl Into<Cow<'static, str>>) -> Self {
        Self::new(Method::Put, url)
    }

    /// A `PATCH` request.
    pub fn patch(url: impl Into<Cow<'static, str>>) -> Self {
        Self::new(Method::Patch, url)
    }

    /// A `DELETE` request.
    pub fn delete(url: impl Into<Cow<'static, str>>) -> Self {
        Self::new(Method::Delete, url)
    }

    /// The request method.
    pub fn method(&self) -> Method {
        self.inner.method
    }

    /// The request URL, without the query parameters added through [`Request::with_query`].
    pub fn url(&self) -> &str {
        &self.inner.url
    }

    /// Append a query parameter.
    pub fn with_query(
        mut self,
        name: impl Into<Cow<'static, str>>,
        value: impl Into<Cow<'static, str>>,
    ) -> Self {
        self.inner.parameters.push((name.into(), value.into()));
        self
    }

    /// Add a header. Headers set here take precedence over the client's default headers.
    pub fn with_header(
        mut self,
        name: impl Into<Cow<'static, str>>,
        value: impl Into<Cow<'static, str>>,
    ) -> Self {
        self.inner.headers.push((name.into(), value.into()));
        self
    }

    /// Set the body.
    pub fn with_body(mut self, body: Body) -> Self {
        self.inner.body = Some(body.inner);
        self
    }

    /// Override the client's request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.inner.timeout = Some(timeout);
        self
    }

    /// Fail with a status error when the response status is classified as an error.
    pub fn check_for_errors(mut self, check: bool) -> Self {
        self.check_for_errors = check;
        self
    }

    /// Make a single attempt regardless of the client's retry policy.
    pub fn disable_retries(mut self, disable: bool) -> Self {
        self.disable_retries = disable;
        self
    }

    /// Override how many times the request is retried after the first attempt. The rest of
    /// the client's retry policy still applies.
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = Some(retries);
        self
    }

    /// Override the client's certificate verification for this request.
    pub fn with_ssl_verify(mut self, verify: impl Into<SslVerify>) -> Self {
        self.ssl_verify = Some(verify.into());
        self
    }

    /// Send this request through `proxy`, whatever the client's proxies are.
    pub fn with_proxy(self, proxy: Proxy) -> Self {
        self.with_proxies(ProxySettings::all(proxy))
    }

    /// Override the client's per-scheme proxies for this request.
    pub fn with_proxies(mut self, proxies: ProxySettings) -> Self {
        self.proxy = Some(proxies);
        self
    }

    /// Whether the request changes transport options the backend client is built with.
    pub(crate) fn overrides_transport(&self) -> bool {
        self.ssl_verify.is_some() || self.proxy.is_some()
    }
}
