//! The [`HttpClient`] facade.

mod builder;
mod config;
mod error;

use std::borrow::Cow;
use std::fmt::{self, Debug};
use std::sync::{Arc, PoisonError, RwLock};

use unihttp_interface::blocking::{AnyBlockingBackend, AnyBlockingClient};
use unihttp_interface::BackendId;

pub use builder::ClientBuilder;
pub use config::ClientConfig;
pub(crate) use config::{is_header_name, is_header_value};
pub use error::ConfigurationError;
#[doc(no_inline)]
pub use unihttp_interface::client::{
    BuildClientError, Credentials, InvalidProxy, Proxy, ProxySettings, SslVerify,
};

use crate::register::{DependencyChain, Registry};
use crate::response::HttpResponse;
use crate::retry::{self, RetryPolicy};
use crate::settings::Settings;
use crate::{Error, Request, StatusCode};

/// A blocking HTTP client bound to one backend.
///
/// The backend is picked when the client is created, by walking the dependency chain and
/// taking the first backend that is compiled in and usable. It only changes when
/// [`HttpClient::configure`] is given a different chain.
///
/// # Thread safety
///
/// The client can be shared between threads. Every request works on a snapshot of the
/// configuration taken when it starts, so a concurrent `configure` never affects a request
/// in flight.
pub struct HttpClient {
    registry: Registry,
    settings: Settings,
    state: RwLock<Arc<Bound>>,
}

struct Bound {
    config: ClientConfig,
    chain: DependencyChain,
    backend: Arc<dyn AnyBlockingBackend>,
    client: Arc<dyn AnyBlockingClient>,
}

impl Bound {
    fn new(
        registry: &Registry,
        settings: &Settings,
        config: ClientConfig,
        current: Option<&Bound>,
    ) -> crate::Result<Self> {
        config.verify()?;
        let chain = config
            .dependency_chain
            .clone()
            .unwrap_or_else(|| settings.dependency_chain());
        let backend = match current {
            Some(current) if current.chain == chain => Arc::clone(&current.backend),
            _ => registry.resolve(&chain)?,
        };
        let id = backend.id();
        if !config.ssl_verify.is_enabled() {
            tracing::warn!(backend = %id, "TLS certificate verification is disabled");
        }
        let client = backend
            .create_blocking_client(config.client_options())
            .map_err(|source| Error::BuildClient { backend: id, source })?;
        Ok(Self {
            config,
            chain,
            backend,
            client,
        })
    }

    /// The bound client, or a client built for the request's transport overrides.
    fn client_for(&self, req: &Request) -> crate::Result<Arc<dyn AnyBlockingClient>> {
        if !req.overrides_transport() {
            return Ok(Arc::clone(&self.client));
        }
        let mut config = self.config.clone();
        if let Some(ssl_verify) = &req.ssl_verify {
            config.ssl_verify = ssl_verify.clone();
        }
        if let Some(proxy) = &req.proxy {
            config.proxy = proxy.clone();
        }
        let backend = self.backend.id();
        if !config.ssl_verify.is_enabled() {
            tracing::warn!(%backend, "TLS certificate verification is disabled for a request");
        }
        self.backend
            .create_blocking_client(config.client_options())
            .map_err(|source| Error::BuildClient { backend, source })
    }
}

impl HttpClient {
    /// Create a client over the adapters compiled into this build, with default settings.
    pub fn new(config: ClientConfig) -> crate::Result<Self> {
        Self::with_registry(config, Settings::default(), Registry::builtin())
    }

    /// Create a client configured from the environment, see [`Settings::from_env`].
    pub fn from_env() -> crate::Result<Self> {
        let settings = Settings::from_env()?;
        Self::with_registry(
            ClientConfig::from_settings(&settings),
            settings,
            Registry::builtin(),
        )
    }

    /// Create a client choosing among the backends of `registry`.
    pub fn with_registry(
        config: ClientConfig,
        settings: Settings,
        registry: Registry,
    ) -> crate::Result<Self> {
        let bound = Bound::new(&registry, &settings, config, None)?;
        Ok(Self {
            registry,
            settings,
            state: RwLock::new(Arc::new(bound)),
        })
    }

    /// Start building a client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    fn snapshot(&self) -> Arc<Bound> {
        Arc::clone(&self.state.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Replace the configuration.
    ///
    /// The backend is resolved again only if the effective dependency chain changed. On
    /// failure the client keeps its previous configuration and backend.
    pub fn configure(&self, config: ClientConfig) -> crate::Result<()> {
        let current = self.snapshot();
        let bound = Bound::new(&self.registry, &self.settings, config, Some(&current))?;
        if bound.backend.id() != current.backend.id() {
            tracing::debug!(
                from = %current.backend.id(),
                to = %bound.backend.id(),
                "rebound backend"
            );
        }
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(bound);
        Ok(())
    }

    /// The current configuration.
    pub fn config(&self) -> ClientConfig {
        self.snapshot().config.clone()
    }

    /// The backend requests are sent with.
    pub fn backend(&self) -> BackendId {
        self.snapshot().backend.id()
    }

    /// The effective dependency chain the backend was resolved from.
    pub fn dependency_chain(&self) -> DependencyChain {
        self.snapshot().chain.clone()
    }

    /// Send a request and return the response with its status.
    ///
    /// The configured retry policy applies unless the request disables retries or sets its
    /// own retry count. A request overriding certificate verification or proxies is sent on
    /// a client built for it. Response statuses only fail the call when the request asks for
    /// error checking.
    pub fn request(&self, req: Request) -> crate::Result<(HttpResponse, StatusCode)> {
        let bound = self.snapshot();
        let client = bound.client_for(&req)?;
        let Request {
            inner,
            check_for_errors,
            disable_retries,
            max_retries,
            ..
        } = req;

        let url = inner
            .url_with_query()
            .map_err(|e| Error::InvalidRequest(e.to_string()))?;
        if let Some((name, _)) = inner
            .headers
            .iter()
            .find(|(name, value)| !is_header_name(name) || !is_header_value(value))
        {
            return Err(Error::InvalidRequest(format!("invalid header {name:?}")));
        }

        let backend = bound.backend.id();
        tracing::trace!(method = %inner.method, %url, %backend, "sending request");
        let policy = match (disable_retries, max_retries) {
            (true, _) => Cow::Owned(RetryPolicy::disabled()),
            (false, Some(retries)) => Cow::Owned(RetryPolicy {
                max_attempts: retries.saturating_add(1),
                ..bound.config.retry.clone()
            }),
            (false, None) => Cow::Borrowed(&bound.config.retry),
        };
        let response = retry::run(&policy, url.as_str(), || {
            client
                .request(inner.clone())
                .and_then(HttpResponse::from_backend)
                .map_err(|source| Error::Transport { backend, source })
        })?;

        let status = response.status();
        if check_for_errors {
            bound.config.error_checking.check(&response, status, true)?;
        }
        Ok((response, status))
    }

    /// Inspect a response status with this client's error checking configuration.
    ///
    /// See [`ErrorChecking::check`](crate::ErrorChecking::check).
    pub fn check_for_errors(
        &self,
        response: &HttpResponse,
        status: StatusCode,
        raise: bool,
    ) -> crate::Result<(StatusCode, Option<String>)> {
        self.snapshot()
            .config
            .error_checking
            .check(response, status, raise)
    }
}

struct ClientDebug<'a> {
    inner: &'a dyn AnyBlockingClient,
}
impl Debug for ClientDebug<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inner.describe(f)
    }
}

impl Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bound = self.snapshot();
        f.debug_struct("HttpClient")
            .field("backend", &bound.backend.id())
            .field("chain", &bound.chain)
            .field(
                "client",
                &ClientDebug {
                    inner: &*bound.client,
                },
            )
            .finish_non_exhaustive()
    }
}
