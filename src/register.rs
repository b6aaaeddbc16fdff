//! Backend registry and dependency chain resolution.

use std::collections::BTreeMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use unihttp_interface::blocking::AnyBlockingBackend;
use unihttp_interface::BackendId;

use crate::client::ConfigurationError;

/// Backends in priority order. Never empty, never contains duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "ChainRepr", into = "Vec<BackendId>")]
pub struct DependencyChain(Vec<BackendId>);

#[derive(Deserialize)]
#[serde(untagged)]
enum ChainRepr {
    Joined(String),
    List(Vec<String>),
}

impl DependencyChain {
    /// Create a chain, dropping repeated entries.
    pub fn new(ids: impl IntoIterator<Item = BackendId>) -> Result<Self, ConfigurationError> {
        let mut chain = Vec::new();
        for id in ids {
            if !chain.contains(&id) {
                chain.push(id);
            }
        }
        if chain.is_empty() {
            return Err(ConfigurationError::invalid(
                "dependency_chain",
                "at least one backend is required",
            ));
        }
        Ok(Self(chain))
    }

    /// `reqwest, curl, ureq`.
    pub fn builtin() -> Self {
        Self(BackendId::ALL.to_vec())
    }

    /// The backends, highest priority first.
    pub fn as_slice(&self) -> &[BackendId] {
        &self.0
    }

    /// Iterate over the backends, highest priority first.
    pub fn iter(&self) -> impl Iterator<Item = BackendId> + '_ {
        self.0.iter().copied()
    }

    fn parse_names<'a>(
        names: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self, ConfigurationError> {
        let ids = names
            .into_iter()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(|name| {
                name.parse::<BackendId>()
                    .map_err(|e| ConfigurationError::invalid("dependency_chain", e.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(ids)
    }
}

impl Default for DependencyChain {
    fn default() -> Self {
        Self::builtin()
    }
}

impl FromStr for DependencyChain {
    type Err = ConfigurationError;

    /// Parse a comma and/or whitespace separated list of backend names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let s = s
            .strip_prefix('[')
            .and_then(|s| s.strip_suffix(']'))
            .unwrap_or(s);
        Self::parse_names(s.split(|c: char| c == ',' || c.is_whitespace()))
    }
}

impl TryFrom<ChainRepr> for DependencyChain {
    type Error = ConfigurationError;

    fn try_from(repr: ChainRepr) -> Result<Self, Self::Error> {
        match repr {
            ChainRepr::Joined(s) => s.parse(),
            ChainRepr::List(names) => Self::parse_names(names.iter().map(String::as_str)),
        }
    }
}

impl From<DependencyChain> for Vec<BackendId> {
    fn from(chain: DependencyChain) -> Self {
        chain.0
    }
}

impl fmt::Display for DependencyChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, id) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            fmt::Display::fmt(id, f)?;
        }
        Ok(())
    }
}

/// Backends known to a client, keyed by their identifier.
#[derive(Clone, Default)]
pub struct Registry {
    backends: BTreeMap<BackendId, Arc<dyn AnyBlockingBackend>>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The adapters compiled into this build.
    pub fn builtin() -> Self {
        #[allow(unused_mut)]
        let mut registry = Self::new();
        #[cfg(feature = "curl")]
        registry.register(unihttp_backend_curl::CurlBackend);
        #[cfg(feature = "reqwest")]
        registry.register(unihttp_backend_reqwest::ReqwestBackend);
        #[cfg(feature = "ureq")]
        registry.register(unihttp_backend_ureq::UreqBackend);
        registry
    }

    /// Add `backend` under its own identifier, replacing any backend with the same id.
    pub fn register(&mut self, backend: impl AnyBlockingBackend) -> &mut Self {
        self.backends.insert(backend.id(), Arc::new(backend));
        self
    }

    /// Builder style [`Registry::register`].
    pub fn with(mut self, backend: impl AnyBlockingBackend) -> Self {
        self.register(backend);
        self
    }

    /// Whether a backend is registered under `id`.
    pub fn contains(&self, id: BackendId) -> bool {
        self.backends.contains_key(&id)
    }

    /// Registered identifiers.
    pub fn ids(&self) -> impl Iterator<Item = BackendId> + '_ {
        self.backends.keys().copied()
    }

    /// Walk `chain` in order and return the first registered backend whose probe reports it
    /// usable. A probe that panics counts as unavailable.
    pub fn resolve(&self, chain: &DependencyChain) -> crate::Result<Arc<dyn AnyBlockingBackend>> {
        for id in chain.iter() {
            let Some(backend) = self.backends.get(&id) else {
                tracing::debug!(backend = %id, "backend not compiled in, skipping");
                continue;
            };
            if probe(&**backend) {
                tracing::debug!(backend = %id, chain = %chain, "resolved backend");
                return Ok(Arc::clone(backend));
            }
        }
        Err(crate::Error::NoAvailableBackend {
            chain: chain.clone(),
        })
    }
}

fn probe(backend: &dyn AnyBlockingBackend) -> bool {
    match panic::catch_unwind(AssertUnwindSafe(|| backend.is_available())) {
        Ok(available) => {
            tracing::debug!(backend = %backend.id(), available, "probed backend");
            available
        }
        Err(_) => {
            tracing::debug!(
                backend = %backend.id(),
                "backend probe panicked, treating as unavailable"
            );
            false
        }
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.backends.keys()).finish()
    }
}
