//! One blocking HTTP client interface over several Rust HTTP libraries.
//!
//! ## Overview
//!
//! unihttp does not implement HTTP itself. It wraps existing client libraries behind a single
//! request/response interface and picks one of them at runtime, so that code written against
//! [`HttpClient`] runs unchanged whichever library is available. On top of the wrapped
//! library it normalizes
//!
//! - proxy settings and proxy credentials
//! - TLS verification (system roots, custom CA bundle, or disabled)
//! - timeouts and redirect policy
//! - retries with backoff
//! - status code error checking
//!
//! ## Backends and the dependency chain
//!
//! Each wrapped library is an adapter crate enabled by a Cargo feature:
//!
//! - `reqwest` (default): [`unihttp-backend-reqwest`], driven by a managed tokio runtime
//! - `curl`: [`unihttp-backend-curl`], over libcurl
//! - `ureq` (default): [`unihttp-backend-ureq`], pure Rust
//!
//! A client walks a [`DependencyChain`] in order and binds the first adapter that is compiled
//! in and reports itself usable. The chain comes from, by precedence, the client's
//! [`ClientConfig::dependency_chain`], the `HTTP_DEPENDENCY_CHAIN` environment variable read
//! by [`Settings::from_env`], and finally the built-in order `reqwest, curl, ureq`.
//!
//! ## Usage
//!
//! ```no_run
//! use unihttp::{body_form, HttpClient, Request};
//!
//! let client = HttpClient::builder().user_agent("my-app/1.0").build()?;
//! let (response, status) = client.request(
//!     Request::get("https://httpbin.org/get").with_query("q", "rust"),
//! )?;
//! println!("{status}: {}", response.text());
//!
//! let req = Request::post("https://httpbin.org/post")
//!     .with_body(body_form! {
//!         "key1" => "value1",
//!         "key2" => "value2",
//!     })
//!     .check_for_errors(true);
//! let (response, _) = client.request(req)?;
//! let echoed: serde_json::Value = response.json()?;
//! # let _ = echoed;
//! # Ok::<(), unihttp::Error>(())
//! ```
//!
//! Unsuccessful statuses are returned as data. Set [`Request::check_for_errors`] to turn them
//! into [`Error::ClientError`] or [`Error::ServerError`], or call
//! [`HttpClient::check_for_errors`] on the response later.
//!
//! For code that does not need its own configuration, [`default_http_client`] returns a
//! process-wide client configured from the environment.
//!
//! [`unihttp-backend-reqwest`]: https://docs.rs/unihttp-backend-reqwest
//! [`unihttp-backend-curl`]: https://docs.rs/unihttp-backend-curl
//! [`unihttp-backend-ureq`]: https://docs.rs/unihttp-backend-ureq

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]

mod body;
mod check;
pub mod client;
mod error;
pub mod register;
mod request;
mod response;
pub mod retry;
mod serde_util;
pub mod settings;
mod status;
#[cfg(test)]
mod testing;

use once_cell::sync::OnceCell;

pub use body::Body;
pub use check::{check_for_errors, ErrorCategory, ErrorChecking, EXCERPT_CHARS};
#[doc(inline)]
pub use client::{ClientBuilder, ClientConfig, ConfigurationError, HttpClient};
pub use error::{Error, Result};
pub use register::{DependencyChain, Registry};
pub use request::Request;
pub use response::HttpResponse;
pub use retry::{Backoff, RetryPolicy};
pub use settings::Settings;
pub use status::StatusCode;
pub use unihttp_interface::{BackendId, Method};

/// Build an `application/x-www-form-urlencoded` [`Body`] from `key => value` pairs.
#[macro_export]
macro_rules! body_form {
    ($($key:expr => $value:expr),* $(,)?) => {{
        let fields: ::std::vec::Vec<(
            ::std::borrow::Cow<'static, str>,
            ::std::borrow::Cow<'static, str>,
        )> = ::std::vec![$((
            ::std::convert::Into::into($key),
            ::std::convert::Into::into($value),
        )),*];
        $crate::Body::form(fields)
    }};
}

static DEFAULT_CLIENT: OnceCell<HttpClient> = OnceCell::new();

/// The process-wide client.
///
/// It is created on first use from [`Settings::from_env`] over the adapters compiled into
/// this build. A failure is returned to the caller and creation is tried again on the next
/// call.
pub fn default_http_client() -> Result<&'static HttpClient> {
    DEFAULT_CLIENT.get_or_try_init(|| {
        let client = HttpClient::from_env()?;
        tracing::info!(
            backend = %client.backend(),
            chain = %client.dependency_chain(),
            "default HTTP client bound"
        );
        Ok(client)
    })
}
