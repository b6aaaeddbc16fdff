//! HTTP client configuration handed to backends.
//!
//! This module provides the transport options a backend has to translate into its
//! library's configuration, and the errors it may report while doing so.

mod error;
mod options;
mod proxy;
mod tls;

pub use error::{BuildClientError, BuildClientResult};
pub use options::{ClientOptions, DEFAULT_MAX_REDIRECTS};
pub use proxy::{Credentials, InvalidProxy, Proxy, ProxySettings};
pub use tls::SslVerify;
