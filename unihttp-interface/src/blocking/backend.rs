//! Core blocking client interface traits.
//!
//! This module provides the core trait definitions that backend adapters must implement to
//! provide blocking HTTP functionality.
//!
//! Backend developers need to implement the `BlockingBackend` and `BlockingClient` traits,
//! along with a custom `BlockingResponse` type.

use std::fmt;

use crate::client::{BuildClientResult, ClientOptions};
use crate::{BackendId, Request};

/// Trait for blocking HTTP clients.
///
/// A client is created once per configuration and may serve requests from multiple threads.
pub trait BlockingClient: Clone + Send + Sync + 'static {
    /// The type of response returned by this client.
    type Response: BlockingResponse;

    /// Provides a textual description of this client.
    fn describe(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockingClient")
    }

    /// Sends an HTTP request and returns the response.
    ///
    /// A response with any status code is `Ok`; `Err` is reserved for transport failures.
    fn request(&self, req: Request) -> crate::Result<Self::Response>;
}

/// Trait for blocking HTTP backend implementations.
///
/// This trait represents one wrapped HTTP library.
pub trait BlockingBackend: Send + Sync + 'static {
    /// The type of client this backend creates.
    type BlockingClient: BlockingClient;

    /// The identifier this backend is registered under.
    fn id(&self) -> BackendId;

    /// Probes whether the wrapped library is usable in the current process.
    fn is_available(&self) -> bool {
        true
    }

    /// Creates a new blocking client with the given options.
    fn create_blocking_client(
        &self,
        options: ClientOptions,
    ) -> BuildClientResult<Self::BlockingClient>;
}

/// Trait for blocking HTTP responses.
///
/// ## Response Method Receivers
///
/// `bytes()` takes `&mut self` for object safety. The facade calls it at most once per
/// response.
pub trait BlockingResponse: Send + Sync + 'static {
    /// Provides a textual description of this response.
    fn describe(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockingResponse")
    }

    /// Returns the HTTP status code of this response.
    fn status(&self) -> u16;

    /// Returns the content-length of the response body, if known.
    fn content_length(&self) -> Option<u64>;

    /// Returns all response headers in the order received.
    fn headers(&self) -> Vec<(String, String)>;

    /// Reads the whole response body.
    fn bytes(&mut self) -> crate::Result<Vec<u8>>;
}
