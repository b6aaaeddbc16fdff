//! Type-erased blocking client interface traits.
//!
//! The traits in this module are automatically implemented for types that implement the
//! corresponding traits from the `blocking::backend` module, so backend developers don't
//! need to implement them directly.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use super::backend::{BlockingBackend, BlockingClient, BlockingResponse};
use crate::client::{BuildClientResult, ClientOptions};
use crate::{BackendId, Request};

/// Trait for type-erased blocking backend implementations.
///
/// Automatically implemented for types implementing `BlockingBackend`.
pub trait AnyBlockingBackend: Send + Sync + 'static {
    /// The identifier this backend is registered under.
    fn id(&self) -> BackendId;
    /// Probes whether the wrapped library is usable in the current process.
    fn is_available(&self) -> bool;
    /// Creates a new blocking client with the given options.
    fn create_blocking_client(
        &self,
        options: ClientOptions,
    ) -> BuildClientResult<Arc<dyn AnyBlockingClient>>;
}

/// Trait for type-erased blocking HTTP clients.
///
/// Automatically implemented for types implementing `BlockingClient`.
pub trait AnyBlockingClient: Any + Send + Sync + 'static {
    /// Provides a textual description of this client.
    fn describe(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;
    /// Sends an HTTP request and returns the response.
    fn request(&self, req: Request) -> crate::Result<Box<dyn AnyBlockingResponse>>;
}

/// Trait for type-erased blocking HTTP responses.
///
/// Automatically implemented for types implementing `BlockingResponse`.
pub trait AnyBlockingResponse: Any + Send + Sync + 'static {
    /// Provides a textual description of this response.
    fn describe(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;
    /// Returns the HTTP status code of this response.
    fn status(&self) -> u16;
    /// Returns the content-length of the response body, if known.
    fn content_length(&self) -> Option<u64>;
    /// Returns all response headers in the order received.
    fn headers(&self) -> Vec<(String, String)>;
    /// Reads the whole response body.
    fn bytes(&mut self) -> crate::Result<Vec<u8>>;
}

impl<B> AnyBlockingBackend for B
where
    B: BlockingBackend,
{
    fn id(&self) -> BackendId {
        BlockingBackend::id(self)
    }

    fn is_available(&self) -> bool {
        BlockingBackend::is_available(self)
    }

    fn create_blocking_client(
        &self,
        options: ClientOptions,
    ) -> BuildClientResult<Arc<dyn AnyBlockingClient>> {
        Ok(Arc::new(BlockingBackend::create_blocking_client(
            self, options,
        )?))
    }
}

impl<C> AnyBlockingClient for C
where
    C: BlockingClient,
{
    fn describe(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        BlockingClient::describe(self, f)
    }

    fn request(&self, req: Request) -> crate::Result<Box<dyn AnyBlockingResponse>> {
        Ok(Box::new(BlockingClient::request(self, req)?))
    }
}

impl<R> AnyBlockingResponse for R
where
    R: BlockingResponse,
{
    fn describe(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        BlockingResponse::describe(self, f)
    }

    fn status(&self) -> u16 {
        BlockingResponse::status(self)
    }

    fn content_length(&self) -> Option<u64> {
        BlockingResponse::content_length(self)
    }

    fn headers(&self) -> Vec<(String, String)> {
        BlockingResponse::headers(self)
    }

    fn bytes(&mut self) -> crate::Result<Vec<u8>> {
        BlockingResponse::bytes(self)
    }
}
