//! Blocking HTTP client interface.
//!
//! This module provides the interfaces backends implement to serve blocking requests.

mod any;
mod backend;

pub use any::{AnyBlockingBackend, AnyBlockingClient, AnyBlockingResponse};
pub use backend::{BlockingBackend, BlockingClient, BlockingResponse};
