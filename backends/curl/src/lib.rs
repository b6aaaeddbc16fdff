//! libcurl backend for unihttp.
//!
//! Requests run on libcurl easy handles. Each client keeps one idle handle around so that
//! consecutive requests can reuse its connection cache.

mod blocking;
mod error;
mod handler;
mod request;
mod state;

pub use blocking::{CurlEasyClient, CurlResponse};

/// The libcurl backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct CurlBackend;

/// Initialize libcurl. Called before the first handle is created.
pub fn init() {
    curl::init();
}
