//! reqwest backend for unihttp.
//!
//! reqwest is asynchronous. Blocking requests are driven by a tokio runtime owned by the
//! client, or by the ambient runtime when one is running on the calling thread.

#![cfg_attr(docsrs, feature(doc_cfg))]

mod blocking;
mod client;
mod error;
mod request;
mod response;

use unihttp_interface::blocking::BlockingBackend;
use unihttp_interface::client::{BuildClientResult, ClientOptions};
use unihttp_interface::BackendId;

pub use blocking::{ReqwestBlockingClient, ReqwestBlockingResponse};

/// The backend implementation using reqwest.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReqwestBackend;

impl BlockingBackend for ReqwestBackend {
    type BlockingClient = ReqwestBlockingClient;

    fn id(&self) -> BackendId {
        BackendId::Reqwest
    }

    fn create_blocking_client(
        &self,
        options: ClientOptions,
    ) -> BuildClientResult<Self::BlockingClient> {
        ReqwestBlockingClient::new(options)
    }
}
