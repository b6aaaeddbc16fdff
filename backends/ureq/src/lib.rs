//! ureq backend for unihttp.

#![cfg_attr(docsrs, feature(doc_cfg))]

mod blocking;
mod client;
mod error;

use unihttp_interface::blocking::BlockingBackend;
use unihttp_interface::client::{BuildClientResult, ClientOptions};
use unihttp_interface::BackendId;

pub use blocking::{UreqClient, UreqResponse};

/// The backend implementation using ureq.
#[derive(Debug, Clone, Copy, Default)]
pub struct UreqBackend;

impl BlockingBackend for UreqBackend {
    type BlockingClient = UreqClient;

    fn id(&self) -> BackendId {
        BackendId::Ureq
    }

    fn create_blocking_client(&self, options: ClientOptions) -> BuildClientResult<UreqClient> {
        UreqClient::new(options)
    }
}
