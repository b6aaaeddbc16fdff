use std::fmt;
use std::mem;
use std::sync::{Arc, Mutex, PoisonError};

use curl::easy::Easy2;
use unihttp_interface::blocking::{BlockingBackend, BlockingClient, BlockingResponse};
use unihttp_interface::client::{BuildClientResult, ClientOptions};
use unihttp_interface::{BackendId, Error as UnihttpError, Request, Result as UnihttpResult};

use crate::error::IntoUnihttpResult;
use crate::handler::Collector;
use crate::request::populate_request;
use crate::state::RequestState;

type Slot = Arc<Mutex<Option<Easy2<Collector>>>>;

/// A blocking client performing requests on libcurl easy handles.
#[derive(Clone)]
pub struct CurlEasyClient {
    options: Arc<ClientOptions>,
    slot: Slot,
}

/// A fully received libcurl response.
pub struct CurlResponse {
    status: u16,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl CurlEasyClient {
    /// Create a client with the given options.
    pub fn new(options: ClientOptions) -> Self {
        Self {
            options: Arc::new(options),
            slot: Arc::new(Mutex::new(None)),
        }
    }

    fn take_handle(&self) -> Easy2<Collector> {
        let idle = self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        idle.unwrap_or_else(|| Easy2::new(Collector::default()))
    }

    fn put_back(&self, handle: Easy2<Collector>) {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.is_none() {
            *slot = Some(handle);
        }
    }

    fn perform(&self, easy: &mut Easy2<Collector>, req: &Request) -> UnihttpResult<CurlResponse> {
        easy.reset();
        easy.get_mut().state = RequestState::new(self.options.max_response_buffer_size);
        populate_request(easy, req, &self.options)?;

        let performed = easy.perform();
        let state = mem::take(&mut easy.get_mut().state);
        if state.exceeded_max_size {
            return Err(UnihttpError::ResponseTooLarge);
        }
        performed.into_unihttp_result("perform")?;

        let status = easy.response_code().into_unihttp_result("get status")?;
        Ok(CurlResponse {
            status: u16::try_from(status).unwrap_or(0),
            headers: state.response_headers,
            body: state.response_buffer,
        })
    }
}

impl BlockingClient for CurlEasyClient {
    type Response = CurlResponse;

    fn describe(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CurlEasyClient")
    }

    fn request(&self, req: Request) -> UnihttpResult<CurlResponse> {
        let mut easy = self.take_handle();
        let result = self.perform(&mut easy, &req);
        self.put_back(easy);
        result
    }
}

impl BlockingResponse for CurlResponse {
    fn describe(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CurlResponse({})", self.status)
    }

    fn status(&self) -> u16 {
        self.status
    }

    fn content_length(&self) -> Option<u64> {
        Some(self.body.len() as u64)
    }

    fn headers(&self) -> Vec<(String, String)> {
        self.headers.clone()
    }

    fn bytes(&mut self) -> UnihttpResult<Vec<u8>> {
        Ok(mem::take(&mut self.body))
    }
}

impl BlockingBackend for crate::CurlBackend {
    type BlockingClient = CurlEasyClient;

    fn id(&self) -> BackendId {
        BackendId::Curl
    }

    fn is_available(&self) -> bool {
        crate::init();
        let version = curl::Version::get();
        tracing::debug!(version = version.version(), "libcurl available");
        !version.version().is_empty()
    }

    fn create_blocking_client(&self, options: ClientOptions) -> BuildClientResult<CurlEasyClient> {
        crate::init();
        Ok(CurlEasyClient::new(options))
    }
}
