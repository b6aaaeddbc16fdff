use std::fmt;
use std::future::Future;
use std::sync::{Arc, OnceLock};
use std::thread;

use tokio::runtime::{Handle, Runtime, RuntimeFlavor};
use unihttp_interface::blocking::{BlockingClient, BlockingResponse};
use unihttp_interface::client::{BuildClientResult, ClientOptions};
use unihttp_interface::{Error as UnihttpError, Request, Result as UnihttpResult};

use crate::client::ReqwestClient;
use crate::error::ReqwestBackendError;
use crate::request::build_request;
use crate::response::ReqwestResponse;

/// A blocking client driving a reqwest client to completion.
#[derive(Clone)]
pub struct ReqwestBlockingClient {
    inner: ReqwestClient,
}

impl ReqwestBlockingClient {
    /// Create a client with the given options.
    pub fn new(options: ClientOptions) -> BuildClientResult<Self> {
        let inner = ReqwestClient::new(&options)?;
        Ok(Self { inner })
    }
}

impl BlockingClient for ReqwestBlockingClient {
    type Response = ReqwestBlockingResponse;

    fn describe(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ReqwestBlockingClient")
    }

    fn request(&self, req: Request) -> UnihttpResult<Self::Response> {
        let request_builder = build_request(&self.inner.client, &req)?;
        let response = execute_with_runtime(&self.inner.managed_runtime, move || async move {
            request_builder
                .send()
                .await
                .map_err(|e| UnihttpError::from(ReqwestBackendError::Reqwest(e)))
        })?;
        Ok(ReqwestBlockingResponse {
            response: ReqwestResponse::new(response, self.inner.max_response_buffer_size),
            managed_runtime: self.inner.managed_runtime.clone(),
        })
    }
}

/// A reqwest response whose body is read on demand.
pub struct ReqwestBlockingResponse {
    response: ReqwestResponse,
    managed_runtime: Arc<ManagedRuntime>,
}

/// The current-thread runtime owned by a client, created on first use.
///
/// Dropping it never blocks, so clients and responses may be dropped from async code.
#[derive(Default)]
pub(crate) struct ManagedRuntime(OnceLock<Runtime>);

impl ManagedRuntime {
    fn get(&self) -> UnihttpResult<&Runtime> {
        if let Some(runtime) = self.0.get() {
            return Ok(runtime);
        }
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        if let Err(extra) = self.0.set(runtime) {
            extra.shutdown_background();
        } else {
            tracing::debug!("created managed tokio runtime for reqwest");
        }
        self.0
            .get()
            .ok_or_else(|| UnihttpError::Library("managed runtime unavailable".into()))
    }
}

impl Drop for ManagedRuntime {
    fn drop(&mut self) {
        if let Some(runtime) = self.0.take() {
            runtime.shutdown_background();
        }
    }
}

/// Execute an async task to completion from synchronous code.
///
/// A multi-thread runtime running on the calling thread is reused through `block_in_place`.
/// A current-thread runtime cannot be blocked on, so the task moves to a scoped thread
/// running the managed runtime. Outside of any runtime the managed runtime is used directly.
fn execute_with_runtime<F, Fut, T>(runtime: &ManagedRuntime, task: F) -> UnihttpResult<T>
where
    F: FnOnce() -> Fut + Send,
    Fut: Future<Output = UnihttpResult<T>>,
    T: Send,
{
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(|| handle.block_on(task()))
        }
        Ok(_) => thread::scope(|scope| {
            scope
                .spawn(|| runtime.get()?.block_on(task()))
                .join()
                .unwrap_or_else(|_| Err(UnihttpError::Library("request thread panicked".into())))
        }),
        Err(_) => runtime.get()?.block_on(task()),
    }
}

impl BlockingResponse for ReqwestBlockingResponse {
    fn describe(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ReqwestBlockingResponse(status: {})", self.status())
    }

    fn status(&self) -> u16 {
        self.response.status()
    }

    fn content_length(&self) -> Option<u64> {
        self.response.content_length()
    }

    fn headers(&self) -> Vec<(String, String)> {
        self.response.headers()
    }

    fn bytes(&mut self) -> UnihttpResult<Vec<u8>> {
        let response = &mut self.response;
        execute_with_runtime(&self.managed_runtime, || response.collect_all_bytes())
    }
}
