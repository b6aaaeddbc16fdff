//! Stub backends driving the facade in unit tests.

use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use unihttp_interface::blocking::{BlockingBackend, BlockingClient, BlockingResponse};
use unihttp_interface::client::{BuildClientResult, ClientOptions};
use unihttp_interface::{BackendId, Error as TransportError, Request};

/// Route `tracing` output of the facade to the test harness. Filtered by `RUST_LOG`.
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[derive(Debug, Clone, Copy)]
enum Probe {
    Available,
    Unavailable,
    Panic,
}

/// What a stub client does for one request.
pub(crate) enum Outcome {
    Respond(u16, &'static str),
    Fail(TransportError),
}

#[derive(Default)]
pub(crate) struct Script {
    outcomes: Mutex<VecDeque<Outcome>>,
    calls: AtomicUsize,
    clients_built: AtomicUsize,
    last_options: Mutex<Option<ClientOptions>>,
}

impl Script {
    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn clients_built(&self) -> usize {
        self.clients_built.load(Ordering::SeqCst)
    }

    pub(crate) fn last_options(&self) -> Option<ClientOptions> {
        self.last_options.lock().unwrap().clone()
    }
}

/// A backend answering from a script, then echoing requests back as JSON.
#[derive(Clone)]
pub(crate) struct StubBackend {
    id: BackendId,
    probe: Probe,
    script: Arc<Script>,
}

impl StubBackend {
    fn with_probe(id: BackendId, probe: Probe) -> Self {
        Self {
            id,
            probe,
            script: Arc::default(),
        }
    }

    pub(crate) fn echo(id: BackendId) -> Self {
        Self::with_probe(id, Probe::Available)
    }

    pub(crate) fn unavailable(id: BackendId) -> Self {
        Self::with_probe(id, Probe::Unavailable)
    }

    pub(crate) fn panicking_probe(id: BackendId) -> Self {
        Self::with_probe(id, Probe::Panic)
    }

    pub(crate) fn scripted(id: BackendId, outcomes: impl IntoIterator<Item = Outcome>) -> Self {
        let backend = Self::echo(id);
        backend.script.outcomes.lock().unwrap().extend(outcomes);
        backend
    }

    /// A backend timing out `failures` times before echoing.
    pub(crate) fn flaky(id: BackendId, failures: usize) -> Self {
        Self::scripted(
            id,
            (0..failures).map(|_| Outcome::Fail(TransportError::Timeout)),
        )
    }

    pub(crate) fn script(&self) -> Arc<Script> {
        Arc::clone(&self.script)
    }
}

impl BlockingBackend for StubBackend {
    type BlockingClient = StubClient;

    fn id(&self) -> BackendId {
        self.id
    }

    fn is_available(&self) -> bool {
        match self.probe {
            Probe::Available => true,
            Probe::Unavailable => false,
            Probe::Panic => panic!("{} failed to initialize", self.id),
        }
    }

    fn create_blocking_client(&self, options: ClientOptions) -> BuildClientResult<StubClient> {
        self.script.clients_built.fetch_add(1, Ordering::SeqCst);
        *self.script.last_options.lock().unwrap() = Some(options.clone());
        Ok(StubClient {
            id: self.id,
            options: Arc::new(options),
            script: Arc::clone(&self.script),
        })
    }
}

#[derive(Clone)]
pub(crate) struct StubClient {
    id: BackendId,
    options: Arc<ClientOptions>,
    script: Arc<Script>,
}

impl StubClient {
    fn echo(&self, req: &Request) -> unihttp_interface::Result<StubResponse> {
        let url = req.url_with_query()?;
        let mut headers: BTreeMap<String, String> = self
            .options
            .default_headers_except(&req.headers)
            .map(|(n, v)| (n.to_ascii_lowercase(), v.to_owned()))
            .collect();
        headers.extend(
            req.headers
                .iter()
                .map(|(n, v)| (n.to_ascii_lowercase(), v.to_string())),
        );
        if let Some(user_agent) = &self.options.user_agent {
            headers
                .entry("user-agent".into())
                .or_insert_with(|| user_agent.clone());
        }
        let body = req
            .body
            .as_ref()
            .map(|body| String::from_utf8_lossy(&body.to_bytes()).into_owned());
        let echo = serde_json::json!({
            "backend": self.id.name(),
            "method": req.method.as_str(),
            "url": url.as_str(),
            "query": url.query(),
            "headers": headers,
            "body": body,
        });
        Ok(StubResponse {
            status: 200,
            headers: vec![("Content-Type".into(), "application/json".into())],
            body: echo.to_string().into_bytes(),
        })
    }
}

impl BlockingClient for StubClient {
    type Response = StubResponse;

    fn describe(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StubClient({})", self.id)
    }

    fn request(&self, req: Request) -> unihttp_interface::Result<StubResponse> {
        self.script.calls.fetch_add(1, Ordering::SeqCst);
        let outcome = self.script.outcomes.lock().unwrap().pop_front();
        match outcome {
            Some(Outcome::Respond(status, body)) => Ok(StubResponse {
                status,
                headers: vec![("Content-Type".into(), "text/plain".into())],
                body: body.as_bytes().to_vec(),
            }),
            Some(Outcome::Fail(err)) => Err(err),
            None => self.echo(&req),
        }
    }
}

pub(crate) struct StubResponse {
    status: u16,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl BlockingResponse for StubResponse {
    fn status(&self) -> u16 {
        self.status
    }

    fn content_length(&self) -> Option<u64> {
        Some(self.body.len() as u64)
    }

    fn headers(&self) -> Vec<(String, String)> {
        self.headers.clone()
    }

    fn bytes(&mut self) -> unihttp_interface::Result<Vec<u8>> {
        Ok(std::mem::take(&mut self.body))
    }
}
