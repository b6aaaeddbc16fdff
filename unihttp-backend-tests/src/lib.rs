#![cfg(test)]

use std::{
    collections::BTreeMap,
    convert::Infallible,
    future::Future,
    io,
    net::SocketAddr,
    pin::Pin,
    sync::{LazyLock, Mutex, OnceLock},
};

use http_body_util::{BodyExt, Full};
use hyper::{
    body::{self, Bytes},
    server::conn::http1,
    service::service_fn,
    Request, Response,
};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use unihttp::{ClientBuilder, DependencyChain, HttpClient, Registry, Settings};

mod fixtures;
mod request_ext;

pub use request_ext::RequestExt;

#[must_use]
struct HyperFixtureHandle(String);

impl Drop for HyperFixtureHandle {
    fn drop(&mut self) {
        let failed_request = {
            let mut services = HYPER_SERVICE_FIXTURES.lock().unwrap();
            services
                .remove(&*self.0)
                .expect("fixture not found")
                .assertion_failed_request
        };
        if let Some(req) = failed_request {
            panic!("assertion failed for request {}: {:?}", self.0, req);
        }
    }
}

type BoxedBody = http_body_util::combinators::BoxBody<Bytes, hyper::Error>;

type FixtureAssertionResult = (ResponseWrapper, Result<(), Request<body::Incoming>>);

struct ResponseWrapper(Response<BoxedBody>);

impl From<Response<Full<Bytes>>> for ResponseWrapper {
    fn from(resp: Response<Full<Bytes>>) -> Self {
        let resp = resp.map(|body| body.map_err(|e| match e {}).boxed());
        ResponseWrapper(resp)
    }
}

impl From<Response<BoxedBody>> for ResponseWrapper {
    fn from(resp: Response<BoxedBody>) -> Self {
        ResponseWrapper(resp)
    }
}

type HyperServiceFixtureCallback = Box<
    dyn Fn(Request<body::Incoming>) -> Pin<Box<dyn Future<Output = FixtureAssertionResult> + Send>>
        + Send
        + Sync,
>;
struct HyperServiceFixture {
    svc: HyperServiceFixtureCallback,
    assertion_failed_request: Option<Request<body::Incoming>>,
}

static HYPER_SERVICE_FIXTURES: Mutex<BTreeMap<String, HyperServiceFixture>> =
    Mutex::new(BTreeMap::new());

fn add_hyper_fixture<Fut, Resp>(
    path: impl Into<String>,
    svc_fn: impl Fn(Request<body::Incoming>) -> Fut + Send + Sync + 'static,
) -> HyperFixtureHandle
where
    Fut: Future<Output = (Resp, Result<(), Request<body::Incoming>>)> + Send + 'static,
    Resp: Into<ResponseWrapper>,
{
    let mut path: String = path.into();
    if !path.starts_with('/') {
        path.insert(0, '/');
    }
    let svc = Box::new(move |req| {
        let fut = svc_fn(req);
        Box::pin(async move {
            let (resp, result) = fut.await;
            (resp.into(), result)
        }) as _
    });
    let fixture = HyperServiceFixture {
        svc,
        assertion_failed_request: None,
    };
    HYPER_SERVICE_FIXTURES
        .lock()
        .unwrap()
        .insert(path.clone(), fixture);
    HyperFixtureHandle(path)
}

async fn handle_service(req: Request<body::Incoming>) -> Result<Response<BoxedBody>, Infallible> {
    let path = req.uri().path().to_owned();
    let fut = {
        let services = HYPER_SERVICE_FIXTURES.lock().unwrap();
        match services.get(&*path) {
            Some(fixture) => (fixture.svc)(req),
            None => {
                let mut res = Response::new(Full::new(Bytes::from("no such fixture")));
                *res.status_mut() = hyper::StatusCode::NOT_FOUND;
                return Ok(ResponseWrapper::from(res).0);
            }
        }
    };
    let (response, result) = fut.await;

    if let Err(req) = result {
        let mut services = HYPER_SERVICE_FIXTURES.lock().unwrap();
        if let Some(fixture) = services.get_mut(&*path) {
            fixture.assertion_failed_request = Some(req);
        }
    }

    Ok(response.0)
}

async fn setup_hyper_impl() -> Result<String, io::Error> {
    let addr = SocketAddr::from(([127, 0, 0, 1], 0));

    let listener = TcpListener::bind(addr).await?;
    let port = listener.local_addr()?.port();

    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                continue;
            };
            let io = TokioIo::new(stream);

            tokio::task::spawn(async move {
                if let Err(err) = http1::Builder::new()
                    .serve_connection(io, service_fn(handle_service))
                    .await
                {
                    eprintln!("Error serving connection: {err:?}");
                }
            });
        }
    });

    Ok(format!("http://127.0.0.1:{port}"))
}

static TOKIO_RT: LazyLock<tokio::runtime::Runtime> = LazyLock::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .unwrap()
});

fn base_url() -> io::Result<&'static str> {
    static HYPER_SERVICE_INIT: OnceLock<Result<String, String>> = OnceLock::new();
    HYPER_SERVICE_INIT
        .get_or_init(|| {
            TOKIO_RT
                .block_on(setup_hyper_impl())
                .map_err(|e| e.to_string())
        })
        .as_deref()
        .map_err(|e| io::Error::other(e.to_owned()))
}

/// Absolute URL of a fixture path on the fixture server.
fn url(path: &str) -> String {
    let base = base_url().expect("fixture server failed to start");
    format!("{base}/{}", path.trim_start_matches('/'))
}

macro_rules! declare_backends {
    ($registry:ident; $(($feature:literal, $backend:expr)),* $(,)*) => {
        $(
            #[cfg(feature = $feature)]
            $registry.register($backend);
        )*

        let backend_feature_count = 0 $(+ cfg!(feature = $feature) as u32)*;
        match backend_feature_count {
            0 => panic!("No backend feature enabled."),
            1 => {}
            _ => panic!("Multiple backend features enabled."),
        }
    };
}

/// A registry holding only the backend under test.
fn registry() -> Registry {
    let mut registry = Registry::new();
    declare_backends!(
        registry;
        ("curl", unihttp_backend_curl::CurlBackend),
        ("reqwest", unihttp_backend_reqwest::ReqwestBackend),
        ("ureq", unihttp_backend_ureq::UreqBackend),
    );
    registry
}

/// Start the fixture server and return a builder bound to the backend under test.
fn init_builder_blocking() -> io::Result<ClientBuilder> {
    base_url()?;
    let chain =
        DependencyChain::new(registry().ids()).map_err(|e| io::Error::other(e.to_string()))?;
    Ok(ClientBuilder::default()
        .dependency_chain(chain)
        .no_system_proxy())
}

trait BuildBlocking {
    fn build_blocking(self) -> unihttp::Result<HttpClient>;
}

impl BuildBlocking for ClientBuilder {
    fn build_blocking(self) -> unihttp::Result<HttpClient> {
        self.build_with(Settings::default(), registry())
    }
}
