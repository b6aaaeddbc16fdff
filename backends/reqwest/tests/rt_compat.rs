//! Blocking requests from every kind of calling context.

use std::io::{BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::thread;

use unihttp_backend_reqwest::ReqwestBackend;
use unihttp_interface::blocking::{BlockingBackend, BlockingClient, BlockingResponse};
use unihttp_interface::client::{ClientOptions, Proxy, ProxySettings};
use unihttp_interface::{Error, Method, Request};

const LARGE_BODY_SIZE: usize = 4096;

fn handle_connection(stream: TcpStream) {
    let mut reader = BufReader::new(stream);
    let mut request_line = String::new();
    if reader.read_line(&mut request_line).is_err() {
        return;
    }
    let mut line = String::new();
    while reader.read_line(&mut line).is_ok_and(|n| n > 2) {
        line.clear();
    }
    let body = if request_line.starts_with("GET /large ") {
        "x".repeat(LARGE_BODY_SIZE)
    } else if request_line.starts_with("GET http://") {
        // Absolute-form requests only reach us as a proxy.
        request_line.trim_end().to_owned()
    } else {
        "hello".to_owned()
    };
    let mut stream = reader.into_inner();
    let _ = write!(
        stream,
        "HTTP/1.1 200 OK\r\ncontent-type: text/plain\r\ncontent-length: {}\r\n\
         connection: close\r\n\r\n{body}",
        body.len()
    );
}

/// Serve fixed responses on a loopback port for the lifetime of the test binary.
fn serve() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            thread::spawn(move || handle_connection(stream));
        }
    });
    addr
}

fn get(addr: SocketAddr, path: &str) -> Request {
    Request {
        method: Method::Get,
        url: format!("http://{addr}{path}").into(),
        parameters: vec![],
        headers: vec![],
        body: None,
        timeout: None,
    }
}

fn options() -> ClientOptions {
    ClientOptions {
        use_default_proxy: false,
        ..Default::default()
    }
}

fn fetch(addr: SocketAddr) -> (u16, Vec<u8>) {
    let client = ReqwestBackend.create_blocking_client(options()).unwrap();
    let mut response = client.request(get(addr, "/")).unwrap();
    (response.status(), response.bytes().unwrap())
}

#[test]
fn test_blocking_outside_runtime() {
    let addr = serve();
    assert_eq!(fetch(addr), (200, b"hello".to_vec()));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_blocking_inside_multi_thread_runtime() {
    let addr = serve();
    assert_eq!(fetch(addr), (200, b"hello".to_vec()));
}

#[tokio::test]
async fn test_blocking_inside_current_thread_runtime() {
    let addr = serve();
    assert_eq!(fetch(addr), (200, b"hello".to_vec()));
}

#[tokio::test]
async fn test_blocking_inside_spawn_blocking() {
    let addr = serve();
    let result = tokio::task::spawn_blocking(move || fetch(addr))
        .await
        .unwrap();
    assert_eq!(result, (200, b"hello".to_vec()));
}

#[test]
fn test_concurrent_blocking_requests() {
    let addr = serve();
    let client = ReqwestBackend.create_blocking_client(options()).unwrap();

    let handles: Vec<_> = (0..5)
        .map(|i| {
            let client = client.clone();
            thread::spawn(move || {
                let mut request = get(addr, "/");
                request
                    .headers
                    .push(("X-Test-Request".into(), i.to_string().into()));
                let mut response = client.request(request).unwrap();
                assert_eq!(response.status(), 200);
                response.bytes().unwrap()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), b"hello");
    }
}

#[test]
fn test_response_size_limit() {
    let addr = serve();
    let client = ReqwestBackend
        .create_blocking_client(ClientOptions {
            max_response_buffer_size: Some(1024),
            ..options()
        })
        .unwrap();
    let mut response = client.request(get(addr, "/large")).unwrap();
    assert!(matches!(response.bytes(), Err(Error::ResponseTooLarge)));

    let mut response = client.request(get(addr, "/")).unwrap();
    assert_eq!(response.bytes().unwrap(), b"hello");
}

#[test]
fn test_connection_refused() {
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let client = ReqwestBackend.create_blocking_client(options()).unwrap();
    let err = client.request(get(addr, "/")).err().unwrap();
    assert!(err.is_connection(), "{err:?}");
}

fn proxied_through(addr: SocketAddr, proxy: ProxySettings, target: &str) -> Vec<u8> {
    let client = ReqwestBackend
        .create_blocking_client(ClientOptions { proxy, ..options() })
        .unwrap();
    let mut request = get(addr, "/");
    request.url = target.to_owned().into();
    let mut response = client.request(request).unwrap();
    assert_eq!(response.status(), 200);
    response.bytes().unwrap()
}

#[test]
fn test_explicit_proxy_receives_requests() {
    let addr = serve();
    let proxy = Proxy::parse(&format!("http://{addr}")).unwrap();
    let body = proxied_through(addr, ProxySettings::all(proxy), "http://origin.invalid/x");
    assert_eq!(body, b"GET http://origin.invalid/x HTTP/1.1");
}

#[test]
fn test_proxy_applies_to_its_scheme_only() {
    let addr = serve();
    let proxy = Proxy::parse(&format!("http://{addr}")).unwrap();
    let target = format!("http://{addr}/");

    let http_only = ProxySettings {
        http: Some(proxy.clone()),
        https: None,
    };
    let body = proxied_through(addr, http_only, &target);
    assert_eq!(body, format!("GET {target} HTTP/1.1").into_bytes());

    let https_only = ProxySettings {
        http: None,
        https: Some(proxy),
    };
    assert_eq!(proxied_through(addr, https_only, &target), b"hello");
}
