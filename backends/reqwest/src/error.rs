use std::error::Error as _;
use std::io;

use thiserror::Error;
use unihttp_interface::client::BuildClientError;
use unihttp_interface::Error as UnihttpError;

#[derive(Error, Debug)]
pub enum ReqwestBackendError {
    #[error("reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("response too large")]
    ResponseTooLarge,
    #[error("invalid header name: {0}")]
    InvalidHeaderName(String),
    #[error("invalid header value for {0}")]
    InvalidHeaderValue(String),
    #[error("invalid CA bundle: {0}")]
    InvalidCaBundle(String),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Whether the error chain of `e` reports a TLS failure.
fn is_tls_failure(e: &reqwest::Error) -> bool {
    let mut source = e.source();
    while let Some(err) = source {
        let message = err.to_string().to_ascii_lowercase();
        if ["certificate", "tls", "ssl", "handshake"]
            .iter()
            .any(|needle| message.contains(needle))
        {
            return true;
        }
        source = err.source();
    }
    false
}

impl From<ReqwestBackendError> for UnihttpError {
    fn from(err: ReqwestBackendError) -> Self {
        match err {
            ReqwestBackendError::Reqwest(e) => {
                if e.is_timeout() {
                    UnihttpError::Timeout
                } else if e.is_redirect() {
                    UnihttpError::TooManyRedirects
                } else if e.is_builder() {
                    UnihttpError::InvalidRequest(e.to_string())
                } else if is_tls_failure(&e) {
                    UnihttpError::Ssl(format!("{e:?}"))
                } else if e.is_connect() || e.is_request() || e.is_body() {
                    UnihttpError::Connection(format!("{e:?}"))
                } else {
                    UnihttpError::Library(e.to_string())
                }
            }
            ReqwestBackendError::ResponseTooLarge => UnihttpError::ResponseTooLarge,
            ReqwestBackendError::InvalidHeaderName(_)
            | ReqwestBackendError::InvalidHeaderValue(_) => {
                UnihttpError::InvalidRequest(err.to_string())
            }
            ReqwestBackendError::InvalidCaBundle(_) => UnihttpError::Ssl(err.to_string()),
            ReqwestBackendError::Io(e) => UnihttpError::Io(e),
        }
    }
}

impl From<ReqwestBackendError> for BuildClientError {
    fn from(err: ReqwestBackendError) -> Self {
        match err {
            ReqwestBackendError::InvalidHeaderName(_)
            | ReqwestBackendError::InvalidHeaderValue(_) => BuildClientError::InvalidOption {
                option: "default_headers",
                reason: err.to_string(),
            },
            ReqwestBackendError::InvalidCaBundle(_) => BuildClientError::InvalidOption {
                option: "ssl_verify",
                reason: err.to_string(),
            },
            other => BuildClientError::BackendError(other.into()),
        }
    }
}

pub type Result<T> = std::result::Result<T, ReqwestBackendError>;
