//! Transport error types reported by backends.

use std::io;

use thiserror::Error;

/// Categorized transport failures.
///
/// These describe a request that did not produce an HTTP response at all. A response with an
/// unsuccessful status code is *not* an error at this level.
#[derive(Debug, Error)]
pub enum Error {
    /// The URL was empty, malformed or uses an unsupported scheme.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    /// The request could not be expressed for the backend (bad header name, bad method...).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    /// The connection to the server or proxy could not be established or was dropped.
    #[error("Connection error: {0}")]
    Connection(String),
    /// The request did not finish within the configured timeout.
    #[error("Request is not finished within timeout")]
    Timeout,
    /// TLS negotiation or certificate verification failed.
    #[error("SSL error: {0}")]
    Ssl(String),
    /// The redirect limit was reached before a final response was received.
    #[error("Too many redirects")]
    TooManyRedirects,
    /// The response body exceeds the configured maximum size.
    #[error("Response body size exceeds max limit")]
    ResponseTooLarge,
    /// An underlying I/O error occurred.
    #[error("IO Error: {0}")]
    Io(#[from] io::Error),
    /// The wrapped HTTP library failed for an indeterminate reason.
    #[error("HTTP library error: {0}")]
    Library(String),
}

impl Error {
    /// Whether the failure is a timeout.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Timeout => true,
            Self::Io(e) => e.kind() == io::ErrorKind::TimedOut,
            _ => false,
        }
    }

    /// Whether the failure happened while connecting or exchanging data with the peer.
    pub fn is_connection(&self) -> bool {
        match self {
            Self::Connection(_) => true,
            Self::Io(e) => matches!(
                e.kind(),
                io::ErrorKind::ConnectionRefused
                    | io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::NotConnected
                    | io::ErrorKind::BrokenPipe
                    | io::ErrorKind::UnexpectedEof
            ),
            _ => false,
        }
    }
}

/// Result type for backend operations.
pub type Result<T> = std::result::Result<T, Error>;
