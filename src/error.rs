use thiserror::Error;

use unihttp_interface::client::BuildClientError;
use unihttp_interface::{BackendId, Error as TransportError};

use crate::check::ErrorCategory;
use crate::client::ConfigurationError;
use crate::register::DependencyChain;
use crate::StatusCode;

/// The errors produced by unihttp.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A configuration value was rejected.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    /// None of the backends in the dependency chain is compiled in and available.
    #[error("No available backend in dependency chain [{chain}]")]
    NoAvailableBackend {
        /// The chain that was walked.
        chain: DependencyChain,
    },
    /// The selected backend could not build a client from the configuration.
    #[error("The {backend} backend failed to create a client: {source}")]
    BuildClient {
        /// The backend that failed.
        backend: BackendId,
        /// What went wrong.
        #[source]
        source: BuildClientError,
    },
    /// The request failed before an HTTP response was received.
    #[error("{backend} transport error: {source}")]
    Transport {
        /// The backend that executed the request.
        backend: BackendId,
        /// The categorized transport failure.
        #[source]
        source: TransportError,
    },
    /// The request itself is malformed (method, URL or header).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    /// The response body is not valid for the requested structured format.
    #[error("Failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),
    /// The server answered with a status classified as a client error.
    #[error("Client error {status}: {message}")]
    ClientError {
        /// Response status.
        status: StatusCode,
        /// Reason phrase and body excerpt.
        message: String,
    },
    /// The server answered with a status classified as a server error.
    #[error("Server error {status}: {message}")]
    ServerError {
        /// Response status.
        status: StatusCode,
        /// Reason phrase and body excerpt.
        message: String,
    },
    /// The server answered with a status of another category that error checking is
    /// configured to reject (redirects, invalid codes...).
    #[error("Unexpected {category} status {status}: {message}")]
    UnexpectedStatus {
        /// Response status.
        status: StatusCode,
        /// The category the status was classified into.
        category: ErrorCategory,
        /// Reason phrase and body excerpt.
        message: String,
    },
}

impl Error {
    /// The response status carried by a status error.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::ClientError { status, .. }
            | Self::ServerError { status, .. }
            | Self::UnexpectedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The transport failure, if the request never produced a response.
    pub fn transport(&self) -> Option<&TransportError> {
        match self {
            Self::Transport { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Whether the request timed out.
    pub fn is_timeout(&self) -> bool {
        self.transport().is_some_and(TransportError::is_timeout)
    }

    /// Whether the request failed while connecting to the server or proxy.
    pub fn is_connection(&self) -> bool {
        self.transport().is_some_and(TransportError::is_connection)
    }

    /// Whether TLS negotiation or certificate verification failed.
    pub fn is_ssl(&self) -> bool {
        matches!(self.transport(), Some(TransportError::Ssl(_)))
    }
}

/// A `Result` alias where the `Err` case is [`crate::Error`].
pub type Result<T> = std::result::Result<T, Error>;
