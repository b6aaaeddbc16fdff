//! Error types for client building operations.

use thiserror::Error;

use crate::Error as BackendError;

/// Errors that can occur when a backend builds a client from [`super::ClientOptions`].
#[derive(Debug, Error)]
pub enum BuildClientError {
    /// An option value was rejected by the backend library.
    #[error("Invalid {option}: {reason}")]
    InvalidOption {
        /// Name of the option.
        option: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
    /// An error occurred in the backend implementation.
    #[error("Error creating client: {0}")]
    BackendError(#[from] BackendError),
}

/// Result type for client building operations.
pub type BuildClientResult<T> = Result<T, BuildClientError>;
