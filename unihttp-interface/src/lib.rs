//! Interface definitions for unihttp HTTP client backends.
//!
//! This crate provides the contract that backend adapters must implement to be driven by
//! the unihttp facade. It defines the request shape, the transport options a backend has
//! to honour, and the categorized transport errors it reports.
//!
//! ## Backend identification
//!
//! Every adapter names itself with a [`BackendId`]. The facade keeps a registry keyed by
//! that identifier and walks a dependency chain of identifiers to pick one at runtime.
//!
//! ## Blocking only
//!
//! Requests block the calling thread until the backend returns. Backends that are
//! asynchronous internally drive their own runtime.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]

pub mod blocking;
pub mod body;
pub mod client;
mod error;
pub mod register;
mod request;

pub use body::Body;
pub use error::{Error, Result};
pub use register::BackendId;
pub use request::{Method, Request};
