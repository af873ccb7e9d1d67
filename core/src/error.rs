//! Error type for remote store operations.
//!
//! # Design
//! The store signals every failure the same way: there is no distinguished
//! "not found" or "conflict" at this boundary, only transport-level faults.
//! All payloads are plain data so the error is `Clone` and a failed fetch
//! can be held in the shared cache state.

use thiserror::Error;

/// Failure talking to the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The server answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The request never completed (DNS, connect, I/O).
    #[error("network: {0}")]
    Network(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),
}
