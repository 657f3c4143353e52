//! Error types for the cart client.
//!
//! # Design
//! A non-2xx status carries only the code: the platform's error body is not
//! part of the contract and is never inspected. Everything that stops a
//! request from completing is a `Transport` error.

use thiserror::Error;

/// Errors returned by `CartClient` parse methods and `CartApi` operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// The request never completed (offline, DNS, connection reset, unreadable body).
    #[error("transport failed: {0}")]
    Transport(String),

    /// The platform answered with a status outside 200..=299.
    #[error("platform returned HTTP {status}")]
    Status { status: u16 },

    /// The response body could not be parsed as the expected JSON.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl CartError {
    /// The HTTP status for `Status` errors, `None` otherwise.
    pub fn status(&self) -> Option<u16> {
        match self {
            CartError::Status { status } => Some(*status),
            _ => None,
        }
    }
}
