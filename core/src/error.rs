//! Error types for the catalog client.
//!
//! # Design
//! `NotFound` gets a dedicated variant because the detail screen needs to
//! tell "no such character" apart from "the server misbehaved." The listing
//! 404 never reaches this type: it is folded into an empty page by the
//! client. Every other non-2xx response lands in `HttpError` with the raw
//! status code and body for debugging.

use std::fmt;

/// Errors returned by `CatalogClient` and `Fetcher` operations.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The caller passed a malformed id or page index. No request was sent.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The server returned 404 for a single-character lookup.
    #[error("character {0} not found")]
    NotFound(u64),

    /// The request never produced a response.
    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body was not JSON or did not match the expected shape.
    #[error("decode failed: {0}")]
    DecodeError(String),

    /// A caller-supplied cancellation token fired before the response arrived.
    #[error("operation cancelled")]
    Cancelled,
}

/// Broad classification of a transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// DNS resolution or TCP/TLS connection setup failed.
    Connect,
    /// The request or connect deadline elapsed.
    Timeout,
    /// Anything else: reset connection, truncated body, protocol error.
    Other,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportErrorKind::Connect => write!(f, "connect"),
            TransportErrorKind::Timeout => write!(f, "timeout"),
            TransportErrorKind::Other => write!(f, "other"),
        }
    }
}

/// Failure reported by a [`Transport`](crate::transport::Transport)
/// implementation.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn connect(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Connect, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Timeout, message)
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Other, message)
    }
}
