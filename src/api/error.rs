//! Transport error types

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure of a single call to the game API
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
    /// HTTP status, when the server answered at all
    pub status: Option<u16>,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Network, message)
    }

    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self {
            kind: TransportErrorKind::Status,
            message: message.into(),
            status: Some(status),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Decode, message)
    }

    pub fn invalid_url(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::InvalidUrl, message)
    }
}

/// Error classification, shown to the user and recorded in session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportErrorKind {
    /// Connection failure, timeout, or unreadable body
    Network,
    /// Server answered with a non-2xx status
    Status,
    /// Body was not JSON of the expected shape
    Decode,
    /// Base URL and path do not form a valid URL
    InvalidUrl,
}

impl TransportErrorKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Network => "network error",
            Self::Status => "server error",
            Self::Decode => "unexpected response",
            Self::InvalidUrl => "bad API address",
        }
    }
}
