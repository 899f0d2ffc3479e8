//! The single failure type returned by every endpoint.
//!
//! # Design
//! Three channels, all surfaced through the same `Result`:
//! `Transport` when no HTTP response exists, `Api` when the status differs
//! from the endpoint's expected one, and `Decode` when an expected-success
//! body does not fit the target type. `Api` and `Decode` always carry the
//! status code and status text that were actually received.

use crate::decode::DecodeError;
use crate::transport::TransportError;

/// Errors returned by the dispatcher and every endpoint built on it.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No HTTP response was received.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server answered with a status other than the expected one.
    #[error("HTTP {status} {status_text}: {message}")]
    Api {
        status: u16,
        status_text: String,
        message: String,
    },

    /// The expected status arrived but its body could not be decoded.
    #[error("HTTP {status} {status_text}: {source}")]
    Decode {
        status: u16,
        status_text: String,
        #[source]
        source: DecodeError,
    },
}

impl ApiError {
    /// Status code received on the wire, if a response exists.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Transport(_) => None,
            ApiError::Api { status, .. } | ApiError::Decode { status, .. } => Some(*status),
        }
    }

    pub fn status_text(&self) -> Option<&str> {
        match self {
            ApiError::Transport(_) => None,
            ApiError::Api { status_text, .. } | ApiError::Decode { status_text, .. } => {
                Some(status_text)
            }
        }
    }

    /// Human-readable failure message; the API's own message for `Api`.
    pub fn message(&self) -> String {
        match self {
            ApiError::Api { message, .. } => message.clone(),
            ApiError::Transport(e) => e.to_string(),
            ApiError::Decode { source, .. } => source.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}
