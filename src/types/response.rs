//! Responses and per-attempt outcomes.

use crate::Result;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status_code: u16,
    pub body: Bytes,
}

impl Response {
    pub fn new(status_code: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status_code,
            body: body.into(),
        }
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

/// Coarse classification of a transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Connection could not be established (refused, DNS, TLS handshake).
    Connect,
    /// The per-request timeout elapsed.
    Timeout,
    Other,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FailureKind::Connect => "connect",
            FailureKind::Timeout => "timeout",
            FailureKind::Other => "other",
        })
    }
}

/// Result of one request attempt. Never both a response and a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success(Response),
    TransportFailure { kind: FailureKind, cause: String },
}

impl Outcome {
    pub fn transport_failure(kind: FailureKind, cause: impl Into<String>) -> Self {
        Outcome::TransportFailure {
            kind,
            cause: cause.into(),
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            Outcome::Success(r) => Some(r.status_code),
            Outcome::TransportFailure { .. } => None,
        }
    }

    pub fn is_transport_failure(&self) -> bool {
        matches!(self, Outcome::TransportFailure { .. })
    }

    pub fn into_response(self) -> Option<Response> {
        match self {
            Outcome::Success(r) => Some(r),
            Outcome::TransportFailure { .. } => None,
        }
    }
}
