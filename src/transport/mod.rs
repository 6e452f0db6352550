//! 传输适配层：执行单个 HTTP 请求并将结果统一为 Outcome。
//!
//! # Transport Adapter
//!
//! A [`Transport`] performs exactly one network call per request. It carries no
//! retry logic; retries are whole-chunk decisions owned by the dispatcher.
//!
//! [`Transport::execute`] is the only entry point the dispatcher uses. It never
//! returns an error: connection failures, DNS failures and timeouts are folded
//! into [`Outcome::TransportFailure`].

mod http;

pub use http::{HttpTransport, HttpTransportConfig};

use crate::types::{FailureKind, Outcome, Request, Response};
use async_trait::async_trait;
use tracing::debug;

/// Capability to send a single request.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform one network call.
    async fn send(&self, request: &Request) -> std::result::Result<Response, TransportError>;

    /// Perform one network call and normalize the result into an [`Outcome`].
    async fn execute(&self, request: &Request) -> Outcome {
        match self.send(request).await {
            Ok(response) => Outcome::Success(response),
            Err(err) => {
                let outcome = err.into_outcome();
                debug!(
                    request_id = %request.id,
                    method = request.method.as_str(),
                    url = %request.url,
                    outcome = ?outcome,
                    "request failed at transport level"
                );
                outcome
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Connection error: {0}")]
    Connect(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Transport error: {0}")]
    Other(String),
}

impl TransportError {
    pub fn kind(&self) -> FailureKind {
        match self {
            TransportError::Http(e) if e.is_timeout() => FailureKind::Timeout,
            TransportError::Http(e) if e.is_connect() => FailureKind::Connect,
            TransportError::Http(_) => FailureKind::Other,
            TransportError::Connect(_) => FailureKind::Connect,
            TransportError::Timeout(_) => FailureKind::Timeout,
            TransportError::Other(_) => FailureKind::Other,
        }
    }

    pub fn into_outcome(self) -> Outcome {
        let kind = self.kind();
        let cause = match &self {
            TransportError::Http(e) => error_chain(e),
            TransportError::Connect(m) | TransportError::Timeout(m) | TransportError::Other(m) => {
                m.clone()
            }
        };
        Outcome::TransportFailure { kind, cause }
    }
}

// reqwest's top-level message hides the useful part (e.g. "connection refused")
// in the source chain.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut parts = vec![err.to_string()];
    let mut source = err.source();
    while let Some(inner) = source {
        let msg = inner.to_string();
        if !parts.iter().any(|p| p.contains(&msg)) {
            parts.push(msg);
        }
        source = inner.source();
    }
    parts.join(": ")
}
