//! Shared test fixtures.

#![allow(dead_code)]

use async_trait::async_trait;
use fast_requests::transport::{Transport, TransportError};
use fast_requests::types::{Request, RequestId, Response};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

type Script = dyn Fn(&Request, u32) -> Result<Response, TransportError> + Send + Sync;
type Latency = dyn Fn(&Request) -> Duration + Send + Sync;

/// In-memory transport driven by a closure of `(request, attempt)`, where
/// `attempt` counts calls for that request id starting at 1.
pub struct ScriptedTransport {
    script: Box<Script>,
    latency: Box<Latency>,
    attempts: Mutex<HashMap<RequestId, u32>>,
    calls: Mutex<Vec<(RequestId, Instant)>>,
}

impl ScriptedTransport {
    pub fn new(
        script: impl Fn(&Request, u32) -> Result<Response, TransportError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            script: Box::new(script),
            latency: Box::new(|_| Duration::ZERO),
            attempts: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every request answers `status`, body `"<id>#<attempt>"`.
    pub fn always(status: u16) -> Self {
        Self::new(move |req, attempt| Ok(Response::new(status, tagged_body(req, attempt))))
    }

    pub fn with_latency(
        mut self,
        latency: impl Fn(&Request) -> Duration + Send + Sync + 'static,
    ) -> Self {
        self.latency = Box::new(latency);
        self
    }

    pub fn calls(&self) -> Vec<(RequestId, Instant)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn attempts(&self, id: &str) -> u32 {
        self.attempts
            .lock()
            .unwrap()
            .get(&RequestId::from(id))
            .copied()
            .unwrap_or(0)
    }
}

pub fn tagged_body(req: &Request, attempt: u32) -> String {
    format!("{}#{}", req.id, attempt)
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: &Request) -> Result<Response, TransportError> {
        let attempt = {
            let mut attempts = self.attempts.lock().unwrap();
            let n = attempts.entry(request.id.clone()).or_insert(0);
            *n += 1;
            *n
        };
        self.calls
            .lock()
            .unwrap()
            .push((request.id.clone(), Instant::now()));

        let latency = (self.latency)(request);
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        (self.script)(request, attempt)
    }
}

pub fn get_requests(n: usize) -> Vec<Request> {
    (0..n)
        .map(|i| Request::get(i, format!("https://api.example.com/items/{}", i)).unwrap())
        .collect()
}
