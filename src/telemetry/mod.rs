//! 遥测模块：调度事件、观察者接口以及整体耗时计量。
//!
//! # Telemetry Module
//!
//! Application-controlled observation of a dispatch run. Nothing is collected
//! unless an observer is installed on the dispatcher.
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`DispatchEvent`] | Typed event emitted at each state-machine transition |
//! | [`DispatchObserver`] | Trait for event destinations |
//! | [`NoopObserver`] | Default observer (no collection) |
//! | [`InMemoryObserver`] | Bounded in-memory observer for tests and inspection |
//! | [`TracingObserver`] | Forwards events to `tracing` |
//! | [`timed`] | Measures the wall-clock duration of a future |

use crate::batch::RejectReason;
use crate::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

/// Lifecycle events of a single `dispatch` call, in emission order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DispatchEvent {
    ChunkStarted {
        batch_id: String,
        chunk_index: usize,
        /// 1-based attempt number for this chunk.
        attempt: u32,
        size: usize,
    },
    ChunkAccepted {
        batch_id: String,
        chunk_index: usize,
        attempt: u32,
        duration_ms: u64,
    },
    ChunkRejected {
        batch_id: String,
        chunk_index: usize,
        attempt: u32,
        reason: RejectReason,
    },
    RetryScheduled {
        batch_id: String,
        chunk_index: usize,
        retry_count: u32,
        delay_ms: u64,
    },
    BatchFinished {
        batch_id: String,
        status: String,
        chunks_committed: usize,
        attempts: u32,
        duration_ms: u64,
    },
}

impl DispatchEvent {
    pub fn batch_id(&self) -> &str {
        match self {
            DispatchEvent::ChunkStarted { batch_id, .. }
            | DispatchEvent::ChunkAccepted { batch_id, .. }
            | DispatchEvent::ChunkRejected { batch_id, .. }
            | DispatchEvent::RetryScheduled { batch_id, .. }
            | DispatchEvent::BatchFinished { batch_id, .. } => batch_id,
        }
    }

    pub fn chunk_index(&self) -> Option<usize> {
        match self {
            DispatchEvent::ChunkStarted { chunk_index, .. }
            | DispatchEvent::ChunkAccepted { chunk_index, .. }
            | DispatchEvent::ChunkRejected { chunk_index, .. }
            | DispatchEvent::RetryScheduled { chunk_index, .. } => Some(*chunk_index),
            DispatchEvent::BatchFinished { .. } => None,
        }
    }
}

/// Destination for dispatch events.
///
/// Errors returned by an observer are logged and otherwise ignored; they never
/// affect the dispatch outcome.
#[async_trait]
pub trait DispatchObserver: Send + Sync {
    async fn report(&self, event: DispatchEvent) -> Result<()>;
}

/// No-op observer (always available).
pub struct NoopObserver;

#[async_trait]
impl DispatchObserver for NoopObserver {
    async fn report(&self, _: DispatchEvent) -> Result<()> {
        Ok(())
    }
}

pub fn noop_observer() -> Arc<dyn DispatchObserver> {
    Arc::new(NoopObserver)
}

/// In-memory observer for testing.
pub struct InMemoryObserver {
    events: Mutex<Vec<DispatchEvent>>,
    max_events: usize,
}

impl InMemoryObserver {
    pub fn new(max: usize) -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            max_events: max,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<DispatchEvent>> {
        self.events.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn events(&self) -> Vec<DispatchEvent> {
        self.lock().clone()
    }

    pub fn events_for_chunk(&self, chunk_index: usize) -> Vec<DispatchEvent> {
        self.lock()
            .iter()
            .filter(|e| e.chunk_index() == Some(chunk_index))
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryObserver {
    fn default() -> Self {
        Self::new(10_000)
    }
}

#[async_trait]
impl DispatchObserver for InMemoryObserver {
    async fn report(&self, event: DispatchEvent) -> Result<()> {
        let mut events = self.lock();
        events.push(event);
        if events.len() > self.max_events {
            events.remove(0);
        }
        Ok(())
    }
}

/// Observer that re-emits events as `tracing` records.
#[derive(Default)]
pub struct TracingObserver;

#[async_trait]
impl DispatchObserver for TracingObserver {
    async fn report(&self, event: DispatchEvent) -> Result<()> {
        match serde_json::to_string(&event) {
            Ok(json) => tracing::info!(target: "fast_requests::events", event = %json),
            Err(e) => tracing::debug!(error = %e, "failed to serialize dispatch event"),
        }
        Ok(())
    }
}

/// Run `fut` and report how long it took.
///
/// ```rust
/// # async fn run() {
/// let (value, elapsed) = fast_requests::telemetry::timed(async { 42 }).await;
/// assert_eq!(value, 42);
/// # let _ = elapsed;
/// # }
/// ```
pub async fn timed<F: Future>(fut: F) -> (F::Output, Duration) {
    let start = Instant::now();
    let out = fut.await;
    (out, start.elapsed())
}
