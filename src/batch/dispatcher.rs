//! Batch dispatcher.

use super::builder::DispatcherBuilder;
use super::chunk::ChunkPlan;
use super::policy::{DispatchPolicy, ResolvedPolicy};
use super::result::{BatchResult, BatchStatus};
use super::state::{DispatchState, Step};
use super::verdict::ChunkVerdict;
use crate::resilience::pacer::Pacer;
use crate::telemetry::{timed, DispatchEvent, DispatchObserver};
use crate::transport::Transport;
use crate::types::{FailureKind, Outcome, Request, RequestId};
use crate::Result;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

/// Issues request batches chunk by chunk.
///
/// One dispatcher can serve many `dispatch` calls; they share the transport's
/// connection pool and the worker permits that bound in-flight requests.
pub struct Dispatcher {
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) workers: Arc<Semaphore>,
    pub(crate) max_workers: usize,
    pub(crate) observer: Arc<dyn DispatchObserver>,
}

impl Dispatcher {
    /// Dispatcher over an [`crate::transport::HttpTransport`] configured from the environment.
    pub fn new() -> Result<Self> {
        DispatcherBuilder::new().build()
    }

    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::new()
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Worker permits not currently held by an in-flight request.
    pub fn available_workers(&self) -> usize {
        self.workers.available_permits()
    }

    /// Dispatch `requests` under `policy`.
    ///
    /// Returns `Err` only for an invalid policy or request set, before any
    /// request is sent. Rejected chunks and exhausted retries are reported in
    /// [`BatchResult::status`] together with everything accepted so far.
    pub async fn dispatch(&self, requests: Vec<Request>, policy: &DispatchPolicy) -> Result<BatchResult> {
        let resolved = policy.resolve()?;
        let plan = ChunkPlan::new(requests, resolved.chunk_size)?;
        let batch_id = Uuid::new_v4().to_string();
        let span = info_span!(
            "dispatch",
            batch_id = batch_id.as_str(),
            requests = plan.request_count(),
            chunks = plan.len(),
        );
        Ok(self.run(plan, resolved, batch_id).instrument(span).await)
    }

    /// [`Dispatcher::dispatch`] plus the wall-clock duration of the whole call.
    pub async fn dispatch_timed(
        &self,
        requests: Vec<Request>,
        policy: &DispatchPolicy,
    ) -> Result<(BatchResult, Duration)> {
        let (result, elapsed) = timed(self.dispatch(requests, policy)).await;
        Ok((result?, elapsed))
    }

    async fn run(&self, plan: ChunkPlan, policy: ResolvedPolicy, batch_id: String) -> BatchResult {
        let started = Instant::now();
        let pacer = Pacer::new(policy.interval);
        let total = plan.len();
        let mut result = BatchResult::new(total);
        let mut state = DispatchState::initial(total);

        while let DispatchState::Dispatching {
            chunk_index,
            retry_count,
        } = state
        {
            let Some(chunk) = plan.chunk(chunk_index) else {
                break;
            };
            let attempt = retry_count + 1;
            let chunk_started = Instant::now();
            result.stats.attempts += 1;

            debug!(chunk_index, attempt, size = chunk.len(), "dispatching chunk");
            self.emit(DispatchEvent::ChunkStarted {
                batch_id: batch_id.clone(),
                chunk_index,
                attempt,
                size: chunk.len(),
            })
            .await;

            let outcomes = self.run_chunk(chunk).await;
            let verdict = ChunkVerdict::classify(outcomes.iter().map(|(_, o)| o), &policy.accept_codes);
            let (next, step) = state.step(verdict, total, &policy.retry);

            match step {
                Step::Commit => {
                    result.commit(outcomes);
                    self.emit(DispatchEvent::ChunkAccepted {
                        batch_id: batch_id.clone(),
                        chunk_index,
                        attempt,
                        duration_ms: millis(chunk_started.elapsed()),
                    })
                    .await;
                    if !next.is_terminal() {
                        pacer.wait_from(chunk_started).await;
                    }
                }
                Step::Retry { delay, reason } => {
                    result.stats.retries += 1;
                    warn!(
                        chunk_index,
                        attempt,
                        reason = %reason,
                        delay_ms = millis(delay),
                        "chunk rejected, retrying"
                    );
                    self.emit(DispatchEvent::ChunkRejected {
                        batch_id: batch_id.clone(),
                        chunk_index,
                        attempt,
                        reason,
                    })
                    .await;
                    self.emit(DispatchEvent::RetryScheduled {
                        batch_id: batch_id.clone(),
                        chunk_index,
                        retry_count: retry_count + 1,
                        delay_ms: millis(delay),
                    })
                    .await;
                    tokio::time::sleep(delay).await;
                }
                Step::Abort { reason } => {
                    warn!(
                        chunk_index,
                        attempts = attempt,
                        reason = %reason,
                        "chunk rejected, retries exhausted"
                    );
                    self.emit(DispatchEvent::ChunkRejected {
                        batch_id: batch_id.clone(),
                        chunk_index,
                        attempt,
                        reason: reason.clone(),
                    })
                    .await;
                    result.status = BatchStatus::PartialFailure {
                        chunk_index,
                        attempts: attempt,
                        reason,
                    };
                }
                Step::Halt => {}
            }
            state = next;
        }

        let duration_ms = millis(started.elapsed());
        info!(
            status = %result.status,
            committed = result.stats.chunks_committed,
            attempts = result.stats.attempts,
            responses = result.len(),
            duration_ms,
            "dispatch finished"
        );
        self.emit(DispatchEvent::BatchFinished {
            batch_id,
            status: result.status_message(),
            chunks_committed: result.stats.chunks_committed,
            attempts: result.stats.attempts,
            duration_ms,
        })
        .await;

        result
    }

    /// Run every request of a chunk concurrently and wait for all of them.
    ///
    /// Each request gets its own task; the id stays beside the handle and is
    /// zipped back onto the outcome after the join.
    async fn run_chunk(&self, chunk: &[Arc<Request>]) -> Vec<(RequestId, Outcome)> {
        let handles: Vec<(RequestId, JoinHandle<Outcome>)> = chunk
            .iter()
            .map(|request| {
                let transport = Arc::clone(&self.transport);
                let workers = Arc::clone(&self.workers);
                let request = Arc::clone(request);
                let id = request.id.clone();
                let handle = tokio::spawn(
                    async move {
                        let _permit = match workers.acquire_owned().await {
                            Ok(permit) => permit,
                            Err(_) => {
                                return Outcome::transport_failure(FailureKind::Other, "worker pool closed")
                            }
                        };
                        transport.execute(&request).await
                    }
                    .in_current_span(),
                );
                (id, handle)
            })
            .collect();

        join_all(handles.into_iter().map(|(id, handle)| async move {
            let outcome = handle.await.unwrap_or_else(|e| {
                Outcome::transport_failure(FailureKind::Other, format!("request task failed: {}", e))
            });
            (id, outcome)
        }))
        .await
    }

    async fn emit(&self, event: DispatchEvent) {
        if let Err(e) = self.observer.report(event).await {
            debug!(error = %e, "dispatch observer failed");
        }
    }
}
