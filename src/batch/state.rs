//! Per-batch dispatch state machine.
//!
//! ```text
//! Dispatching(i, r) --Accepted, more chunks-->    Dispatching(i + 1, 0)
//! Dispatching(i, r) --Accepted, last chunk-->     Completed
//! Dispatching(i, r) --Rejected, r < max_retry-->  Dispatching(i, r + 1)
//! Dispatching(i, r) --Rejected, r == max_retry--> Exhausted(i)
//! ```
//!
//! Transitions are pure; the dispatcher performs the I/O and the sleeps that
//! each [`Step`] asks for.

use super::verdict::{ChunkVerdict, RejectReason};
use crate::resilience::retry::{Decision, RetryPolicy};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    Dispatching { chunk_index: usize, retry_count: u32 },
    /// Every chunk was accepted.
    Completed,
    /// The chunk at `chunk_index` was rejected `max_retry + 1` times.
    Exhausted { chunk_index: usize },
}

/// Side effect requested by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Merge the chunk's outcomes into the results.
    Commit,
    /// Discard the attempt and wait `delay` before retrying the same chunk.
    Retry { delay: Duration, reason: RejectReason },
    /// Discard the attempt and stop.
    Abort { reason: RejectReason },
    /// The state was already terminal; nothing to do.
    Halt,
}

impl DispatchState {
    pub fn initial(total_chunks: usize) -> Self {
        if total_chunks == 0 {
            DispatchState::Completed
        } else {
            DispatchState::Dispatching {
                chunk_index: 0,
                retry_count: 0,
            }
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, DispatchState::Dispatching { .. })
    }

    /// Apply a chunk verdict. Terminal states ignore it and yield [`Step::Halt`].
    pub fn step(
        self,
        verdict: ChunkVerdict,
        total_chunks: usize,
        retry: &RetryPolicy,
    ) -> (DispatchState, Step) {
        let (chunk_index, retry_count) = match self {
            DispatchState::Dispatching {
                chunk_index,
                retry_count,
            } => (chunk_index, retry_count),
            terminal => return (terminal, Step::Halt),
        };

        match verdict {
            ChunkVerdict::Accepted => {
                let next = if chunk_index + 1 < total_chunks {
                    DispatchState::Dispatching {
                        chunk_index: chunk_index + 1,
                        retry_count: 0,
                    }
                } else {
                    DispatchState::Completed
                };
                (next, Step::Commit)
            }
            ChunkVerdict::Rejected(reason) => match retry.decide(retry_count) {
                Decision::Retry { delay } => (
                    DispatchState::Dispatching {
                        chunk_index,
                        retry_count: retry_count + 1,
                    },
                    Step::Retry { delay, reason },
                ),
                Decision::Fail => (DispatchState::Exhausted { chunk_index }, Step::Abort { reason }),
            },
        }
    }
}
