//! Chunk-level retry decisions.

use std::time::Duration;

/// What to do after a chunk was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Retry { delay: Duration },
    Fail,
}

/// Fixed-backoff retry policy applied to whole chunks.
///
/// - `retry_count` is the number of retries already spent on the current chunk.
/// - A chunk is attempted at most `max_retry + 1` times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retry: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_retry: u32, backoff: Duration) -> Self {
        Self { max_retry, backoff }
    }

    /// Backoff is never shorter than the pacing interval.
    pub fn with_min_backoff(mut self, floor: Duration) -> Self {
        self.backoff = self.backoff.max(floor);
        self
    }

    pub fn decide(&self, retry_count: u32) -> Decision {
        if retry_count < self.max_retry {
            Decision::Retry {
                delay: self.backoff,
            }
        } else {
            Decision::Fail
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_retry.saturating_add(1)
    }
}
