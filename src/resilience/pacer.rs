use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone)]
pub struct PacerSnapshot {
    pub interval: Duration,
    /// Time left before the next chunk may start, measured from `started`.
    pub remaining: Duration,
}

/// Minimum spacing between consecutive chunk starts.
///
/// Only consulted after a chunk is accepted; rejected chunks wait out the
/// retry backoff instead. Uses the tokio clock so paused-time tests advance
/// it deterministically.
#[derive(Debug, Clone)]
pub struct Pacer {
    interval: Duration,
}

impl Pacer {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// `max(0, interval - elapsed_since(started))`
    pub fn remaining(&self, started: Instant) -> Duration {
        self.interval.saturating_sub(started.elapsed())
    }

    /// Sleep until at least `interval` has passed since `started`.
    ///
    /// Intervals past the clock's range sleep until tokio's far-future deadline.
    pub async fn wait_from(&self, started: Instant) {
        let remaining = self.remaining(started);
        if remaining.is_zero() {
            return;
        }
        tokio::time::sleep(remaining).await;
    }

    pub fn snapshot(&self, started: Instant) -> PacerSnapshot {
        PacerSnapshot {
            interval: self.interval,
            remaining: self.remaining(started),
        }
    }
}
