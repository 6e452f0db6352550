//! 弹性模式模块：提供分块节流和整块重试的决策机制。
//!
//! # Resilience Primitives Module
//!
//! Pacing and retry policy used by the batch dispatcher.
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`pacer`] | Enforces a minimum interval between the starts of accepted chunks |
//! | [`retry`] | Decides between retrying a rejected chunk and giving up |
//!
//! ## Pacer
//!
//! ```rust
//! use fast_requests::resilience::pacer::Pacer;
//! use std::time::Duration;
//!
//! # async fn run() {
//! let pacer = Pacer::new(Duration::from_secs(1));
//! let started = tokio::time::Instant::now();
//! // ... run a chunk ...
//! pacer.wait_from(started).await; // returns once >= 1s has passed since `started`
//! # }
//! ```
//!
//! ## Retry Policy
//!
//! ```rust
//! use fast_requests::resilience::retry::{Decision, RetryPolicy};
//! use std::time::Duration;
//!
//! let policy = RetryPolicy::new(1, Duration::from_secs(30));
//! assert!(matches!(policy.decide(0), Decision::Retry { .. }));
//! assert_eq!(policy.decide(1), Decision::Fail);
//! ```

pub mod pacer;
pub mod retry;
