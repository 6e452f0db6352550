//! # fast-requests
//!
//! 有界并发的 HTTP 批量调度器：分块发送、节流、整块重试。
//!
//! Bounded-concurrency HTTP batch dispatcher. Given a list of requests it issues
//! them in fixed-size chunks, keeps a minimum interval between chunk starts,
//! collects responses keyed by a caller-supplied id, retries rejected chunks up
//! to a limit, and reports either everything it collected or why it stopped.
//!
//! ## Core Guarantees
//!
//! - **Chunk atomicity**: a chunk's responses are merged all at once or not at all
//! - **Ordered commits**: chunks are committed strictly in submission order
//! - **Bounded retries**: a chunk is attempted at most `max_retry + 1` times
//! - **Pacing**: consecutive accepted chunks start at least `interval_seconds` apart
//! - **No surprise errors**: runtime failures come back as a [`batch::BatchStatus`],
//!   alongside the partial results, never as an `Err`
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fast_requests::{DispatchPolicy, Dispatcher, Request};
//!
//! #[tokio::main]
//! async fn main() -> fast_requests::Result<()> {
//!     let dispatcher = Dispatcher::new()?;
//!
//!     let dois = ["10.1000/182", "10.1038/nphys1170"];
//!     let requests = dois
//!         .iter()
//!         .map(|doi| {
//!             Request::get(*doi, format!("https://api.unpaywall.org/v2/{}", doi))
//!                 .map(|r| r.with_param("email", "me@example.com"))
//!         })
//!         .collect::<fast_requests::Result<Vec<_>>>()?;
//!
//!     let policy = DispatchPolicy::new([200]).with_max_retry(3).with_rate_limit(5, 1.0);
//!     let (result, elapsed) = dispatcher.dispatch_timed(requests, &policy).await?;
//!     println!("{} in {:?}: {}", result.len(), elapsed, result.status_message());
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`types`] | Request, response and outcome records |
//! | [`transport`] | Transport adapter trait and the reqwest-backed implementation |
//! | [`batch`] | Chunk planning, verdicts, state machine and the dispatcher |
//! | [`resilience`] | Pacing and retry policy |
//! | [`telemetry`] | Dispatch events, observers and timing |

pub mod batch;
pub mod resilience;
pub mod telemetry;
pub mod transport;
pub mod types;

// Re-export main types for convenience
pub use batch::{BatchResult, BatchStatus, DispatchPolicy, Dispatcher, DispatcherBuilder, RateLimit};
pub use transport::{HttpTransport, HttpTransportConfig, Transport, TransportError};
pub use types::{Method, Outcome, Request, RequestBody, RequestId, Response};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
