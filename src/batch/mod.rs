//! 批量调度模块：分块发送请求、节流、整块重试与结果累积。
//!
//! # Batch Dispatch Module
//!
//! Issues a list of requests in fixed-size chunks. Each chunk runs
//! concurrently; chunks run strictly one after another.
//!
//! ## Overview
//!
//! For every chunk, in submission order:
//! 1. fan out all requests and wait for every one of them,
//! 2. classify the chunk ([`ChunkVerdict`]),
//! 3. on acceptance merge the responses, then pace the next chunk start,
//! 4. on rejection back off and retry the same chunk, or stop once
//!    `max_retry` retries are spent.
//!
//! A rejected attempt never leaks into the results, so the caller sees either
//! every response of a chunk or none of them.
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`Dispatcher`] | Runs the chunk loop over a shared transport and worker pool |
//! | [`DispatcherBuilder`] | Worker count, transport, observer |
//! | [`DispatchPolicy`] | Acceptable codes, retry limit, rate limit, backoff |
//! | [`ChunkPlan`] | Validated, ordered partition of the request set |
//! | [`ChunkVerdict`] | Accepted / rejected classification of a chunk |
//! | [`DispatchState`] | Per-batch state machine |
//! | [`BatchResult`] | Accumulated responses and terminal [`BatchStatus`] |
//!
//! ## Example
//!
//! ```rust,no_run
//! use fast_requests::batch::{DispatchPolicy, Dispatcher};
//! use fast_requests::types::Request;
//!
//! # async fn run() -> fast_requests::Result<()> {
//! let dispatcher = Dispatcher::builder().max_workers(8).build()?;
//! let requests = (0..25)
//!     .map(|i| Request::get(i, format!("https://api.example.com/items/{}", i)))
//!     .collect::<fast_requests::Result<Vec<_>>>()?;
//!
//! let policy = DispatchPolicy::new([200]).with_max_retry(3).with_rate_limit(5, 1.0);
//! let result = dispatcher.dispatch(requests, &policy).await?;
//! println!("{} responses, status: {}", result.len(), result.status_message());
//! # Ok(())
//! # }
//! ```

mod builder;
mod chunk;
mod dispatcher;
mod policy;
mod result;
mod state;
mod verdict;

pub use builder::{DispatcherBuilder, DEFAULT_MAX_WORKERS};
pub use chunk::ChunkPlan;
pub use dispatcher::Dispatcher;
pub use policy::{AcceptCodes, DispatchPolicy, RateLimit};
pub use result::{BatchResult, BatchStatus, DispatchStats};
pub use state::{DispatchState, Step};
pub use verdict::{ChunkVerdict, RejectReason};
