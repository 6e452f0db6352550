//! 类型系统模块：定义批量请求调度的核心数据类型。
//!
//! # Types Module
//!
//! This module defines the records that flow through the dispatcher: what the
//! caller submits and what a single request attempt produces.
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Request`] | Immutable request record keyed by a caller-chosen [`RequestId`] |
//! | [`Method`] | Supported HTTP methods (GET, POST) |
//! | [`RequestBody`] | Raw bytes, JSON value, or form mapping |
//! | [`Response`] | Completed HTTP exchange: status code and body |
//! | [`Outcome`] | Result of one attempt: success or transport failure |
//! | [`FailureKind`] | Coarse classification of a transport failure |
//!
//! ## Example
//!
//! ```rust
//! use fast_requests::types::{Request, RequestBody};
//!
//! let lookup = Request::get("doi-1", "https://api.example.com/v2/10.1000/182")?
//!     .with_param("email", "me@example.com");
//! let submit = Request::post("job-1", "https://api.example.com/jobs")?
//!     .with_header("x-api-key", "secret")
//!     .with_body(RequestBody::json(serde_json::json!({"name": "nightly"})));
//! # Ok::<(), fast_requests::Error>(())
//! ```

pub mod request;
pub mod response;

pub use request::{Method, Request, RequestBody, RequestId};
pub use response::{FailureKind, Outcome, Response};
