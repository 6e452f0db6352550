//! Dispatch policy: acceptable status codes, retry limit, rate limit.

use crate::resilience::retry::RetryPolicy;
use crate::{Error, ErrorContext, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

/// Exact status codes that make a response acceptable.
///
/// Membership test only; there is no range matching, so `200` does not imply
/// `201`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AcceptCodes(HashSet<u16>);

impl AcceptCodes {
    pub fn new(codes: impl IntoIterator<Item = u16>) -> Self {
        Self(codes.into_iter().collect())
    }

    pub fn contains(&self, code: u16) -> bool {
        self.0.contains(&code)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = u16> + '_ {
        self.0.iter().copied()
    }
}

impl Default for AcceptCodes {
    fn default() -> Self {
        Self::new([200])
    }
}

impl FromIterator<u16> for AcceptCodes {
    fn from_iter<I: IntoIterator<Item = u16>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// `count` requests per chunk; consecutive accepted chunks start at least
/// `interval_seconds` apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateLimit {
    pub count: usize,
    pub interval_seconds: f64,
}

impl RateLimit {
    pub fn new(count: usize, interval_seconds: f64) -> Self {
        Self {
            count,
            interval_seconds,
        }
    }
}

impl Default for RateLimit {
    fn default() -> Self {
        Self {
            count: 10,
            interval_seconds: 1.0,
        }
    }
}

/// Caller-supplied policy for one `dispatch` call.
///
/// Defaults: accept `{200}`, `max_retry = 3`, `rate_limit = (10, 1s)`,
/// `retry_backoff_seconds = 30`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchPolicy {
    pub accept_codes: AcceptCodes,
    pub max_retry: u32,
    pub rate_limit: RateLimit,
    /// Fixed delay before re-attempting a rejected chunk. Raised to
    /// `rate_limit.interval_seconds` when shorter.
    pub retry_backoff_seconds: f64,
}

impl Default for DispatchPolicy {
    fn default() -> Self {
        Self {
            accept_codes: AcceptCodes::default(),
            max_retry: 3,
            rate_limit: RateLimit::default(),
            retry_backoff_seconds: 30.0,
        }
    }
}

/// Policy after validation, in the units the dispatcher works with.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedPolicy {
    pub chunk_size: usize,
    pub interval: Duration,
    pub accept_codes: AcceptCodes,
    pub retry: RetryPolicy,
}

fn seconds(value: f64, field: &str) -> Result<Duration> {
    Duration::try_from_secs_f64(value).map_err(|_| {
        Error::configuration_with_context(
            format!("{} must be a finite, non-negative number of seconds", field),
            ErrorContext::new()
                .with_field_path(format!("policy.{}", field))
                .with_details(format!("got {}", value))
                .with_source("policy_validator"),
        )
    })
}

impl DispatchPolicy {
    pub fn new(accept_codes: impl IntoIterator<Item = u16>) -> Self {
        Self {
            accept_codes: AcceptCodes::new(accept_codes),
            ..Self::default()
        }
    }

    pub fn with_max_retry(mut self, max_retry: u32) -> Self {
        self.max_retry = max_retry;
        self
    }

    pub fn with_rate_limit(mut self, count: usize, interval_seconds: f64) -> Self {
        self.rate_limit = RateLimit::new(count, interval_seconds);
        self
    }

    pub fn with_retry_backoff_seconds(mut self, seconds: f64) -> Self {
        self.retry_backoff_seconds = seconds;
        self
    }

    /// Fail fast on a policy that cannot be executed.
    pub fn validate(&self) -> Result<()> {
        self.resolve().map(|_| ())
    }

    pub(crate) fn resolve(&self) -> Result<ResolvedPolicy> {
        if self.rate_limit.count == 0 {
            return Err(Error::configuration_with_context(
                "chunk size must be at least 1",
                ErrorContext::new()
                    .with_field_path("policy.rate_limit.count")
                    .with_source("policy_validator"),
            ));
        }
        if self.accept_codes.is_empty() {
            return Err(Error::configuration_with_context(
                "at least one acceptable status code is required",
                ErrorContext::new()
                    .with_field_path("policy.accept_codes")
                    .with_source("policy_validator"),
            ));
        }
        let interval = seconds(self.rate_limit.interval_seconds, "rate_limit.interval_seconds")?;
        let backoff = seconds(self.retry_backoff_seconds, "retry_backoff_seconds")?;

        Ok(ResolvedPolicy {
            chunk_size: self.rate_limit.count,
            interval,
            accept_codes: self.accept_codes.clone(),
            retry: RetryPolicy::new(self.max_retry, backoff).with_min_backoff(interval),
        })
    }
}
