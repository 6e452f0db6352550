//! Chunk outcome classification.

use super::policy::AcceptCodes;
use crate::types::{FailureKind, Outcome};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// Why a chunk was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RejectReason {
    /// Distinct offending status codes, ascending.
    UnacceptableStatus { codes: Vec<u16> },
    /// At least one request never produced a response. `kind` and `cause`
    /// describe the first failure in chunk order.
    TransportFailure {
        failures: usize,
        kind: FailureKind,
        cause: String,
    },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::UnacceptableStatus { codes } => {
                write!(f, "unacceptable status codes: {:?}", codes)
            }
            RejectReason::TransportFailure {
                failures,
                kind,
                cause,
            } => {
                write!(f, "transport error ({}): {}", kind, cause)?;
                if *failures > 1 {
                    write!(f, " (+{} more)", failures - 1)?;
                }
                Ok(())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkVerdict {
    Accepted,
    Rejected(RejectReason),
}

impl ChunkVerdict {
    /// Classify a completed chunk.
    ///
    /// Transport failures take precedence over unacceptable codes: a chunk with
    /// both is reported as a transport failure.
    pub fn classify<'a>(
        outcomes: impl IntoIterator<Item = &'a Outcome>,
        accept_codes: &AcceptCodes,
    ) -> Self {
        let mut first_failure: Option<(FailureKind, &str)> = None;
        let mut failures = 0usize;
        let mut bad_codes = BTreeSet::new();

        for outcome in outcomes {
            match outcome {
                Outcome::Success(resp) => {
                    if !accept_codes.contains(resp.status_code) {
                        bad_codes.insert(resp.status_code);
                    }
                }
                Outcome::TransportFailure { kind, cause } => {
                    failures += 1;
                    first_failure.get_or_insert((*kind, cause.as_str()));
                }
            }
        }

        if let Some((kind, cause)) = first_failure {
            return ChunkVerdict::Rejected(RejectReason::TransportFailure {
                failures,
                kind,
                cause: cause.to_string(),
            });
        }
        if !bad_codes.is_empty() {
            return ChunkVerdict::Rejected(RejectReason::UnacceptableStatus {
                codes: bad_codes.into_iter().collect(),
            });
        }
        ChunkVerdict::Accepted
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, ChunkVerdict::Accepted)
    }
}
