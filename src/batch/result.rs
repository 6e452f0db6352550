//! Dispatch results.

use super::verdict::RejectReason;
use crate::types::{Outcome, RequestId, Response};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Terminal status of a dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BatchStatus {
    Success,
    /// The chunk at `chunk_index` was rejected on every one of its `attempts`.
    PartialFailure {
        chunk_index: usize,
        attempts: u32,
        reason: RejectReason,
    },
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchStatus::Success => f.write_str("success"),
            BatchStatus::PartialFailure { reason, .. } => write!(f, "{}", reason),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DispatchStats {
    pub chunks_total: usize,
    pub chunks_committed: usize,
    /// Chunk attempts made, retries included.
    pub attempts: u32,
    pub retries: u32,
}

/// Accumulated responses plus terminal status.
///
/// `results` only ever contains whole accepted chunks: on failure it holds
/// exactly the chunks accepted before the failing one.
#[derive(Debug, Clone)]
pub struct BatchResult {
    pub results: HashMap<RequestId, Response>,
    /// Request ids in the order their chunks were committed. Within a chunk the
    /// order is completion-independent (submission order).
    pub commit_order: Vec<RequestId>,
    pub status: BatchStatus,
    pub stats: DispatchStats,
}

impl BatchResult {
    pub(crate) fn new(chunks_total: usize) -> Self {
        Self {
            results: HashMap::new(),
            commit_order: Vec::new(),
            status: BatchStatus::Success,
            stats: DispatchStats {
                chunks_total,
                ..DispatchStats::default()
            },
        }
    }

    /// Merge one accepted chunk.
    pub(crate) fn commit(&mut self, outcomes: Vec<(RequestId, Outcome)>) {
        for (id, outcome) in outcomes {
            if let Some(response) = outcome.into_response() {
                self.commit_order.push(id.clone());
                self.results.insert(id, response);
            }
        }
        self.stats.chunks_committed += 1;
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, BatchStatus::Success)
    }

    /// `"success"` or the failure description.
    pub fn status_message(&self) -> String {
        self.status.to_string()
    }

    pub fn get(&self, id: &RequestId) -> Option<&Response> {
        self.results.get(id)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Responses in commit order.
    pub fn into_ordered(mut self) -> Vec<(RequestId, Response)> {
        self.commit_order
            .into_iter()
            .filter_map(|id| self.results.remove(&id).map(|r| (id, r)))
            .collect()
    }
}
