//! Chunk partitioning.

use crate::types::{Request, RequestId};
use crate::{Error, ErrorContext, Result};
use std::collections::HashSet;
use std::sync::Arc;

/// Ordered partition of a request set into contiguous chunks.
///
/// Built once per dispatch; chunks are never reordered or split afterwards.
/// Requests are held behind `Arc` so every attempt of a chunk shares them.
#[derive(Debug, Clone)]
pub struct ChunkPlan {
    requests: Vec<Arc<Request>>,
    chunk_size: usize,
}

impl ChunkPlan {
    /// Validate `requests` and partition them into chunks of `chunk_size`.
    ///
    /// Rejects a zero chunk size, duplicate ids, and malformed requests.
    pub fn new(requests: Vec<Request>, chunk_size: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::configuration_with_context(
                "chunk size must be at least 1",
                ErrorContext::new()
                    .with_field_path("policy.rate_limit.count")
                    .with_source("chunk_plan"),
            ));
        }

        let mut seen: HashSet<&RequestId> = HashSet::with_capacity(requests.len());
        for (i, req) in requests.iter().enumerate() {
            req.validate()?;
            if !seen.insert(&req.id) {
                return Err(Error::validation_with_context(
                    format!("duplicate request id '{}'", req.id),
                    ErrorContext::new()
                        .with_field_path(format!("requests[{}].id", i))
                        .with_source("chunk_plan"),
                ));
            }
        }

        Ok(Self {
            requests: requests.into_iter().map(Arc::new).collect(),
            chunk_size,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn request_count(&self) -> usize {
        self.requests.len()
    }

    /// Number of chunks.
    pub fn len(&self) -> usize {
        self.requests.len().div_ceil(self.chunk_size)
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn chunk(&self, index: usize) -> Option<&[Arc<Request>]> {
        self.requests.chunks(self.chunk_size).nth(index)
    }

    pub fn chunks(&self) -> impl Iterator<Item = &[Arc<Request>]> {
        self.requests.chunks(self.chunk_size)
    }

    pub fn chunk_sizes(&self) -> Vec<usize> {
        self.chunks().map(<[_]>::len).collect()
    }
}
