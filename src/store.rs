//! Backend interfaces for the pipeline's external collaborators.
//!
//! Each store is a narrow async trait so deployments can plug in real
//! infrastructure (S3-style object store, key/value metadata table,
//! memcached-style existence cache, SQS-style queue) while tests and local
//! runs use the in-memory backends in [`memory`].

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::foundation::core::{GenerationMetadata, GenerationRequest};

pub mod memory;

/// Errors surfaced by store backends.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The keyed item does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    /// The backend could not be reached or answered with a failure.
    ///
    /// A timeout is reported here, never treated as silent success.
    #[error("backend unavailable: {0}")]
    Unavailable(String),
    /// Anything else from the backend client.
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

/// Convenience result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Key -> bytes blob storage with time-limited retrieval URLs.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` under `key`, overwriting any existing object.
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> StoreResult<()>;

    /// Delete the object under `key`, if present.
    async fn delete(&self, key: &str) -> StoreResult<()>;

    /// Produce a retrieval URL for `key` valid for `ttl`.
    async fn presigned_get_url(&self, key: &str, ttl: Duration) -> StoreResult<String>;
}

/// Key -> structured record storage for generation metadata.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Record metadata for a published artifact (write-once per file key;
    /// re-publishing the same key overwrites the same record).
    async fn put(&self, record: GenerationMetadata) -> StoreResult<()>;

    /// Fetch the record for `file_key`, if any.
    async fn get(&self, file_key: &str) -> StoreResult<Option<GenerationMetadata>>;
}

/// Presence-flag store with TTL and an atomic claim primitive.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Mark `key` present for `ttl`.
    async fn set(&self, key: &str, ttl: Duration) -> StoreResult<()>;

    /// True if `key` is currently present.
    async fn get(&self, key: &str) -> StoreResult<bool>;

    /// Atomically mark `key` present for `ttl` only if it is absent.
    ///
    /// Returns true when this caller won the insert. The single-flight claim
    /// in the cache gate is built on this.
    async fn set_if_absent(&self, key: &str, ttl: Duration) -> StoreResult<bool>;
}

/// A received task plus the receipt needed to acknowledge it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LeasedTask {
    /// Backend receipt identifying this delivery.
    pub receipt: u64,
    /// The render request carried by the task.
    pub request: GenerationRequest,
}

/// At-least-once task queue with visibility timeouts.
#[async_trait]
pub trait TaskQueue: Send + Sync {
    /// Enqueue a render request.
    async fn send(&self, request: GenerationRequest) -> StoreResult<()>;

    /// Receive up to `max` visible tasks, waiting up to `wait` for at least
    /// one. Received tasks become invisible for the backend's visibility
    /// timeout; unacknowledged tasks are redelivered after it lapses.
    async fn receive_batch(&self, max: usize, wait: Duration) -> StoreResult<Vec<LeasedTask>>;

    /// Acknowledge a task, removing it permanently.
    async fn delete(&self, task: &LeasedTask) -> StoreResult<()>;
}
