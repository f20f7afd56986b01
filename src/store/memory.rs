//! In-memory store backends.
//!
//! Not durable and not shared across processes; they exist for tests, local
//! development, and as the reference semantics for real backends (TTL expiry
//! on the cache, visibility timeouts on the queue).

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::sync::Mutex;

use crate::foundation::core::{GenerationMetadata, GenerationRequest};
use crate::store::{
    CacheStore, LeasedTask, MetadataStore, ObjectStore, StoreError, StoreResult, TaskQueue,
};

#[derive(Clone, Debug)]
struct StoredObject {
    bytes: Vec<u8>,
    content_type: String,
}

/// In-memory object store.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: DashMap<String, StoredObject>,
}

impl MemoryObjectStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects (test observability).
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// True when no objects are stored.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Raw bytes under `key`, if present (test observability).
    pub fn bytes(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.get(key).map(|o| o.bytes.clone())
    }

    /// Content type recorded for `key`, if present.
    pub fn content_type(&self, key: &str) -> Option<String> {
        self.objects.get(key).map(|o| o.content_type.clone())
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> StoreResult<()> {
        self.objects.insert(
            key.to_string(),
            StoredObject {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        self.objects.remove(key);
        Ok(())
    }

    async fn presigned_get_url(&self, key: &str, ttl: Duration) -> StoreResult<String> {
        if !self.objects.contains_key(key) {
            return Err(StoreError::NotFound(key.to_string()));
        }
        Ok(format!("memory://objects/{key}?expires_in={}", ttl.as_secs()))
    }
}

/// In-memory metadata store.
#[derive(Debug, Default)]
pub struct MemoryMetadataStore {
    records: DashMap<String, GenerationMetadata>,
}

impl MemoryMetadataStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records (test observability).
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when no records exist.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl MetadataStore for MemoryMetadataStore {
    async fn put(&self, record: GenerationMetadata) -> StoreResult<()> {
        self.records.insert(record.file_key.clone(), record);
        Ok(())
    }

    async fn get(&self, file_key: &str) -> StoreResult<Option<GenerationMetadata>> {
        Ok(self.records.get(file_key).map(|r| r.clone()))
    }
}

/// In-memory presence cache with TTL expiry.
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    expiries: DashMap<String, Instant>,
}

impl MemoryCacheStore {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn set(&self, key: &str, ttl: Duration) -> StoreResult<()> {
        self.expiries.insert(key.to_string(), Instant::now() + ttl);
        Ok(())
    }

    async fn get(&self, key: &str) -> StoreResult<bool> {
        // Copy the deadline out before touching the map again; holding a
        // read guard across a remove would deadlock on the shard lock.
        let expiry = self.expiries.get(key).map(|e| *e);
        match expiry {
            Some(expiry) if expiry > Instant::now() => Ok(true),
            Some(_) => {
                self.expiries.remove(key);
                Ok(false)
            }
            None => Ok(false),
        }
    }

    async fn set_if_absent(&self, key: &str, ttl: Duration) -> StoreResult<bool> {
        let now = Instant::now();
        match self.expiries.entry(key.to_string()) {
            Entry::Occupied(mut e) => {
                if *e.get() > now {
                    Ok(false)
                } else {
                    // Expired claim: the previous owner died or forgot it.
                    e.insert(now + ttl);
                    Ok(true)
                }
            }
            Entry::Vacant(e) => {
                e.insert(now + ttl);
                Ok(true)
            }
        }
    }
}

#[derive(Clone, Debug)]
struct QueuedTask {
    receipt: u64,
    request: GenerationRequest,
    invisible_until: Option<Instant>,
}

/// In-memory at-least-once task queue with visibility timeouts.
///
/// Received tasks become invisible for the configured timeout; deleting a
/// task acknowledges it, otherwise it reappears for redelivery.
#[derive(Debug)]
pub struct MemoryTaskQueue {
    tasks: Mutex<VecDeque<QueuedTask>>,
    visibility: Duration,
    next_receipt: AtomicU64,
}

impl MemoryTaskQueue {
    /// Create a queue with a 30 s visibility timeout.
    pub fn new() -> Self {
        Self::with_visibility(Duration::from_secs(30))
    }

    /// Create a queue with an explicit visibility timeout.
    pub fn with_visibility(visibility: Duration) -> Self {
        Self {
            tasks: Mutex::new(VecDeque::new()),
            visibility,
            next_receipt: AtomicU64::new(1),
        }
    }

    /// Total tasks, visible or leased (test observability).
    pub async fn len(&self) -> usize {
        self.tasks.lock().await.len()
    }

    /// True when no tasks remain.
    pub async fn is_empty(&self) -> bool {
        self.tasks.lock().await.is_empty()
    }

    fn take_visible(&self, tasks: &mut VecDeque<QueuedTask>, max: usize) -> Vec<LeasedTask> {
        let now = Instant::now();
        let mut batch = Vec::new();
        for task in tasks.iter_mut() {
            if batch.len() >= max {
                break;
            }
            let visible = task.invisible_until.is_none_or(|until| until <= now);
            if visible {
                task.invisible_until = Some(now + self.visibility);
                batch.push(LeasedTask {
                    receipt: task.receipt,
                    request: task.request.clone(),
                });
            }
        }
        batch
    }
}

impl Default for MemoryTaskQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TaskQueue for MemoryTaskQueue {
    async fn send(&self, request: GenerationRequest) -> StoreResult<()> {
        let receipt = self.next_receipt.fetch_add(1, Ordering::Relaxed);
        self.tasks.lock().await.push_back(QueuedTask {
            receipt,
            request,
            invisible_until: None,
        });
        Ok(())
    }

    async fn receive_batch(&self, max: usize, wait: Duration) -> StoreResult<Vec<LeasedTask>> {
        if max == 0 {
            return Ok(Vec::new());
        }
        let batch = self.take_visible(&mut *self.tasks.lock().await, max);
        if !batch.is_empty() || wait.is_zero() {
            return Ok(batch);
        }
        // Long-poll: one bounded wait, then a final scan.
        tokio::time::sleep(wait).await;
        Ok(self.take_visible(&mut *self.tasks.lock().await, max))
    }

    async fn delete(&self, task: &LeasedTask) -> StoreResult<()> {
        let mut tasks = self.tasks.lock().await;
        tasks.retain(|t| t.receipt != task.receipt);
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/store/memory.rs"]
mod tests;
