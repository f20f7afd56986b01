use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::foundation::core::{GenerationMetadata, GenerationRequest};
use crate::foundation::error::{FractimeError, FractimeResult};
use crate::render::julia::{RenderOptions, render};
use crate::seed::mapper::ParameterMapper;
use crate::seed::resolver::SeedResolver;
use crate::store::{CacheStore, MetadataStore, ObjectStore, TaskQueue};

/// How long a published artifact's presence marker lives.
///
/// Keys are minute-sharded, so the marker only needs to outlive the bucket;
/// five minutes gives slow consumers room without unbounded growth.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Runs the full generation chain for one request: seed -> parameters ->
/// render -> publish.
///
/// Publish order is fixed: object store put, metadata record, then the cache
/// presence marker. A crash mid-chain can leave an orphaned artifact but
/// never a cached marker pointing at a missing one. Re-running the chain for
/// the same key is a harmless overwrite, which is what makes at-least-once
/// task delivery safe.
pub struct Generator {
    seed: Option<SeedResolver>,
    mapper: ParameterMapper,
    options: RenderOptions,
    objects: Arc<dyn ObjectStore>,
    metadata: Arc<dyn MetadataStore>,
    cache: Arc<dyn CacheStore>,
    cache_ttl: Duration,
}

impl Generator {
    /// Build a generator without a time source (every render uses the
    /// fallback constants).
    pub fn new(
        mapper: ParameterMapper,
        objects: Arc<dyn ObjectStore>,
        metadata: Arc<dyn MetadataStore>,
        cache: Arc<dyn CacheStore>,
    ) -> Self {
        Self {
            seed: None,
            mapper,
            options: RenderOptions::default(),
            objects,
            metadata,
            cache,
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }

    /// Attach a time-source resolver.
    pub fn with_seed_resolver(mut self, resolver: SeedResolver) -> Self {
        self.seed = Some(resolver);
        self
    }

    /// Override the render viewport/iteration options.
    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    /// Override the presence-marker TTL.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Render the request's fractal and publish it, returning the PNG bytes.
    ///
    /// The pixel loop runs on the blocking pool so it never starves the
    /// async I/O path.
    #[tracing::instrument(skip(self, request), fields(key = %request.cache_key()))]
    pub async fn generate_and_publish(&self, request: &GenerationRequest) -> FractimeResult<Vec<u8>> {
        let seed = match &self.seed {
            Some(resolver) => resolver.resolve(&request.region, &request.city).await,
            None => None,
        };
        let params = self.mapper.map(seed.as_ref());
        let resolution = request.size_class.resolution();
        let options = self.options;

        let artifact = tokio::task::spawn_blocking(move || render(params, resolution, &options))
            .await
            .map_err(|e| FractimeError::Other(anyhow::anyhow!("render task join: {e}")))??;
        let png = artifact.to_png_bytes()?;

        let key = request.cache_key();
        let file_key = key.file_key();
        self.objects.put(&file_key, png.clone(), "image/png").await?;
        self.metadata
            .put(GenerationMetadata {
                file_key,
                region: request.region.clone(),
                city: request.city.clone(),
                size_class: request.size_class,
                resolution,
                params_used: artifact.params,
                max_iter: artifact.max_iter,
                generated_at: GenerationMetadata::timestamp(Utc::now()),
            })
            .await?;
        self.cache.set(key.as_str(), self.cache_ttl).await?;

        tracing::info!(%key, width = resolution.width, height = resolution.height, "artifact published");
        Ok(png)
    }
}

/// Batch controls for the worker poll loop.
#[derive(Clone, Copy, Debug)]
pub struct WorkerConfig {
    /// Maximum tasks per poll.
    pub batch_size: usize,
    /// Long-poll wait when the queue is empty.
    pub wait: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            batch_size: 10,
            wait: Duration::from_secs(1),
        }
    }
}

/// Consumes render tasks from the queue and publishes their artifacts.
///
/// Acknowledge-after-publish: a task is deleted only once its artifact is
/// durably published, so a crash in between redelivers the task and the
/// rerun overwrites idempotently. Multiple workers may run in parallel; the
/// cache gate's claim keeps them from racing on one key.
pub struct RenderWorker {
    queue: Arc<dyn TaskQueue>,
    generator: Arc<Generator>,
    config: WorkerConfig,
}

impl RenderWorker {
    /// Build a worker with default batch controls.
    pub fn new(queue: Arc<dyn TaskQueue>, generator: Arc<Generator>) -> Self {
        Self {
            queue,
            generator,
            config: WorkerConfig::default(),
        }
    }

    /// Override batch controls.
    pub fn with_config(mut self, config: WorkerConfig) -> Self {
        self.config = config;
        self
    }

    /// Enqueue a render request for asynchronous processing.
    pub async fn enqueue(&self, request: GenerationRequest) -> FractimeResult<()> {
        self.queue.send(request).await?;
        Ok(())
    }

    /// One poll cycle: receive a batch, publish each task, acknowledge
    /// successes. Failed tasks are left leased and reappear after the
    /// queue's visibility timeout. Returns the number acknowledged.
    pub async fn run_once(&self) -> FractimeResult<usize> {
        let batch = self
            .queue
            .receive_batch(self.config.batch_size, self.config.wait)
            .await?;
        let mut acknowledged = 0;
        for task in batch {
            match self.generator.generate_and_publish(&task.request).await {
                Ok(_) => {
                    self.queue.delete(&task).await?;
                    acknowledged += 1;
                }
                Err(e) => {
                    tracing::warn!(
                        key = %task.request.cache_key(),
                        error = %e,
                        "task failed, leaving for redelivery"
                    );
                }
            }
        }
        Ok(acknowledged)
    }

    /// Poll until `shutdown` flips to true.
    pub async fn run(&self, mut shutdown: tokio::sync::watch::Receiver<bool>) {
        loop {
            if *shutdown.borrow() {
                break;
            }
            tokio::select! {
                _ = shutdown.changed() => {}
                result = self.run_once() => {
                    if let Err(e) = result {
                        tracing::warn!(error = %e, "worker poll failed");
                    }
                }
            }
        }
        tracing::info!("render worker stopped");
    }
}
