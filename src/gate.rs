use std::sync::Arc;
use std::time::Duration;

use crate::foundation::core::{CacheKey, GenerationRequest, Privilege};
use crate::foundation::error::{FractimeError, FractimeResult};
use crate::pipeline::Generator;
use crate::store::{CacheStore, ObjectStore, TaskQueue};

/// What to do on a cache miss.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResolveMode {
    /// Render in the request path and return the bytes.
    Inline,
    /// Hand the request to the task pipeline and return immediately.
    Enqueue,
}

/// Result of resolving a request through the gate.
#[derive(Clone, Debug)]
pub enum ResolveOutcome {
    /// The artifact already exists; fetch it from this time-limited URL.
    Cached {
        /// Presigned retrieval URL.
        url: String,
    },
    /// The artifact was rendered inline; here are its PNG bytes.
    Served {
        /// Encoded PNG.
        bytes: Vec<u8>,
    },
    /// Generation is in flight (enqueued here, or claimed by another
    /// requester); poll again under the same key.
    Queued {
        /// Cache key to poll.
        key: CacheKey,
    },
}

/// Timing knobs for the gate.
#[derive(Clone, Copy, Debug)]
pub struct GateConfig {
    /// TTL for the single-flight claim; an abandoned claim (owner crashed)
    /// becomes reclaimable after this.
    pub claim_ttl: Duration,
    /// Validity of presigned retrieval URLs.
    pub url_ttl: Duration,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            claim_ttl: Duration::from_secs(120),
            url_ttl: Duration::from_secs(3600),
        }
    }
}

/// Arbitrates between "serve existing artifact" and "produce new artifact".
///
/// Per-key state machine: UNKNOWN -> CHECKING -> {HIT -> SERVE, MISS ->
/// GENERATING -> PUBLISHED -> SERVE}. Authorization runs before CHECKING, so
/// a rejected request costs zero store calls. Entering GENERATING requires
/// winning an atomic insert-if-absent claim; contenders that lose observe the
/// in-flight render instead of duplicating it.
pub struct CacheGate {
    cache: Arc<dyn CacheStore>,
    objects: Arc<dyn ObjectStore>,
    queue: Arc<dyn TaskQueue>,
    generator: Arc<Generator>,
    config: GateConfig,
}

impl CacheGate {
    /// Build a gate with default timing.
    pub fn new(
        cache: Arc<dyn CacheStore>,
        objects: Arc<dyn ObjectStore>,
        queue: Arc<dyn TaskQueue>,
        generator: Arc<Generator>,
    ) -> Self {
        Self {
            cache,
            objects,
            queue,
            generator,
            config: GateConfig::default(),
        }
    }

    /// Override timing knobs.
    pub fn with_config(mut self, config: GateConfig) -> Self {
        self.config = config;
        self
    }

    /// Resolve a request to an artifact handle.
    #[tracing::instrument(skip(self, request), fields(key = %request.cache_key()))]
    pub async fn resolve(
        &self,
        request: &GenerationRequest,
        mode: ResolveMode,
    ) -> FractimeResult<ResolveOutcome> {
        authorize(request)?;

        let key = request.cache_key();
        if self.cache.get(key.as_str()).await? {
            let url = self
                .objects
                .presigned_get_url(&key.file_key(), self.config.url_ttl)
                .await?;
            tracing::debug!(%key, "cache hit");
            return Ok(ResolveOutcome::Cached { url });
        }

        let claimed = self
            .cache
            .set_if_absent(&claim_key(&key), self.config.claim_ttl)
            .await?;
        if !claimed {
            tracing::debug!(%key, "render already in flight");
            return Ok(ResolveOutcome::Queued { key });
        }

        match mode {
            ResolveMode::Enqueue => {
                self.queue.send(request.clone()).await?;
                tracing::info!(%key, "render task queued");
                Ok(ResolveOutcome::Queued { key })
            }
            ResolveMode::Inline => {
                // Detach generation from the caller: if the caller abandons
                // this future, the render still completes and publishes for
                // future identical requests.
                let generator = Arc::clone(&self.generator);
                let owned = request.clone();
                let bytes = tokio::spawn(async move { generator.generate_and_publish(&owned).await })
                    .await
                    .map_err(|e| FractimeError::Other(anyhow::anyhow!("render task join: {e}")))??;
                Ok(ResolveOutcome::Served { bytes })
            }
        }
    }
}

/// Check a request against its size class's privilege requirement.
///
/// Runs before any cache or render work; rejection is an explicit
/// [`FractimeError::PermissionDenied`] value.
pub fn authorize(request: &GenerationRequest) -> FractimeResult<()> {
    match request.size_class.required_privilege() {
        Privilege::Open => Ok(()),
        Privilege::Authenticated => {
            if request.is_authenticated() {
                Ok(())
            } else {
                Err(FractimeError::permission_denied(format!(
                    "size class {} requires an authenticated identity",
                    request.size_class.as_str()
                )))
            }
        }
        Privilege::Group(group) => {
            if request.has_group(group) {
                Ok(())
            } else {
                Err(FractimeError::permission_denied(format!(
                    "size class {} requires group {group}",
                    request.size_class.as_str()
                )))
            }
        }
    }
}

/// Claim-marker key guarding GENERATING for a cache key.
fn claim_key(key: &CacheKey) -> String {
    format!("{key}.claim")
}

#[cfg(test)]
#[path = "../tests/unit/gate.rs"]
mod tests;
