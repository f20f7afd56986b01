//! Fractime renders deterministic Julia-set images keyed by a location's
//! local time, deduplicating work through a cache gate and an asynchronous
//! render queue.
//!
//! # Pipeline overview
//!
//! 1. **Gate**: [`CacheGate::resolve`] authorizes the request, derives its
//!    [`CacheKey`], and checks the existence cache (hit: presigned URL, done).
//! 2. **Claim**: on a miss, an atomic insert-if-absent claim admits exactly
//!    one requester to generation; everyone else observes the in-flight
//!    render.
//! 3. **Seed**: [`SeedResolver`] fetches `{date, time}` for the location (15 s
//!    timeout, failure degrades to fixed fallback constants).
//! 4. **Map**: [`ParameterMapper`] hashes the seed onto a curated table of
//!    Julia constants. Identical seed, identical constant.
//! 5. **Render**: [`render`] runs row-wise escape-time iteration in f32 and
//!    colors counts through a fixed perceptual ramp. Byte-identical output
//!    for identical inputs.
//! 6. **Publish**: object store put, metadata record, cache marker, in that
//!    order. Re-publishing a key is a harmless overwrite, so at-least-once
//!    task delivery is safe.
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic-by-default**: seed mapping and rendering are pure and
//!   stable for a given input.
//! - **No rendering on the I/O path**: the pixel loop runs on the blocking
//!   pool ([`Generator`]) or a queue worker ([`RenderWorker`]).
//! - **Never cache before publish**: the presence marker is written last.
//!
//! Infrastructure (object store, metadata table, existence cache, task
//! queue) sits behind narrow async traits in [`store`]; in-memory backends
//! back tests and local runs.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;
mod gate;
mod pipeline;
mod render;
mod seed;

/// Backend trait surface and in-memory implementations.
pub mod store;

pub use foundation::core::{
    ADMIN_GROUP, CacheKey, GenerationMetadata, GenerationRequest, Privilege, Resolution, SizeClass,
    time_bucket,
};
pub use foundation::error::{FractimeError, FractimeResult};
pub use gate::{CacheGate, GateConfig, ResolveMode, ResolveOutcome, authorize};
pub use pipeline::{DEFAULT_CACHE_TTL, Generator, RenderWorker, WorkerConfig};
pub use render::colormap::inferno;
pub use render::julia::{NEVER_ESCAPED, RenderOptions, RenderedArtifact, render};
pub use seed::mapper::{FALLBACK_PARAMS, ConstantTable, FractalParameters, ParameterMapper};
pub use seed::resolver::{LocalTime, SeedResolver};
