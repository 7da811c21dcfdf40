#![cfg_attr(doc, allow(rustdoc::private_intra_doc_links))]
//! Multi-provider artifact resolution.
//!
//! # Purpose
//!
//! Resolves named symbols across an ordered set of [`Provider`]s, caches what it finds, and lets
//! hosts register artifacts synthesized from raw bytes at runtime.
//!
//! # Mental Model
//!
//! 1. **Construction:** An [`EngineBuilder`] fixes the [`ProviderSet`] (ordered, non-empty),
//!    the initial fallback hooks, the [`Materializer`], and the [`EngineConfig`].
//! 2. **Artifact lookup:** [`ResolutionEngine::resolve_artifact`] checks the cache, then takes
//!    the symbol's lock, re-checks, queries providers in order, then the artifact fallback.
//!    The winner is cached before the lock is released.
//! 3. **Resource lookup:** [`ResolutionEngine::resolve_resource`] and
//!    [`ResolutionEngine::resolve_all_resources`] scan live providers; provider I/O failures are
//!    logged and skipped.
//! 4. **Synthesis:** [`ResolutionEngine::register_synthetic`] materializes bytes into an
//!    artifact, records package metadata on first sight of a package, and caches the result.
//!
//! # Concurrency
//!
//! - **Cache reads:** Lock-free fast path; misses are never cached.
//! - **Resolution:** Single-flight per symbol. Distinct symbols never contend on the same lock.
//! - **Hooks:** Atomic snapshot swap; readers always see a consistent predicate/resolver pair.
//!
//! # Invariants
//!
//! - A cached artifact is never replaced.
//!   - Enforced in: [`cache::ResolutionCache::insert_once`].
//! - Exactly one lock token exists per symbol ever requested.
//!   - Enforced in: [`cache::LockRegistry::token`].
//! - The first provider in registration order that resolves a symbol wins.
//!   - Enforced in: [`engine::ResolutionEngine::resolve_artifact`].

mod artifact;
pub(crate) mod cache;
mod config;
pub(crate) mod engine;
mod error;
mod fallback;
mod memory;
mod provider;
mod synthetic;

pub use artifact::{Artifact, ArtifactOrigin, ArtifactRef};
pub use config::{EngineConfig, LivenessPolicy, ResourceFallbackOrder};
pub use engine::{EngineBuilder, ResolutionEngine, ResourceIter};
pub use error::{ConfigError, ConstructionError, MaterializeError, ResolveError};
pub use fallback::{ArtifactFallback, Fallbacks, ResourceFallback};
pub use memory::MemoryProvider;
pub use provider::{Provider, ProviderId, ProviderSet, Resource};
pub use synthetic::{
	BytesMaterializer, Descriptor, Materializer, PackageInfo, PackageTemplate, Provenance,
	SyntheticArtifact, package_of,
};
