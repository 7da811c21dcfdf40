//! The resolution engine.
//!
//! # Role
//!
//! Ties the provider set, the monotonic tables, the fallback hooks, and the synthetic registrar
//! together behind a thread-safe API.
//!
//! # Invariants
//!
//! - Artifact resolution for one symbol is single-flight: the cache is re-checked under the
//!   symbol's lock and filled before the lock is released.
//! - Misses are never cached; a hook installed after a miss takes effect on the next call.
//! - Provider I/O failures during resource scans are logged and skipped.

use std::sync::Arc;
use std::vec;

use tracing::{debug, trace, warn};

use crate::artifact::{ArtifactOrigin, ArtifactRef};
use crate::cache::{LockRegistry, ResolutionCache};
use crate::config::{EngineConfig, LivenessPolicy, ResourceFallbackOrder};
use crate::error::{ConstructionError, MaterializeError, ResolveError};
use crate::fallback::{ArtifactFallback, FallbackSlot, Fallbacks, ResourceFallback};
use crate::provider::{Provider, ProviderId, ProviderSet, Resource};
use crate::synthetic::{BytesMaterializer, Materializer, PackageInfo, PackageTable, SyntheticArtifact};

/// Assembles a [`ResolutionEngine`].
pub struct EngineBuilder {
	providers: Vec<Arc<dyn Provider>>,
	artifact_fallback: Option<ArtifactFallback>,
	resource_fallback: Option<ResourceFallback>,
	materializer: Arc<dyn Materializer>,
	config: EngineConfig,
}

impl Default for EngineBuilder {
	fn default() -> Self {
		Self::new()
	}
}

impl EngineBuilder {
	pub fn new() -> Self {
		Self {
			providers: Vec::new(),
			artifact_fallback: None,
			resource_fallback: None,
			materializer: Arc::new(BytesMaterializer),
			config: EngineConfig::default(),
		}
	}

	/// Appends a provider; registration order is precedence order.
	pub fn provider(mut self, provider: Arc<dyn Provider>) -> Self {
		self.providers.push(provider);
		self
	}

	pub fn providers(mut self, providers: impl IntoIterator<Item = Arc<dyn Provider>>) -> Self {
		self.providers.extend(providers);
		self
	}

	pub fn artifact_fallback(mut self, hook: ArtifactFallback) -> Self {
		self.artifact_fallback = Some(hook);
		self
	}

	pub fn resource_fallback(mut self, hook: ResourceFallback) -> Self {
		self.resource_fallback = Some(hook);
		self
	}

	pub fn materializer(mut self, materializer: impl Materializer + 'static) -> Self {
		self.materializer = Arc::new(materializer);
		self
	}

	pub fn config(mut self, config: EngineConfig) -> Self {
		self.config = config;
		self
	}

	/// Fixes the provider set. Fails if no provider was added.
	pub fn build(self) -> Result<ResolutionEngine, ConstructionError> {
		let providers = ProviderSet::new(self.providers)?;
		let label: Arc<str> = Arc::from(self.config.label.as_str());
		debug!(engine = %label, providers = ?providers, "resolution engine constructed");
		Ok(ResolutionEngine {
			label,
			config: self.config,
			providers,
			cache: ResolutionCache::new(),
			locks: LockRegistry::new(),
			packages: PackageTable::new(),
			fallbacks: FallbackSlot::new(Fallbacks::new(
				self.artifact_fallback,
				self.resource_fallback,
			)),
			materializer: self.materializer,
		})
	}
}

/// Resolves symbols across an ordered provider set with single-flight caching.
pub struct ResolutionEngine {
	label: Arc<str>,
	config: EngineConfig,
	providers: ProviderSet,
	cache: ResolutionCache,
	locks: LockRegistry,
	packages: PackageTable,
	fallbacks: FallbackSlot,
	materializer: Arc<dyn Materializer>,
}

impl ResolutionEngine {
	/// Creates an engine with default hooks, materializer, and config.
	pub fn new(providers: Vec<Arc<dyn Provider>>) -> Result<Self, ConstructionError> {
		EngineBuilder::new().providers(providers).build()
	}

	pub fn builder() -> EngineBuilder {
		EngineBuilder::new()
	}

	pub fn config(&self) -> &EngineConfig {
		&self.config
	}

	pub fn providers(&self) -> &ProviderSet {
		&self.providers
	}

	/// Resolves `name` to an artifact, consulting the cache, the providers in order, and the
	/// artifact fallback.
	///
	/// Concurrent callers for the same symbol run the provider scan once; the rest wait on the
	/// symbol's lock and read the cached result.
	pub fn resolve_artifact(&self, name: &str) -> Result<ArtifactRef, ResolveError> {
		if let Some(hit) = self.cache.get(name) {
			trace!(engine = %self.label, name, "artifact cache hit");
			return Ok(hit);
		}
		if name.is_empty() {
			return Err(not_found(name));
		}

		let token = self.locks.token(name);
		let _guard = token.lock();

		if let Some(hit) = self.cache.get(name) {
			trace!(engine = %self.label, name, "artifact filled while waiting");
			return Ok(hit);
		}

		let found = self
			.query_providers(name)
			.or_else(|| self.query_artifact_fallback(name));

		match found {
			Some(artifact) => Ok(self.cache.insert_once(name, artifact)),
			None => {
				debug!(engine = %self.label, name, "artifact not found");
				Err(not_found(name))
			}
		}
	}

	/// Returns the cached artifact for `name` without querying anything.
	pub fn find_cached(&self, name: &str) -> Option<ArtifactRef> {
		self.cache.get(name)
	}

	fn query_providers(&self, name: &str) -> Option<ArtifactRef> {
		let skip_retired = self.config.artifact_liveness == LivenessPolicy::SkipRetired;
		for (id, provider) in self.providers.iter() {
			if skip_retired && provider.is_retired() {
				continue;
			}
			if let Some(artifact) = provider.resolve(name) {
				debug!(
					engine = %self.label,
					name,
					provider = provider.label(),
					position = %id,
					"artifact resolved"
				);
				return Some(artifact);
			}
		}
		None
	}

	fn query_artifact_fallback(&self, name: &str) -> Option<ArtifactRef> {
		let fallbacks = self.fallbacks.load();
		let artifact = fallbacks.artifact()?.resolve(name)?;
		debug!(
			engine = %self.label,
			name,
			hook_version = fallbacks.version(),
			"artifact resolved by fallback"
		);
		Some(artifact)
	}

	/// Returns the first resource named `name` from the first live provider with a non-empty
	/// listing, or from the resource fallback.
	///
	/// Where the fallback sits relative to the remaining providers is set by
	/// [`EngineConfig::resource_fallback`].
	pub fn resolve_resource(&self, name: &str) -> Option<Resource> {
		let fallbacks = self.fallbacks.load();
		let hook = fallbacks.resource().filter(|hook| hook.matches(name));
		let preemptive = self.config.resource_fallback == ResourceFallbackOrder::Preemptive;

		for (id, provider) in self.providers.live() {
			if let Some(first) = scan_provider(&self.label, id, &**provider, name).into_iter().next() {
				return Some(first);
			}
			if preemptive && let Some(hook) = hook {
				trace!(engine = %self.label, name, position = %id, "resource fallback preempts providers");
				return hook.resolve(name).into_iter().next();
			}
		}
		hook.and_then(|hook| hook.resolve(name).into_iter().next())
	}

	/// Lazily yields every resource named `name` from every live provider in order, followed by
	/// the resource fallback's listing if its predicate matches.
	///
	/// Each call starts a fresh scan.
	pub fn resolve_all_resources(&self, name: &str) -> ResourceIter {
		ResourceIter {
			label: self.label.clone(),
			name: Arc::from(name),
			providers: self.providers.clone(),
			next: 0,
			current: Vec::new().into_iter(),
			fallback: self.fallbacks.load().resource().cloned(),
		}
	}

	/// Registers an artifact built from raw bytes.
	///
	/// Idempotent per name: once `name` is cached (by an earlier registration or a provider), the
	/// cached handle is returned and neither the materializer nor the package table is touched.
	/// The first registration in a package records that package's metadata.
	pub fn register_synthetic(&self, request: SyntheticArtifact) -> Result<ArtifactRef, ResolveError> {
		if let Some(hit) = self.cache.get(&request.name) {
			return Ok(hit);
		}
		if request.name.is_empty() {
			return Err(invalid(
				&request.name,
				MaterializeError::Malformed("empty symbol".to_string()),
			));
		}

		let token = self.locks.token(&request.name);
		let _guard = token.lock();

		if let Some(hit) = self.cache.get(&request.name) {
			return Ok(hit);
		}

		if let Some(info) = self.packages.define_if_absent(&request) {
			debug!(
				engine = %self.label,
				package = %info.name,
				sealed_at = info.sealed_at.as_deref(),
				"package defined"
			);
		}

		let artifact = self
			.materializer
			.materialize(&request.name, &request.bytes)
			.map_err(|reason| {
				warn!(engine = %self.label, name = %request.name, %reason, "synthetic payload rejected");
				invalid(&request.name, reason)
			})?
			.with_origin(ArtifactOrigin::Synthetic {
				location: request.location().cloned(),
			});

		debug!(
			engine = %self.label,
			name = %request.name,
			len = request.bytes.len(),
			"synthetic artifact registered"
		);
		Ok(self.cache.insert_once(&request.name, artifact.into_ref()))
	}

	/// Returns the package metadata recorded by synthetic registration.
	pub fn package(&self, package: &str) -> Option<Arc<PackageInfo>> {
		self.packages.get(package)
	}

	/// Replaces the artifact fallback. Returns the new hook version.
	pub fn set_artifact_fallback<P, R>(&self, predicate: P, resolver: R) -> u64
	where
		P: Fn(&str) -> bool + Send + Sync + 'static,
		R: Fn(&str) -> Option<ArtifactRef> + Send + Sync + 'static,
	{
		let version = self
			.fallbacks
			.replace_artifact(Some(ArtifactFallback::new(predicate, resolver)));
		debug!(engine = %self.label, version, "artifact fallback replaced");
		version
	}

	/// Replaces the resource fallback. Returns the new hook version.
	pub fn set_resource_fallback<P, R>(&self, predicate: P, resolver: R) -> u64
	where
		P: Fn(&str) -> bool + Send + Sync + 'static,
		R: Fn(&str) -> Vec<Resource> + Send + Sync + 'static,
	{
		let version = self
			.fallbacks
			.replace_resource(Some(ResourceFallback::new(predicate, resolver)));
		debug!(engine = %self.label, version, "resource fallback replaced");
		version
	}

	pub fn clear_artifact_fallback(&self) -> u64 {
		self.fallbacks.replace_artifact(None)
	}

	pub fn clear_resource_fallback(&self) -> u64 {
		self.fallbacks.replace_resource(None)
	}

	/// Consistent snapshot of both hook slots.
	pub fn fallbacks(&self) -> Arc<Fallbacks> {
		self.fallbacks.load()
	}

	/// Number of cached artifacts.
	pub fn cached_len(&self) -> usize {
		self.cache.len()
	}

	/// Number of lock tokens ever created.
	pub fn lock_count(&self) -> usize {
		self.locks.len()
	}
}

/// Lazy union of resource listings; see [`ResolutionEngine::resolve_all_resources`].
pub struct ResourceIter {
	label: Arc<str>,
	name: Arc<str>,
	providers: ProviderSet,
	next: usize,
	current: vec::IntoIter<Resource>,
	fallback: Option<ResourceFallback>,
}

impl Iterator for ResourceIter {
	type Item = Resource;

	fn next(&mut self) -> Option<Resource> {
		loop {
			if let Some(resource) = self.current.next() {
				return Some(resource);
			}
			if self.next < self.providers.len() {
				let id = ProviderId::from_index(self.next);
				self.next += 1;
				let Some(provider) = self.providers.get(id) else {
					continue;
				};
				if provider.is_retired() {
					continue;
				}
				self.current = scan_provider(&self.label, id, &**provider, &self.name).into_iter();
				continue;
			}
			let fallback = self.fallback.take()?;
			self.current = fallback.resolve(&self.name).into_iter();
		}
	}
}

/// Queries one provider's listing, treating I/O failures as an empty listing.
fn scan_provider(label: &str, id: ProviderId, provider: &dyn Provider, name: &str) -> Vec<Resource> {
	match provider.list_resources(name) {
		Ok(listing) => listing.unwrap_or_default(),
		Err(error) => {
			warn!(
				engine = label,
				name,
				provider = provider.label(),
				position = %id,
				%error,
				"resource listing failed; skipping provider"
			);
			Vec::new()
		}
	}
}

fn not_found(name: &str) -> ResolveError {
	ResolveError::NotFound {
		name: name.to_string(),
	}
}

fn invalid(name: &str, reason: MaterializeError) -> ResolveError {
	ResolveError::InvalidArtifact {
		name: name.to_string(),
		reason,
	}
}
