//! Last-resort hooks consulted when no provider answers.
//!
//! Both hook slots live in one versioned [`Fallbacks`] value published through an [`ArcSwap`].
//! Replacing a slot builds a new value and swaps it in, so a reader never pairs one hook's
//! predicate with another hook's resolver.

use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::artifact::ArtifactRef;
use crate::provider::Resource;

type Predicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// (predicate, resolver) pair for artifacts.
#[derive(Clone)]
pub struct ArtifactFallback {
	predicate: Predicate,
	resolver: Arc<dyn Fn(&str) -> Option<ArtifactRef> + Send + Sync>,
}

impl ArtifactFallback {
	pub fn new<P, R>(predicate: P, resolver: R) -> Self
	where
		P: Fn(&str) -> bool + Send + Sync + 'static,
		R: Fn(&str) -> Option<ArtifactRef> + Send + Sync + 'static,
	{
		Self {
			predicate: Arc::new(predicate),
			resolver: Arc::new(resolver),
		}
	}

	pub fn matches(&self, name: &str) -> bool {
		(self.predicate)(name)
	}

	/// Runs the resolver if the predicate accepts `name`.
	pub fn resolve(&self, name: &str) -> Option<ArtifactRef> {
		if self.matches(name) { (self.resolver)(name) } else { None }
	}
}

/// (predicate, resolver) pair for resource listings.
#[derive(Clone)]
pub struct ResourceFallback {
	predicate: Predicate,
	resolver: Arc<dyn Fn(&str) -> Vec<Resource> + Send + Sync>,
}

impl ResourceFallback {
	pub fn new<P, R>(predicate: P, resolver: R) -> Self
	where
		P: Fn(&str) -> bool + Send + Sync + 'static,
		R: Fn(&str) -> Vec<Resource> + Send + Sync + 'static,
	{
		Self {
			predicate: Arc::new(predicate),
			resolver: Arc::new(resolver),
		}
	}

	pub fn matches(&self, name: &str) -> bool {
		(self.predicate)(name)
	}

	/// Runs the resolver if the predicate accepts `name`; empty otherwise.
	pub fn resolve(&self, name: &str) -> Vec<Resource> {
		if self.matches(name) { (self.resolver)(name) } else { Vec::new() }
	}
}

/// Consistent snapshot of both hook slots.
#[derive(Clone, Default)]
pub struct Fallbacks {
	version: u64,
	artifact: Option<ArtifactFallback>,
	resource: Option<ResourceFallback>,
}

impl Fallbacks {
	pub fn new(artifact: Option<ArtifactFallback>, resource: Option<ResourceFallback>) -> Self {
		Self {
			version: 0,
			artifact,
			resource,
		}
	}

	/// Number of replacements applied since construction.
	pub fn version(&self) -> u64 {
		self.version
	}

	pub fn artifact(&self) -> Option<&ArtifactFallback> {
		self.artifact.as_ref()
	}

	pub fn resource(&self) -> Option<&ResourceFallback> {
		self.resource.as_ref()
	}
}

impl fmt::Debug for Fallbacks {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Fallbacks")
			.field("version", &self.version)
			.field("artifact", &self.artifact.is_some())
			.field("resource", &self.resource.is_some())
			.finish()
	}
}

/// Atomically replaceable holder for [`Fallbacks`].
pub(crate) struct FallbackSlot {
	current: ArcSwap<Fallbacks>,
}

impl FallbackSlot {
	pub(crate) fn new(initial: Fallbacks) -> Self {
		Self {
			current: ArcSwap::from_pointee(initial),
		}
	}

	#[inline]
	pub(crate) fn load(&self) -> Arc<Fallbacks> {
		self.current.load_full()
	}

	/// Replaces the artifact slot and returns the new version.
	pub(crate) fn replace_artifact(&self, hook: Option<ArtifactFallback>) -> u64 {
		self.replace(|old| Fallbacks {
			version: old.version + 1,
			artifact: hook.clone(),
			resource: old.resource.clone(),
		})
	}

	/// Replaces the resource slot and returns the new version.
	pub(crate) fn replace_resource(&self, hook: Option<ResourceFallback>) -> u64 {
		self.replace(|old| Fallbacks {
			version: old.version + 1,
			artifact: old.artifact.clone(),
			resource: hook.clone(),
		})
	}

	fn replace(&self, f: impl Fn(&Fallbacks) -> Fallbacks) -> u64 {
		// rcu retries on contention, so the closure may run more than once.
		let prev = self.current.rcu(|old| Arc::new(f(old)));
		prev.version + 1
	}
}
