//! Monotonic concurrent tables: the write-once resolution cache and the per-symbol lock registry.
//!
//! Neither table is ever pruned. Both are sharded maps, so inserting one key never locks out
//! readers or writers of keys in other shards.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parking_lot::ReentrantMutex;
use rustc_hash::FxBuildHasher;

use crate::artifact::ArtifactRef;

/// Per-symbol synchronization token.
///
/// Re-entrant: a provider or fallback running under a symbol's lock may register or resolve the
/// same symbol on the same thread.
pub(crate) type LockToken = Arc<ReentrantMutex<()>>;

/// Symbol → artifact map where the first write for a key is final.
pub(crate) struct ResolutionCache {
	entries: DashMap<Arc<str>, ArtifactRef, FxBuildHasher>,
}

impl ResolutionCache {
	pub(crate) fn new() -> Self {
		Self {
			entries: DashMap::with_hasher(FxBuildHasher),
		}
	}

	#[inline]
	pub(crate) fn get(&self, name: &str) -> Option<ArtifactRef> {
		self.entries.get(name).map(|e| e.value().clone())
	}

	/// Inserts `artifact` unless `name` is already cached, and returns whichever handle is cached
	/// afterwards.
	pub(crate) fn insert_once(&self, name: &str, artifact: ArtifactRef) -> ArtifactRef {
		match self.entries.entry(Arc::from(name)) {
			Entry::Occupied(existing) => existing.get().clone(),
			Entry::Vacant(slot) => {
				slot.insert(artifact.clone());
				artifact
			}
		}
	}

	pub(crate) fn len(&self) -> usize {
		self.entries.len()
	}
}

/// Arena of lock tokens keyed by symbol, created on first request.
pub(crate) struct LockRegistry {
	tokens: DashMap<Arc<str>, LockToken, FxBuildHasher>,
}

impl LockRegistry {
	pub(crate) fn new() -> Self {
		Self {
			tokens: DashMap::with_hasher(FxBuildHasher),
		}
	}

	/// Returns the token for `name`, creating it atomically if absent.
	///
	/// The map guard is released before returning; callers lock the token without holding any
	/// shard lock.
	pub(crate) fn token(&self, name: &str) -> LockToken {
		if let Some(token) = self.tokens.get(name) {
			return token.value().clone();
		}
		self.tokens
			.entry(Arc::from(name))
			.or_insert_with(|| Arc::new(ReentrantMutex::new(())))
			.value()
			.clone()
	}

	pub(crate) fn len(&self) -> usize {
		self.tokens.len()
	}
}
