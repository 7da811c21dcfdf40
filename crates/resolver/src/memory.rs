//! In-memory provider for hosts that assemble artifacts themselves, and for tests.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::artifact::{Artifact, ArtifactRef};
use crate::provider::{Provider, Resource};

/// Provider backed by fixed tables, with a retire switch and per-name query counters.
pub struct MemoryProvider {
	label: Arc<str>,
	artifacts: FxHashMap<String, ArtifactRef>,
	resources: FxHashMap<String, Vec<Resource>>,
	failing: FxHashSet<String>,
	latency: Option<Duration>,
	retired: AtomicBool,
	resolve_calls: Mutex<FxHashMap<String, usize>>,
	list_calls: Mutex<FxHashMap<String, usize>>,
}

impl MemoryProvider {
	pub fn new(label: impl Into<Arc<str>>) -> Self {
		Self {
			label: label.into(),
			artifacts: FxHashMap::default(),
			resources: FxHashMap::default(),
			failing: FxHashSet::default(),
			latency: None,
			retired: AtomicBool::new(false),
			resolve_calls: Mutex::new(FxHashMap::default()),
			list_calls: Mutex::new(FxHashMap::default()),
		}
	}

	/// Adds an artifact named `name` with `payload`.
	pub fn with_artifact(mut self, name: &str, payload: impl Into<Arc<[u8]>>) -> Self {
		let artifact = Artifact::new(name, payload).into_ref();
		self.artifacts.insert(name.to_string(), artifact);
		self
	}

	/// Appends `location` to the listing for `name`.
	pub fn with_resource(mut self, name: &str, location: &str) -> Self {
		let resource = Resource::new(self.label.clone(), location);
		self.resources.entry(name.to_string()).or_default().push(resource);
		self
	}

	/// Makes listing `name` fail with an I/O error.
	pub fn with_failure(mut self, name: &str) -> Self {
		self.failing.insert(name.to_string());
		self
	}

	/// Sleeps for `latency` on every artifact query.
	pub fn with_latency(mut self, latency: Duration) -> Self {
		self.latency = Some(latency);
		self
	}

	/// Returns the handle this provider serves for `name`.
	pub fn artifact(&self, name: &str) -> Option<ArtifactRef> {
		self.artifacts.get(name).cloned()
	}

	pub fn retire(&self) {
		self.retired.store(true, Ordering::Release);
	}

	/// Number of [`Provider::resolve`] calls made for `name`.
	pub fn resolve_calls(&self, name: &str) -> usize {
		self.resolve_calls.lock().get(name).copied().unwrap_or(0)
	}

	/// Number of [`Provider::list_resources`] calls made for `name`.
	pub fn list_calls(&self, name: &str) -> usize {
		self.list_calls.lock().get(name).copied().unwrap_or(0)
	}

	fn bump(counter: &Mutex<FxHashMap<String, usize>>, name: &str) {
		*counter.lock().entry(name.to_string()).or_default() += 1;
	}
}

impl Provider for MemoryProvider {
	fn label(&self) -> &str {
		&self.label
	}

	fn resolve(&self, name: &str) -> Option<ArtifactRef> {
		Self::bump(&self.resolve_calls, name);
		if let Some(latency) = self.latency {
			thread::sleep(latency);
		}
		self.artifacts.get(name).cloned()
	}

	fn is_retired(&self) -> bool {
		self.retired.load(Ordering::Acquire)
	}

	fn list_resources(&self, name: &str) -> io::Result<Option<Vec<Resource>>> {
		Self::bump(&self.list_calls, name);
		if self.failing.contains(name) {
			return Err(io::Error::other(format!("{}: cannot list {name}", self.label)));
		}
		Ok(self.resources.get(name).cloned())
	}
}
