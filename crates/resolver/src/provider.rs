//! Artifact providers and the ordered set the engine consults.

use std::fmt;
use std::io;
use std::sync::Arc;

use crate::artifact::ArtifactRef;
use crate::error::ConstructionError;

/// A named resource reported by a provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Resource {
	/// Label of the provider that reported it.
	pub provider: Arc<str>,
	/// Provider-specific location of the resource.
	pub location: Arc<str>,
}

impl Resource {
	pub fn new(provider: impl Into<Arc<str>>, location: impl Into<Arc<str>>) -> Self {
		Self {
			provider: provider.into(),
			location: location.into(),
		}
	}
}

/// External source of artifacts and resources.
///
/// Providers are owned by the host; the engine only holds shared references and never mutates
/// them. Every method may be called concurrently from many threads.
pub trait Provider: Send + Sync {
	/// Short name used in log events and [`Resource::provider`].
	fn label(&self) -> &str;

	/// Resolves `name` to an artifact, or `None` if this provider does not know it.
	fn resolve(&self, name: &str) -> Option<ArtifactRef>;

	/// Returns true once the provider has been retired by its owner.
	fn is_retired(&self) -> bool {
		false
	}

	/// Lists resources named `name`.
	///
	/// `Ok(None)` and `Ok(Some(vec![]))` both mean "nothing here". Errors are provider-local and
	/// never abort a multi-provider scan.
	fn list_resources(&self, name: &str) -> io::Result<Option<Vec<Resource>>>;
}

/// Registration position of a provider within its [`ProviderSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProviderId(usize);

impl ProviderId {
	pub(crate) fn from_index(index: usize) -> Self {
		Self(index)
	}

	pub fn index(self) -> usize {
		self.0
	}
}

impl fmt::Display for ProviderId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}

/// Immutable, ordered, non-empty list of providers.
///
/// Order is precedence: earlier providers win.
#[derive(Clone)]
pub struct ProviderSet {
	providers: Arc<[Arc<dyn Provider>]>,
}

impl ProviderSet {
	/// Fixes the provider order. Fails if `providers` is empty.
	pub fn new(providers: Vec<Arc<dyn Provider>>) -> Result<Self, ConstructionError> {
		if providers.is_empty() {
			return Err(ConstructionError::EmptyProviderSet);
		}
		Ok(Self {
			providers: Arc::from(providers),
		})
	}

	pub fn len(&self) -> usize {
		self.providers.len()
	}

	/// Returns true if the set holds no providers.
	pub fn is_empty(&self) -> bool {
		self.providers.is_empty()
	}

	pub fn get(&self, id: ProviderId) -> Option<&Arc<dyn Provider>> {
		self.providers.get(id.index())
	}

	/// Iterates providers in registration order.
	pub fn iter(&self) -> impl Iterator<Item = (ProviderId, &Arc<dyn Provider>)> {
		self.providers
			.iter()
			.enumerate()
			.map(|(i, p)| (ProviderId::from_index(i), p))
	}

	/// Iterates providers that are not retired, in registration order.
	pub fn live(&self) -> impl Iterator<Item = (ProviderId, &Arc<dyn Provider>)> {
		self.iter().filter(|(_, p)| !p.is_retired())
	}
}

impl fmt::Debug for ProviderSet {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_list()
			.entries(self.providers.iter().map(|p| p.label()))
			.finish()
	}
}
