use std::fmt;
use std::sync::Arc;

/// Shared handle to a resolved artifact.
///
/// Handles compare by identity with [`Arc::ptr_eq`]; the cache hands out the same allocation to
/// every caller of a symbol.
pub type ArtifactRef = Arc<Artifact>;

/// Where a resolved artifact came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactOrigin {
	/// Built outside the engine and handed over by a provider or fallback hook.
	Provided,
	/// Materialized from raw bytes by the synthetic registrar.
	Synthetic {
		/// Origin location carried by the provenance record, if any.
		location: Option<Arc<str>>,
	},
}

/// An immutable, named, in-memory unit produced by a provider or the synthetic registrar.
pub struct Artifact {
	name: Arc<str>,
	payload: Arc<[u8]>,
	origin: ArtifactOrigin,
}

impl Artifact {
	/// Creates an artifact with an [`ArtifactOrigin::Provided`] origin.
	pub fn new(name: impl Into<Arc<str>>, payload: impl Into<Arc<[u8]>>) -> Self {
		Self {
			name: name.into(),
			payload: payload.into(),
			origin: ArtifactOrigin::Provided,
		}
	}

	/// Replaces the origin tag.
	pub fn with_origin(mut self, origin: ArtifactOrigin) -> Self {
		self.origin = origin;
		self
	}

	/// Creates a shared handle.
	pub fn into_ref(self) -> ArtifactRef {
		Arc::new(self)
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn payload(&self) -> &[u8] {
		&self.payload
	}

	pub fn origin(&self) -> &ArtifactOrigin {
		&self.origin
	}
}

impl fmt::Debug for Artifact {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Artifact")
			.field("name", &self.name)
			.field("payload_len", &self.payload.len())
			.field("origin", &self.origin)
			.finish()
	}
}
