//! Artifacts synthesized from raw bytes, and the package metadata recorded alongside them.

use std::sync::Arc;

use dashmap::DashMap;
use rustc_hash::FxBuildHasher;

use crate::artifact::Artifact;
use crate::error::MaterializeError;

/// Title/version/vendor triple for a specification or implementation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Descriptor {
	pub title: Option<String>,
	pub version: Option<String>,
	pub vendor: Option<String>,
}

impl Descriptor {
	pub fn new(
		title: impl Into<String>,
		version: impl Into<String>,
		vendor: impl Into<String>,
	) -> Self {
		Self {
			title: Some(title.into()),
			version: Some(version.into()),
			vendor: Some(vendor.into()),
		}
	}
}

/// Package metadata supplied by the host to seed a synthetic artifact's package.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageTemplate {
	/// Package the template was taken from.
	pub package: String,
	pub specification: Descriptor,
	pub implementation: Descriptor,
	pub sealed: bool,
}

/// Where a synthetic payload came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Provenance {
	pub location: Option<Arc<str>>,
}

impl Provenance {
	pub fn at(location: impl Into<Arc<str>>) -> Self {
		Self {
			location: Some(location.into()),
		}
	}
}

/// Registration request for an artifact built from raw bytes.
#[derive(Debug, Clone)]
pub struct SyntheticArtifact {
	pub name: String,
	pub bytes: Arc<[u8]>,
	pub template: Option<PackageTemplate>,
	pub provenance: Option<Provenance>,
}

impl SyntheticArtifact {
	pub fn new(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
		Self {
			name: name.into(),
			bytes: bytes.into(),
			template: None,
			provenance: None,
		}
	}

	pub fn with_template(mut self, template: PackageTemplate) -> Self {
		self.template = Some(template);
		self
	}

	pub fn with_provenance(mut self, provenance: Provenance) -> Self {
		self.provenance = Some(provenance);
		self
	}

	pub(crate) fn location(&self) -> Option<&Arc<str>> {
		self.provenance.as_ref()?.location.as_ref()
	}
}

/// Package-level metadata recorded the first time a synthetic artifact of the package is
/// registered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageInfo {
	pub name: Arc<str>,
	pub specification: Descriptor,
	pub implementation: Descriptor,
	/// Location the package is sealed to; `None` for unsealed packages.
	pub sealed_at: Option<Arc<str>>,
}

impl PackageInfo {
	/// Derives package metadata for `package` from a registration request.
	///
	/// Only a sealed template contributes metadata. Without one the package is recorded bare.
	pub(crate) fn derive(package: &str, request: &SyntheticArtifact) -> Self {
		match request.template.as_ref().filter(|t| t.sealed) {
			Some(template) => Self {
				name: Arc::from(package),
				specification: template.specification.clone(),
				implementation: template.implementation.clone(),
				sealed_at: request.location().cloned(),
			},
			None => Self {
				name: Arc::from(package),
				..Self::default()
			},
		}
	}

	pub fn is_sealed(&self) -> bool {
		self.sealed_at.is_some()
	}
}

/// Returns the package portion of a dotted symbol: `a.b.C` → `a.b`.
pub fn package_of(name: &str) -> Option<&str> {
	name.rsplit_once('.')
		.map(|(package, _)| package)
		.filter(|package| !package.is_empty())
}

/// Turns a raw payload into an [`Artifact`].
pub trait Materializer: Send + Sync {
	fn materialize(&self, name: &str, bytes: &[u8]) -> Result<Artifact, MaterializeError>;
}

impl<F> Materializer for F
where
	F: Fn(&str, &[u8]) -> Result<Artifact, MaterializeError> + Send + Sync,
{
	fn materialize(&self, name: &str, bytes: &[u8]) -> Result<Artifact, MaterializeError> {
		self(name, bytes)
	}
}

/// Default materializer: keeps the bytes as the payload and rejects empty input.
#[derive(Debug, Clone, Copy, Default)]
pub struct BytesMaterializer;

impl Materializer for BytesMaterializer {
	fn materialize(&self, name: &str, bytes: &[u8]) -> Result<Artifact, MaterializeError> {
		if bytes.is_empty() {
			return Err(MaterializeError::Empty);
		}
		Ok(Artifact::new(name, bytes))
	}
}

/// Package name → first recorded metadata.
pub(crate) struct PackageTable {
	packages: DashMap<Arc<str>, Arc<PackageInfo>, FxBuildHasher>,
}

impl PackageTable {
	pub(crate) fn new() -> Self {
		Self {
			packages: DashMap::with_hasher(FxBuildHasher),
		}
	}

	pub(crate) fn get(&self, package: &str) -> Option<Arc<PackageInfo>> {
		self.packages.get(package).map(|p| p.value().clone())
	}

	/// Records metadata for the request's package unless the package is already known.
	///
	/// Returns the newly recorded entry, or `None` if nothing was recorded.
	pub(crate) fn define_if_absent(&self, request: &SyntheticArtifact) -> Option<Arc<PackageInfo>> {
		let package = package_of(&request.name)?;
		if self.packages.contains_key(package) {
			return None;
		}
		let mut defined = None;
		self.packages.entry(Arc::from(package)).or_insert_with(|| {
			let info = Arc::new(PackageInfo::derive(package, request));
			defined = Some(info.clone());
			info
		});
		defined
	}
}
