/// Engine construction failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConstructionError {
	/// The provider list was empty.
	#[error("provider set must contain at least one provider")]
	EmptyProviderSet,
}

/// Failures surfaced by resolution and synthetic registration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
	/// No provider and no fallback produced the symbol.
	#[error("artifact not found: {name}")]
	NotFound { name: String },

	/// The materializer rejected a synthetic payload.
	#[error("invalid artifact {name}: {reason}")]
	InvalidArtifact { name: String, reason: MaterializeError },
}

impl ResolveError {
	/// Returns the symbol the error refers to.
	pub fn name(&self) -> &str {
		match self {
			Self::NotFound { name } | Self::InvalidArtifact { name, .. } => name,
		}
	}
}

/// Rejection reasons reported by a [`crate::Materializer`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MaterializeError {
	#[error("empty payload")]
	Empty,

	#[error("malformed payload: {0}")]
	Malformed(String),
}

/// Engine configuration could not be parsed.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
	#[error("invalid engine config: {0}")]
	Toml(#[from] toml::de::Error),
}
