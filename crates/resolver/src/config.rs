//! Engine policies.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Whether artifact resolution consults retired providers.
///
/// Resource queries always skip retired providers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LivenessPolicy {
	/// Query every provider, retired or not.
	#[default]
	IncludeRetired,
	/// Skip retired providers, matching resource lookup.
	SkipRetired,
}

/// When the resource fallback is consulted by [`crate::ResolutionEngine::resolve_resource`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceFallbackOrder {
	/// Only after every live provider came up empty.
	#[default]
	AfterProviders,
	/// As soon as one live provider comes up empty, before the remaining providers are queried.
	Preemptive,
}

/// Tunables fixed at engine construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
	/// Name attached to log events.
	pub label: String,
	pub artifact_liveness: LivenessPolicy,
	pub resource_fallback: ResourceFallbackOrder,
}

impl Default for EngineConfig {
	fn default() -> Self {
		Self {
			label: "resolver".to_string(),
			artifact_liveness: LivenessPolicy::default(),
			resource_fallback: ResourceFallbackOrder::default(),
		}
	}
}

impl EngineConfig {
	/// Parses a TOML document. Missing keys take their defaults.
	pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
		Ok(toml::from_str(input)?)
	}
}
