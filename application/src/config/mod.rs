//! Application-level configuration.
//!
//! [`EngineConfig`] is injected into the engine's entry point by the caller
//! — which connector acts as justifier is an explicit wiring decision, never
//! read from ambient process state.

use serde::{Deserialize, Serialize};

/// The designated justifier connector/model pair
///
/// Distinct from the voting panel; produces the final human-readable
/// rationale for the aggregate verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JustifierSpec {
    pub provider: String,
    pub model: String,
}

impl JustifierSpec {
    pub fn new(provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
        }
    }

    pub fn qualified_name(&self) -> String {
        format!("{}/{}", self.provider, self.model)
    }
}

/// Engine-level configuration injected at construction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Connector that writes the final justification
    pub justifier: JustifierSpec,
    /// Upper bound on concurrent model invocations within a round,
    /// to respect provider rate limits
    pub max_concurrency: usize,
}

impl EngineConfig {
    pub fn new(justifier: JustifierSpec) -> Self {
        Self {
            justifier,
            max_concurrency: 4,
        }
    }

    /// Clamped to at least 1; a zero bound would deadlock the round.
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }
}
