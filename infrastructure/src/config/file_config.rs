//! Configuration file schema
//!
//! Everything a `conclave.toml` can set, with serde defaults so partial
//! files merge cleanly under figment. The bridge methods translate file
//! types into domain/application types at wiring time.
//!
//! Example configuration:
//!
//! ```toml
//! [engine]
//! rounds = 2
//! max_concurrency = 4
//!
//! [justifier]
//! provider = "openai"
//! model = "gpt-4o-mini"
//!
//! [[panel]]
//! provider = "openai"
//! model = "gpt-4o"
//! weight = 0.8
//! samples = 3
//!
//! [providers.openai]
//! base_url = "https://api.openai.com/v1"
//! api_key_env = "OPENAI_API_KEY"
//! ```

use conclave_application::{EngineConfig, JustifierSpec};
use conclave_domain::ModelSpec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Root configuration file schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    pub engine: FileEngineConfig,
    pub justifier: FileJustifierConfig,
    pub panel: Vec<FilePanelistConfig>,
    pub providers: BTreeMap<String, FileProviderConfig>,
}

impl FileConfig {
    /// Bridge to the engine configuration; `None` when no justifier is set.
    pub fn to_engine_config(&self) -> Option<EngineConfig> {
        if self.justifier.provider.is_empty() || self.justifier.model.is_empty() {
            return None;
        }
        Some(
            EngineConfig::new(JustifierSpec::new(
                self.justifier.provider.clone(),
                self.justifier.model.clone(),
            ))
            .with_max_concurrency(self.engine.max_concurrency),
        )
    }

    /// Bridge the panel section to domain model specs, in file order.
    pub fn to_model_specs(&self) -> Vec<ModelSpec> {
        self.panel
            .iter()
            .map(FilePanelistConfig::to_model_spec)
            .collect()
    }
}

/// `[engine]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileEngineConfig {
    /// Deliberation rounds per request
    pub rounds: u32,
    /// Concurrent model invocations within a round
    pub max_concurrency: usize,
}

impl Default for FileEngineConfig {
    fn default() -> Self {
        Self {
            rounds: 1,
            max_concurrency: 4,
        }
    }
}

/// `[justifier]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FileJustifierConfig {
    pub provider: String,
    pub model: String,
}

/// One `[[panel]]` entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilePanelistConfig {
    pub provider: String,
    pub model: String,
    pub weight: f64,
    pub samples: u32,
}

impl Default for FilePanelistConfig {
    fn default() -> Self {
        Self {
            provider: String::new(),
            model: String::new(),
            weight: 1.0,
            samples: 1,
        }
    }
}

impl FilePanelistConfig {
    pub fn to_model_spec(&self) -> ModelSpec {
        ModelSpec::new(self.provider.clone(), self.model.clone())
            .with_weight(self.weight)
            .with_samples(self.samples)
    }
}

/// One `[providers.<id>]` entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FileProviderConfig {
    /// Base URL of an OpenAI-compatible API
    pub base_url: String,
    /// API key set directly in the file
    pub api_key: Option<String>,
    /// Name of an environment variable holding the API key; consulted at
    /// wiring time when `api_key` is unset
    pub api_key_env: Option<String>,
}

impl FileProviderConfig {
    /// The key to authenticate with, if any.
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(key) = &self.api_key {
            return Some(key.clone());
        }
        self.api_key_env
            .as_ref()
            .and_then(|name| std::env::var(name).ok())
    }
}
