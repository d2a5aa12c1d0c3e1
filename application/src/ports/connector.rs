//! Model connector port
//!
//! Defines the interface for communicating with model-serving providers.
//! Implementations (adapters) live in the infrastructure layer.
//!
//! Capability discovery is typed rather than string-switched: a connector
//! that can take an image or an attachment list exposes the corresponding
//! trait through [`Connector::image_support`] / [`Connector::attachment_support`],
//! and the controller consults those probes before choosing an invocation
//! form. Attachments take priority over the single-image form when both are
//! available.

use async_trait::async_trait;
use conclave_domain::Attachment;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur during connector operations
///
/// Retry and timeout policy belongs to the connector itself; by the time an
/// error reaches the engine it is final.
#[derive(Error, Debug)]
pub enum ConnectorError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Connector does not support the requested capability")]
    UnsupportedCapability,

    #[error("Other error: {0}")]
    Other(String),
}

/// A model-serving provider the engine can ask for text
///
/// The base contract every connector fulfills. Richer invocation forms are
/// optional and discovered through the capability probes.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Stable id this connector is registered under (e.g. "openai").
    fn provider_id(&self) -> &str;

    /// Plain text generation — always available.
    async fn generate(
        &self,
        model: &str,
        system: &str,
        prompt: &str,
    ) -> Result<String, ConnectorError>;

    /// Single-image capability, if this connector has it.
    fn image_support(&self) -> Option<&dyn ImageConnector> {
        None
    }

    /// General attachment capability, if this connector has it.
    fn attachment_support(&self) -> Option<&dyn AttachmentConnector> {
        None
    }
}

/// Optional capability: generation with one inline image
#[async_trait]
pub trait ImageConnector: Send + Sync {
    async fn generate_with_image(
        &self,
        model: &str,
        system: &str,
        prompt: &str,
        image: &[u8],
        media_type: &str,
    ) -> Result<String, ConnectorError>;
}

/// Optional capability: generation with a general attachment list
#[async_trait]
pub trait AttachmentConnector: Send + Sync {
    async fn generate_with_attachments(
        &self,
        model: &str,
        system: &str,
        prompt: &str,
        attachments: &[Attachment],
    ) -> Result<String, ConnectorError>;
}

/// Registry of connectors, keyed by provider id
///
/// Built once at wiring time and shared read-only across the request.
#[derive(Default)]
pub struct ConnectorRegistry {
    connectors: HashMap<String, Arc<dyn Connector>>,
}

impl ConnectorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connector under its own provider id.
    ///
    /// A later registration with the same id replaces the earlier one.
    pub fn register(&mut self, connector: Arc<dyn Connector>) {
        self.connectors
            .insert(connector.provider_id().to_string(), connector);
    }

    pub fn get(&self, provider: &str) -> Option<Arc<dyn Connector>> {
        self.connectors.get(provider).cloned()
    }

    pub fn providers(&self) -> impl Iterator<Item = &str> {
        self.connectors.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.connectors.is_empty()
    }
}
