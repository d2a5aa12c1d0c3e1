//! Application layer for conclave
//!
//! This crate contains the deliberation use case, port definitions, and
//! engine configuration. It depends only on the domain layer; adapters for
//! the ports live in the infrastructure layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{EngineConfig, JustifierSpec};
pub use ports::{
    connector::{
        AttachmentConnector, Connector, ConnectorError, ConnectorRegistry, ImageConnector,
    },
    interaction_log::{InteractionEvent, InteractionLogger, NoInteractionLog},
    progress::{NoProgress, ProgressNotifier},
};
pub use use_cases::run_deliberation::{DeliberationError, RunDeliberationUseCase};
