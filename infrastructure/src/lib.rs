//! Infrastructure layer for conclave
//!
//! This crate contains adapters that implement the ports defined in the
//! application layer, plus configuration file loading.

pub mod config;
pub mod logging;
pub mod providers;

// Re-export commonly used types
pub use config::{
    ConfigLoader, FileConfig, FileEngineConfig, FileJustifierConfig, FilePanelistConfig,
    FileProviderConfig,
};
pub use logging::JsonlInteractionLogger;
pub use providers::OpenAiCompatConnector;
