//! Presentation layer for conclave
//!
//! This crate contains CLI definitions, output formatters,
//! and progress reporters.

pub mod cli;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use cli::{parse_justifier_arg, parse_model_arg, Cli, OutputFormat};
pub use output::ConsoleFormatter;
pub use progress::{ProgressReporter, SimpleProgress};
