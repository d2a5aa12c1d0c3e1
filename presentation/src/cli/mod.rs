//! CLI argument definitions and parsing helpers

pub mod commands;

pub use commands::{parse_justifier_arg, parse_model_arg, Cli, OutputFormat};
