//! CLI command definitions

use clap::{Parser, ValueEnum};
use conclave_domain::ModelSpec;
use std::path::PathBuf;

/// Output format for deliberation results
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Score table plus the full justification
    Full,
    /// Score table only
    Scores,
    /// JSON output
    Json,
}

/// CLI arguments for conclave
#[derive(Parser, Debug)]
#[command(name = "conclave")]
#[command(author, version, about = "Weighted multi-model deliberation over a fixed outcome set")]
#[command(long_about = r#"
Conclave poses one question to a panel of independent models, has each emit a
scored opinion over a fixed set of outcomes, and combines the opinions into a
single weighted verdict with a synthesized justification.

Each round, every model votes; in rounds after the first, models see their
peers' prior votes and reasoning and may revise. A designated justifier model
writes the final rationale.

Configuration files are loaded from (in priority order):
1. --config <path>     Explicit config file
2. ./conclave.toml     Project-level config
3. ~/.config/conclave/config.toml   Global config

Example:
  conclave --outcome approve --outcome reject "Merge this change?"
  conclave -m openai/gpt-4o@0.8x3 -m local/llama-3.1-70b@0.5 -r 2 "Which design wins?"
"#)]
pub struct Cli {
    /// The question to put to the panel
    pub prompt: Option<String>,

    /// Panel member as PROVIDER/MODEL[@WEIGHT[xSAMPLES]]
    /// (can be specified multiple times; overrides the config panel)
    #[arg(short, long, value_name = "SPEC")]
    pub model: Vec<String>,

    /// Named outcome label, in order (can be specified multiple times)
    #[arg(long = "outcome", value_name = "LABEL")]
    pub outcome: Vec<String>,

    /// Number of deliberation rounds
    #[arg(short, long, value_name = "N")]
    pub rounds: Option<u32>,

    /// Justifier as PROVIDER/MODEL (overrides the config justifier)
    #[arg(long, value_name = "SPEC")]
    pub justifier: Option<String>,

    /// Attach a single image file
    #[arg(long, value_name = "PATH")]
    pub image: Option<PathBuf>,

    /// Attach a text file (can be specified multiple times)
    #[arg(long = "attach", value_name = "PATH")]
    pub attach: Vec<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "full")]
    pub output: OutputFormat,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Append the machine-readable interaction log to this JSONL file
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

/// Parse a `PROVIDER/MODEL[@WEIGHT[xSAMPLES]]` panel argument.
///
/// Examples: `openai/gpt-4o`, `openai/gpt-4o@0.8`, `openai/gpt-4o@0.8x3`.
pub fn parse_model_arg(arg: &str) -> Result<ModelSpec, String> {
    let (provider, rest) = arg
        .split_once('/')
        .ok_or_else(|| format!("expected PROVIDER/MODEL, got '{arg}'"))?;
    if provider.is_empty() {
        return Err(format!("empty provider in '{arg}'"));
    }

    let (model, modifiers) = match rest.split_once('@') {
        Some((model, modifiers)) => (model, Some(modifiers)),
        None => (rest, None),
    };
    if model.is_empty() {
        return Err(format!("empty model in '{arg}'"));
    }

    let mut spec = ModelSpec::new(provider, model);
    if let Some(modifiers) = modifiers {
        let (weight, samples) = match modifiers.split_once('x') {
            Some((weight, samples)) => (weight, Some(samples)),
            None => (modifiers, None),
        };
        spec = spec.with_weight(
            weight
                .parse()
                .map_err(|_| format!("invalid weight '{weight}' in '{arg}'"))?,
        );
        if let Some(samples) = samples {
            spec = spec.with_samples(
                samples
                    .parse()
                    .map_err(|_| format!("invalid sample count '{samples}' in '{arg}'"))?,
            );
        }
    }

    Ok(spec)
}

/// Parse a `PROVIDER/MODEL` justifier argument.
pub fn parse_justifier_arg(arg: &str) -> Result<(String, String), String> {
    match arg.split_once('/') {
        Some((provider, model)) if !provider.is_empty() && !model.is_empty() => {
            Ok((provider.to_string(), model.to_string()))
        }
        _ => Err(format!("expected PROVIDER/MODEL, got '{arg}'")),
    }
}
