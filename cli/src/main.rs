//! CLI entrypoint for conclave
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{bail, Context, Result};
use clap::Parser;
use conclave_application::{
    ConnectorRegistry, EngineConfig, InteractionLogger, JustifierSpec, RunDeliberationUseCase,
};
use conclave_domain::{Attachment, DeliberationRequest, Outcomes};
use conclave_infrastructure::{
    ConfigLoader, FileConfig, JsonlInteractionLogger, OpenAiCompatConnector,
};
use conclave_presentation::{
    parse_justifier_arg, parse_model_arg, Cli, ConsoleFormatter, OutputFormat, ProgressReporter,
};
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!("Starting conclave");

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).map_err(|e| anyhow::anyhow!("{e}"))?
    };

    let Some(prompt) = cli.prompt.clone() else {
        bail!("A question is required; see --help for usage.");
    };

    // Panel: CLI -m args override the config panel
    let models = if cli.model.is_empty() {
        config.to_model_specs()
    } else {
        cli.model
            .iter()
            .map(|arg| parse_model_arg(arg).map_err(anyhow::Error::msg))
            .collect::<Result<Vec<_>>>()?
    };
    if models.is_empty() {
        bail!("No panel configured. Pass -m PROVIDER/MODEL or add [[panel]] entries to conclave.toml.");
    }

    // Justifier: CLI flag overrides the config value
    let engine_config = match &cli.justifier {
        Some(arg) => {
            let (provider, model) = parse_justifier_arg(arg).map_err(anyhow::Error::msg)?;
            EngineConfig::new(JustifierSpec::new(provider, model))
                .with_max_concurrency(config.engine.max_concurrency)
        }
        None => match config.to_engine_config() {
            Some(engine_config) => engine_config,
            None => bail!(
                "No justifier configured. Pass --justifier PROVIDER/MODEL or add a [justifier] section to conclave.toml."
            ),
        },
    };

    let registry = build_registry(&config)?;

    // === Build the request ===
    let mut request = DeliberationRequest::new(prompt.clone(), models.clone())
        .with_rounds(cli.rounds.unwrap_or(config.engine.rounds));

    if !cli.outcome.is_empty() {
        request = request.with_outcomes(Outcomes::new(cli.outcome.clone())?);
    }
    if let Some(path) = &cli.image {
        let payload = std::fs::read(path)
            .with_context(|| format!("could not read image {}", path.display()))?;
        request = request.with_attachment(Attachment::image(payload, image_media_type(path)));
    }
    for path in &cli.attach {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("could not read attachment {}", path.display()))?;
        request = request.with_attachment(Attachment::text(content, text_media_type(path)));
    }

    // === Dependency injection ===
    let mut use_case = RunDeliberationUseCase::new(Arc::new(registry), engine_config);
    if let Some(path) = &cli.log_file {
        let logger = JsonlInteractionLogger::create(path)
            .with_context(|| format!("could not open log file {}", path.display()))?;
        use_case = use_case.with_interaction_log(Arc::new(logger) as Arc<dyn InteractionLogger>);
    }

    if !cli.quiet {
        println!();
        println!("Question: {}", prompt);
        println!(
            "Panel: {}",
            models
                .iter()
                .map(|m| m.qualified_name())
                .collect::<Vec<_>>()
                .join(", ")
        );
        println!();
    }

    let result = if cli.quiet {
        use_case.execute(request).await?
    } else {
        let progress = ProgressReporter::new();
        use_case.execute_with_progress(request, &progress).await?
    };

    let output = match cli.output {
        OutputFormat::Full => ConsoleFormatter::format(&result),
        OutputFormat::Scores => ConsoleFormatter::format_scores_only(&result),
        OutputFormat::Json => ConsoleFormatter::format_json(&result),
    };

    println!("{}", output);

    Ok(())
}

/// One OpenAI-compatible connector per `[providers.<id>]` entry.
fn build_registry(config: &FileConfig) -> Result<ConnectorRegistry> {
    let mut registry = ConnectorRegistry::new();
    for (provider_id, provider) in &config.providers {
        if provider.base_url.is_empty() {
            bail!("Provider '{provider_id}' has no base_url configured.");
        }
        let connector = OpenAiCompatConnector::new(provider_id.clone(), provider.base_url.clone())
            .with_api_key(provider.resolve_api_key());
        registry.register(Arc::new(connector));
    }
    Ok(registry)
}

fn image_media_type(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    }
}

fn text_media_type(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("md") => "text/markdown",
        Some("json") => "application/json",
        Some("csv") => "text/csv",
        _ => "text/plain",
    }
}
