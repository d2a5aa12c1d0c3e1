//! Run deliberation use case
//!
//! The iteration controller: drives the round loop, fans out model
//! invocations, parses and reduces votes, and hands the final round's
//! composite and justifications to the justifier connector.
//!
//! Rounds are strictly sequential — round `i+1`'s prompts embed every vote
//! gathered in round `i`. Within a round, every (model, sample) invocation
//! is independent and runs concurrently, bounded by the configured
//! concurrency limit. Any single failure aborts the whole request: a model
//! silently dropping out would bias the weighted aggregate without the
//! caller's knowledge.

use crate::config::EngineConfig;
use crate::ports::connector::{Connector, ConnectorError, ConnectorRegistry};
use crate::ports::interaction_log::{InteractionEvent, InteractionLogger, NoInteractionLog};
use crate::ports::progress::{NoProgress, ProgressNotifier};
use conclave_domain::{
    average_samples, parse_vote, positional_labels, Attachment, DeliberationRequest,
    DeliberationResult, DomainError, ModelBallot, ModelSpec, ParseError, PromptTemplate,
    RoundState, VectorError,
};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can abort a deliberation
///
/// None of these are retried by the engine (retry policy belongs to the
/// connector), and all of them fail the entire request; partial results are
/// never returned as success.
#[derive(Error, Debug)]
pub enum DeliberationError {
    #[error("Invalid request: {0}")]
    InvalidRequest(#[from] DomainError),

    #[error("Unknown provider: {provider}")]
    UnsupportedProvider { provider: String },

    #[error("Model {provider}/{model} cannot take the supplied attachments")]
    CapabilityMismatch { provider: String, model: String },

    #[error("Connector call failed for {provider}/{model} in round {round}: {source}")]
    ConnectorFailure {
        provider: String,
        model: String,
        round: u32,
        #[source]
        source: ConnectorError,
    },

    #[error("Could not parse vote from {provider}/{model} in round {round}: {source}")]
    ParseFailure {
        provider: String,
        model: String,
        round: u32,
        #[source]
        source: ParseError,
    },

    #[error("Inconsistent vote arity from {provider}/{model} in round {round}: {source}")]
    InconsistentSamples {
        provider: String,
        model: String,
        round: u32,
        #[source]
        source: VectorError,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

/// How the controller will invoke a connector for this request
///
/// Resolved once per model before any network activity. Attachments take
/// priority over the single-image form when a connector supports both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InvocationForm {
    Text,
    SingleImage,
    Attachments,
}

/// A model spec bound to its resolved connector and invocation form
struct Panelist {
    spec: ModelSpec,
    connector: Arc<dyn Connector>,
    form: InvocationForm,
}

/// Use case for running a full deliberation
pub struct RunDeliberationUseCase {
    registry: Arc<ConnectorRegistry>,
    config: EngineConfig,
    interaction_log: Arc<dyn InteractionLogger>,
}

impl RunDeliberationUseCase {
    pub fn new(registry: Arc<ConnectorRegistry>, config: EngineConfig) -> Self {
        Self {
            registry,
            config,
            interaction_log: Arc::new(NoInteractionLog),
        }
    }

    /// Attach an interaction logger; the engine notifies it but never
    /// depends on it.
    pub fn with_interaction_log(mut self, logger: Arc<dyn InteractionLogger>) -> Self {
        self.interaction_log = logger;
        self
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(
        &self,
        request: DeliberationRequest,
    ) -> Result<DeliberationResult, DeliberationError> {
        self.execute_with_progress(request, &NoProgress).await
    }

    /// Execute the use case with progress callbacks
    pub async fn execute_with_progress(
        &self,
        request: DeliberationRequest,
        progress: &dyn ProgressNotifier,
    ) -> Result<DeliberationResult, DeliberationError> {
        request.validate()?;

        // Resolve every connector and invocation form up front, so a bad
        // panel costs no network calls.
        let panel = self.resolve_panel(&request)?;
        let justifier = self.registry.get(&self.config.justifier.provider).ok_or(
            DeliberationError::UnsupportedProvider {
                provider: self.config.justifier.provider.clone(),
            },
        )?;

        info!(
            models = panel.len(),
            rounds = request.rounds,
            "Starting deliberation"
        );
        self.interaction_log.log(InteractionEvent::new(
            "deliberation_started",
            serde_json::json!({
                "prompt": request.prompt,
                "models": request.models.iter().map(ModelSpec::qualified_name).collect::<Vec<_>>(),
                "rounds": request.rounds,
            }),
        ));

        let expected_arity = request.expected_outcomes();
        let instructions = PromptTemplate::render_initial(request.outcomes.as_ref());

        let mut state = RoundState::empty();
        for round in 0..request.rounds {
            let prompt = compose_round_prompt(&instructions, &request.prompt, &state);
            let ballots = self
                .run_round(round, &panel, &prompt, &request.attachments, expected_arity, progress)
                .await?;
            state = state.advance(&ballots);

            progress.on_round_complete(round);
            self.interaction_log.log(InteractionEvent::new(
                "round_completed",
                serde_json::json!({
                    "round": round,
                    "composite": state.composite(),
                }),
            ));
        }

        let justification = self
            .synthesize(justifier.as_ref(), &state, request.rounds, progress)
            .await?;

        let labels = match &request.outcomes {
            Some(outcomes) => outcomes.labels().to_vec(),
            None => positional_labels(state.composite().len()),
        };
        let result = DeliberationResult::from_composite(labels, state.composite(), justification);

        self.interaction_log.log(InteractionEvent::new(
            "deliberation_completed",
            serde_json::json!({
                "scores": result.scores,
            }),
        ));

        Ok(result)
    }

    /// Bind each model spec to its connector and invocation form.
    fn resolve_panel(
        &self,
        request: &DeliberationRequest,
    ) -> Result<Vec<Panelist>, DeliberationError> {
        request
            .models
            .iter()
            .map(|spec| {
                let connector = self.registry.get(&spec.provider).ok_or_else(|| {
                    DeliberationError::UnsupportedProvider {
                        provider: spec.provider.clone(),
                    }
                })?;
                let form = resolve_invocation_form(connector.as_ref(), spec, request)?;
                Ok(Panelist {
                    spec: spec.clone(),
                    connector,
                    form,
                })
            })
            .collect()
    }

    /// Run one round: fan out every (model, sample) invocation, then parse
    /// and reduce in deterministic panel order.
    async fn run_round(
        &self,
        round: u32,
        panel: &[Panelist],
        prompt: &str,
        attachments: &[Attachment],
        expected_arity: Option<usize>,
        progress: &dyn ProgressNotifier,
    ) -> Result<Vec<ModelBallot>, DeliberationError> {
        let total_votes: usize = panel.iter().map(|p| p.spec.samples as usize).sum();
        info!(round, total_votes, "Round start");
        progress.on_round_start(round, total_votes);

        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrency));
        let prompt: Arc<str> = Arc::from(prompt);
        let attachments: Arc<Vec<Attachment>> = Arc::new(attachments.to_vec());
        let mut join_set = JoinSet::new();

        for (model_index, panelist) in panel.iter().enumerate() {
            for sample_index in 0..panelist.spec.samples as usize {
                let connector = Arc::clone(&panelist.connector);
                let spec = panelist.spec.clone();
                let form = panelist.form;
                let prompt = Arc::clone(&prompt);
                let attachments = Arc::clone(&attachments);
                let semaphore = Arc::clone(&semaphore);

                join_set.spawn(async move {
                    let result = match semaphore.acquire_owned().await {
                        Ok(_permit) => {
                            invoke(connector.as_ref(), &spec, form, &prompt, &attachments).await
                        }
                        Err(_) => Err(ConnectorError::Other("concurrency gate closed".to_string())),
                    };
                    (model_index, sample_index, spec, result)
                });
            }
        }

        // Slots indexed by (model, sample) so completion order doesn't
        // matter; summaries and averaging see invocation order.
        let mut responses: Vec<Vec<Option<String>>> = panel
            .iter()
            .map(|p| vec![None; p.spec.samples as usize])
            .collect();

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((model_index, sample_index, spec, Ok(text))) => {
                    debug!(model = %spec.qualified_name(), round, "Vote received");
                    progress.on_vote_received(round, &spec.qualified_name(), true);
                    self.interaction_log.log(InteractionEvent::new(
                        "vote_received",
                        serde_json::json!({
                            "round": round,
                            "model": spec.qualified_name(),
                            "response": text,
                        }),
                    ));
                    responses[model_index][sample_index] = Some(text);
                }
                Ok((_, _, spec, Err(source))) => {
                    warn!(model = %spec.qualified_name(), round, error = %source, "Connector failed");
                    progress.on_vote_received(round, &spec.qualified_name(), false);
                    // Dropping the JoinSet aborts the round's in-flight calls.
                    return Err(DeliberationError::ConnectorFailure {
                        provider: spec.provider,
                        model: spec.model,
                        round,
                        source,
                    });
                }
                Err(join_error) => {
                    return Err(DeliberationError::Internal(format!(
                        "round task failed: {join_error}"
                    )));
                }
            }
        }

        let mut ballots = Vec::with_capacity(panel.len());
        for (panelist, sample_slots) in panel.iter().zip(responses) {
            let spec = &panelist.spec;
            let mut votes = Vec::with_capacity(sample_slots.len());
            for slot in sample_slots {
                let Some(text) = slot else {
                    return Err(DeliberationError::Internal(
                        "sample response missing after round completion".to_string(),
                    ));
                };
                let vote = parse_vote(&text, expected_arity).map_err(|source| {
                    DeliberationError::ParseFailure {
                        provider: spec.provider.clone(),
                        model: spec.model.clone(),
                        round,
                        source,
                    }
                })?;
                votes.push(vote);
            }

            let reduced = average_samples(votes).map_err(|source| {
                DeliberationError::InconsistentSamples {
                    provider: spec.provider.clone(),
                    model: spec.model.clone(),
                    round,
                    source,
                }
            })?;
            ballots.push(ModelBallot::new(
                spec.provider.clone(),
                spec.model.clone(),
                spec.weight,
                reduced,
            ));
        }

        Ok(ballots)
    }

    /// One call to the designated justifier; its text is the final
    /// justification, verbatim.
    async fn synthesize(
        &self,
        justifier: &dyn Connector,
        state: &RoundState,
        rounds: u32,
        progress: &dyn ProgressNotifier,
    ) -> Result<String, DeliberationError> {
        let justifier_spec = &self.config.justifier;
        info!(justifier = %justifier_spec.qualified_name(), "Synthesizing justification");
        progress.on_synthesis_start(&justifier_spec.qualified_name());

        let composite_display = format_components(state.composite());
        let prompt = PromptTemplate::synthesis_prompt(&composite_display, state.summaries());

        let justification = justifier
            .generate(&justifier_spec.model, PromptTemplate::synthesis_system(), &prompt)
            .await
            .map_err(|source| DeliberationError::ConnectorFailure {
                provider: justifier_spec.provider.clone(),
                model: justifier_spec.model.clone(),
                round: rounds.saturating_sub(1),
                source,
            })?;

        progress.on_synthesis_complete();
        self.interaction_log.log(InteractionEvent::new(
            "justification_synthesized",
            serde_json::json!({
                "justifier": justifier_spec.qualified_name(),
                "justification": justification,
            }),
        ));

        Ok(justification)
    }
}

/// Initial instructions + the caller's prompt, plus the peer feedback block
/// once a round has completed.
fn compose_round_prompt(instructions: &str, user_prompt: &str, state: &RoundState) -> String {
    let mut prompt = format!("{instructions}{user_prompt}");
    if state.has_completed_round() {
        prompt.push_str(&PromptTemplate::render_feedback(&state.feedback_digest()));
    }
    prompt
}

/// Choose the richest invocation form the connector supports for this
/// request, or fail before any network activity.
fn resolve_invocation_form(
    connector: &dyn Connector,
    spec: &ModelSpec,
    request: &DeliberationRequest,
) -> Result<InvocationForm, DeliberationError> {
    if request.attachments.is_empty() {
        return Ok(InvocationForm::Text);
    }
    if connector.attachment_support().is_some() {
        return Ok(InvocationForm::Attachments);
    }
    if request.single_image().is_some() && connector.image_support().is_some() {
        return Ok(InvocationForm::SingleImage);
    }
    Err(DeliberationError::CapabilityMismatch {
        provider: spec.provider.clone(),
        model: spec.model.clone(),
    })
}

/// Invoke the connector through the resolved form.
async fn invoke(
    connector: &dyn Connector,
    spec: &ModelSpec,
    form: InvocationForm,
    prompt: &str,
    attachments: &[Attachment],
) -> Result<String, ConnectorError> {
    let system = PromptTemplate::voting_system();
    match form {
        InvocationForm::Text => connector.generate(&spec.model, system, prompt).await,
        InvocationForm::SingleImage => {
            let Some(image) = attachments.first() else {
                return Err(ConnectorError::Other("image attachment missing".to_string()));
            };
            connector
                .image_support()
                .ok_or(ConnectorError::UnsupportedCapability)?
                .generate_with_image(&spec.model, system, prompt, &image.payload, &image.media_type)
                .await
        }
        InvocationForm::Attachments => {
            connector
                .attachment_support()
                .ok_or(ConnectorError::UnsupportedCapability)?
                .generate_with_attachments(&spec.model, system, prompt, attachments)
                .await
        }
    }
}

fn format_components(components: &[u64]) -> String {
    let joined = components
        .iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    format!("[{joined}]")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JustifierSpec;
    use crate::ports::connector::{AttachmentConnector, ImageConnector};
    use async_trait::async_trait;
    use conclave_domain::Outcomes;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Test connector replaying scripted responses and recording prompts.
    struct ScriptedConnector {
        id: &'static str,
        responses: Mutex<VecDeque<Result<String, ConnectorError>>>,
        prompts: Mutex<Vec<String>>,
        calls: AtomicUsize,
        with_image: bool,
        with_attachments: bool,
        image_calls: AtomicUsize,
        attachment_calls: AtomicUsize,
    }

    impl ScriptedConnector {
        fn new(id: &'static str, responses: Vec<&str>) -> Self {
            Self {
                id,
                responses: Mutex::new(
                    responses
                        .into_iter()
                        .map(|r| Ok(r.to_string()))
                        .collect(),
                ),
                prompts: Mutex::new(Vec::new()),
                calls: AtomicUsize::new(0),
                with_image: false,
                with_attachments: false,
                image_calls: AtomicUsize::new(0),
                attachment_calls: AtomicUsize::new(0),
            }
        }

        fn failing(id: &'static str) -> Self {
            let mut connector = Self::new(id, vec![]);
            connector
                .responses
                .get_mut()
                .unwrap()
                .push_back(Err(ConnectorError::RequestFailed("boom".to_string())));
            connector
        }

        fn with_image_support(mut self) -> Self {
            self.with_image = true;
            self
        }

        fn with_attachment_support(mut self) -> Self {
            self.with_attachments = true;
            self
        }

        fn next_response(&self) -> Result<String, ConnectorError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ConnectorError::Other("script exhausted".to_string())))
        }

        fn recorded_prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Connector for ScriptedConnector {
        fn provider_id(&self) -> &str {
            self.id
        }

        async fn generate(
            &self,
            _model: &str,
            _system: &str,
            prompt: &str,
        ) -> Result<String, ConnectorError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.next_response()
        }

        fn image_support(&self) -> Option<&dyn ImageConnector> {
            self.with_image.then_some(self as &dyn ImageConnector)
        }

        fn attachment_support(&self) -> Option<&dyn AttachmentConnector> {
            self.with_attachments
                .then_some(self as &dyn AttachmentConnector)
        }
    }

    #[async_trait]
    impl ImageConnector for ScriptedConnector {
        async fn generate_with_image(
            &self,
            _model: &str,
            _system: &str,
            prompt: &str,
            _image: &[u8],
            _media_type: &str,
        ) -> Result<String, ConnectorError> {
            self.image_calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.next_response()
        }
    }

    #[async_trait]
    impl AttachmentConnector for ScriptedConnector {
        async fn generate_with_attachments(
            &self,
            _model: &str,
            _system: &str,
            prompt: &str,
            _attachments: &[Attachment],
        ) -> Result<String, ConnectorError> {
            self.attachment_calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.next_response()
        }
    }

    fn engine_config() -> EngineConfig {
        EngineConfig::new(JustifierSpec::new("oracle", "rapporteur-1"))
    }

    fn registry_with(connectors: Vec<Arc<ScriptedConnector>>) -> Arc<ConnectorRegistry> {
        let mut registry = ConnectorRegistry::new();
        for connector in connectors {
            registry.register(connector);
        }
        Arc::new(registry)
    }

    fn vote_json(first: u64, second: u64, justification: &str) -> String {
        format!(r#"{{"score":[{first},{second}],"justification":"{justification}"}}"#)
    }

    fn two_outcomes() -> Outcomes {
        Outcomes::new(vec!["approve".to_string(), "reject".to_string()]).unwrap()
    }

    // ==================== End-to-end ====================

    #[tokio::test]
    async fn test_weighted_composite_with_sampling() {
        let alpha = Arc::new(ScriptedConnector::new(
            "alpha",
            vec![
                &vote_json(400_000, 600_000, "first look"),
                &vote_json(420_000, 580_000, "second look"),
            ],
        ));
        let beta = Arc::new(ScriptedConnector::new(
            "beta",
            vec![&vote_json(300_000, 700_000, "clear case")],
        ));
        let oracle = Arc::new(ScriptedConnector::new("oracle", vec!["the panel leans reject"]));

        let use_case = RunDeliberationUseCase::new(
            registry_with(vec![alpha.clone(), beta, oracle]),
            engine_config(),
        );

        let request = DeliberationRequest::new(
            "Should we ship?",
            vec![
                ModelSpec::new("alpha", "model-a").with_weight(0.5).with_samples(2),
                ModelSpec::new("beta", "model-b").with_weight(0.5),
            ],
        )
        .with_outcomes(two_outcomes());

        let result = use_case.execute(request).await.unwrap();

        // A's samples average to [410000, 590000]; with B at equal weight
        // the composite floors to [355000, 645000].
        assert_eq!(result.scores[0].outcome, "approve");
        assert_eq!(result.scores[0].score, 355_000);
        assert_eq!(result.scores[1].outcome, "reject");
        assert_eq!(result.scores[1].score, 645_000);
        assert_eq!(result.justification, "the panel leans reject");
        assert_eq!(alpha.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_positional_labels_without_outcome_set() {
        let alpha = Arc::new(ScriptedConnector::new(
            "alpha",
            vec![&vote_json(250_000, 750_000, "ok")],
        ));
        let oracle = Arc::new(ScriptedConnector::new("oracle", vec!["done"]));

        let use_case = RunDeliberationUseCase::new(
            registry_with(vec![alpha, oracle]),
            engine_config(),
        );
        let request =
            DeliberationRequest::new("Pick one", vec![ModelSpec::new("alpha", "model-a")]);

        let result = use_case.execute(request).await.unwrap();
        assert_eq!(result.scores[0].outcome, "outcome1");
        assert_eq!(result.scores[1].outcome, "outcome2");
    }

    // ==================== Round feedback ====================

    #[tokio::test]
    async fn test_second_round_prompts_carry_first_round_justifications() {
        let alpha = Arc::new(ScriptedConnector::new(
            "alpha",
            vec![
                &vote_json(600_000, 400_000, "alpha initial reasoning"),
                &vote_json(550_000, 450_000, "alpha revised"),
            ],
        ));
        let beta = Arc::new(ScriptedConnector::new(
            "beta",
            vec![
                &vote_json(400_000, 600_000, "beta initial reasoning"),
                &vote_json(450_000, 550_000, "beta revised"),
            ],
        ));
        let oracle = Arc::new(ScriptedConnector::new("oracle", vec!["summary"]));

        let use_case = RunDeliberationUseCase::new(
            registry_with(vec![alpha.clone(), beta.clone(), oracle]),
            engine_config(),
        );
        let request = DeliberationRequest::new(
            "Which way?",
            vec![
                ModelSpec::new("alpha", "model-a"),
                ModelSpec::new("beta", "model-b"),
            ],
        )
        .with_outcomes(two_outcomes())
        .with_rounds(2);

        use_case.execute(request).await.unwrap();

        for connector in [&alpha, &beta] {
            let prompts = connector.recorded_prompts();
            assert_eq!(prompts.len(), 2);
            assert!(!prompts[0].contains("previous round"));
            // Round 2 sees every round-1 justification, from both peers.
            assert!(prompts[1].contains("alpha initial reasoning"));
            assert!(prompts[1].contains("beta initial reasoning"));
            assert!(prompts[1].contains("From alpha/model-a:"));
        }
    }

    // ==================== Validation & pre-flight ====================

    #[tokio::test]
    async fn test_invalid_weights_rejected_before_any_call() {
        let alpha = Arc::new(ScriptedConnector::new("alpha", vec![]));
        let oracle = Arc::new(ScriptedConnector::new("oracle", vec![]));
        let use_case = RunDeliberationUseCase::new(
            registry_with(vec![alpha.clone(), oracle]),
            engine_config(),
        );

        let request = DeliberationRequest::new(
            "Q",
            vec![
                ModelSpec::new("alpha", "model-a").with_weight(-0.1),
                ModelSpec::new("alpha", "model-b").with_weight(0.5),
            ],
        );

        let error = use_case.execute(request).await.unwrap_err();
        assert!(matches!(error, DeliberationError::InvalidRequest(_)));
        assert_eq!(alpha.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unknown_provider_rejected_before_any_call() {
        let oracle = Arc::new(ScriptedConnector::new("oracle", vec![]));
        let use_case =
            RunDeliberationUseCase::new(registry_with(vec![oracle]), engine_config());

        let request =
            DeliberationRequest::new("Q", vec![ModelSpec::new("nowhere", "model-x")]);

        let error = use_case.execute(request).await.unwrap_err();
        assert!(
            matches!(error, DeliberationError::UnsupportedProvider { provider } if provider == "nowhere")
        );
    }

    #[tokio::test]
    async fn test_unknown_justifier_rejected_before_any_call() {
        let alpha = Arc::new(ScriptedConnector::new(
            "alpha",
            vec![&vote_json(500_000, 500_000, "x")],
        ));
        let use_case = RunDeliberationUseCase::new(
            registry_with(vec![alpha.clone()]),
            engine_config(),
        );

        let request = DeliberationRequest::new("Q", vec![ModelSpec::new("alpha", "model-a")]);
        let error = use_case.execute(request).await.unwrap_err();

        assert!(
            matches!(error, DeliberationError::UnsupportedProvider { provider } if provider == "oracle")
        );
        assert_eq!(alpha.calls.load(Ordering::SeqCst), 0);
    }

    // ==================== Capability dispatch ====================

    #[tokio::test]
    async fn test_attachments_take_priority_over_image() {
        let alpha = Arc::new(
            ScriptedConnector::new("alpha", vec![&vote_json(500_000, 500_000, "seen")])
                .with_image_support()
                .with_attachment_support(),
        );
        let oracle = Arc::new(ScriptedConnector::new("oracle", vec!["fin"]));
        let use_case = RunDeliberationUseCase::new(
            registry_with(vec![alpha.clone(), oracle]),
            engine_config(),
        );

        let request = DeliberationRequest::new("Q", vec![ModelSpec::new("alpha", "model-a")])
            .with_outcomes(two_outcomes())
            .with_attachment(Attachment::image(vec![0xFF, 0xD8], "image/jpeg"));

        use_case.execute(request).await.unwrap();
        assert_eq!(alpha.attachment_calls.load(Ordering::SeqCst), 1);
        assert_eq!(alpha.image_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_single_image_fallback_when_no_attachment_support() {
        let alpha = Arc::new(
            ScriptedConnector::new("alpha", vec![&vote_json(500_000, 500_000, "seen")])
                .with_image_support(),
        );
        let oracle = Arc::new(ScriptedConnector::new("oracle", vec!["fin"]));
        let use_case = RunDeliberationUseCase::new(
            registry_with(vec![alpha.clone(), oracle]),
            engine_config(),
        );

        let request = DeliberationRequest::new("Q", vec![ModelSpec::new("alpha", "model-a")])
            .with_outcomes(two_outcomes())
            .with_attachment(Attachment::image(vec![0xFF, 0xD8], "image/jpeg"));

        use_case.execute(request).await.unwrap();
        assert_eq!(alpha.image_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_capability_mismatch_fails_before_any_call() {
        let alpha = Arc::new(ScriptedConnector::new("alpha", vec![]));
        let oracle = Arc::new(ScriptedConnector::new("oracle", vec![]));
        let use_case = RunDeliberationUseCase::new(
            registry_with(vec![alpha.clone(), oracle]),
            engine_config(),
        );

        let request = DeliberationRequest::new("Q", vec![ModelSpec::new("alpha", "model-a")])
            .with_attachment(Attachment::text("notes", "text/plain"));

        let error = use_case.execute(request).await.unwrap_err();
        assert!(matches!(error, DeliberationError::CapabilityMismatch { .. }));
        assert_eq!(alpha.calls.load(Ordering::SeqCst), 0);
    }

    // ==================== Fail-fast ====================

    #[tokio::test]
    async fn test_connector_failure_aborts_request() {
        let alpha = Arc::new(ScriptedConnector::new(
            "alpha",
            vec![&vote_json(500_000, 500_000, "fine")],
        ));
        let broken = Arc::new(ScriptedConnector::failing("broken"));
        let oracle = Arc::new(ScriptedConnector::new("oracle", vec!["unused"]));
        let use_case = RunDeliberationUseCase::new(
            registry_with(vec![alpha, broken, oracle]),
            engine_config(),
        );

        let request = DeliberationRequest::new(
            "Q",
            vec![
                ModelSpec::new("alpha", "model-a"),
                ModelSpec::new("broken", "model-b"),
            ],
        )
        .with_outcomes(two_outcomes());

        let error = use_case.execute(request).await.unwrap_err();
        assert!(matches!(
            error,
            DeliberationError::ConnectorFailure { ref provider, round: 0, .. } if provider == "broken"
        ));
    }

    #[tokio::test]
    async fn test_unparseable_response_aborts_with_raw_text() {
        let alpha = Arc::new(ScriptedConnector::new(
            "alpha",
            vec!["I refuse to answer in the requested format."],
        ));
        let oracle = Arc::new(ScriptedConnector::new("oracle", vec!["unused"]));
        let use_case = RunDeliberationUseCase::new(
            registry_with(vec![alpha, oracle]),
            engine_config(),
        );

        let request = DeliberationRequest::new("Q", vec![ModelSpec::new("alpha", "model-a")])
            .with_outcomes(two_outcomes());

        let error = use_case.execute(request).await.unwrap_err();
        match error {
            DeliberationError::ParseFailure { provider, source, .. } => {
                assert_eq!(provider, "alpha");
                assert!(source.raw_response().contains("refuse to answer"));
            }
            other => panic!("expected ParseFailure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_vector_sum_violation_is_parse_failure() {
        let alpha = Arc::new(ScriptedConnector::new(
            "alpha",
            vec![r#"{"score":[600000,300000],"justification":"off by 100k"}"#],
        ));
        let oracle = Arc::new(ScriptedConnector::new("oracle", vec!["unused"]));
        let use_case = RunDeliberationUseCase::new(
            registry_with(vec![alpha, oracle]),
            engine_config(),
        );

        let request = DeliberationRequest::new("Q", vec![ModelSpec::new("alpha", "model-a")])
            .with_outcomes(two_outcomes());

        let error = use_case.execute(request).await.unwrap_err();
        assert!(matches!(error, DeliberationError::ParseFailure { .. }));
    }

    #[tokio::test]
    async fn test_justifier_failure_aborts_request() {
        let alpha = Arc::new(ScriptedConnector::new(
            "alpha",
            vec![&vote_json(500_000, 500_000, "fine")],
        ));
        let oracle = Arc::new(ScriptedConnector::failing("oracle"));
        let use_case = RunDeliberationUseCase::new(
            registry_with(vec![alpha, oracle]),
            engine_config(),
        );

        let request = DeliberationRequest::new("Q", vec![ModelSpec::new("alpha", "model-a")])
            .with_outcomes(two_outcomes());

        let error = use_case.execute(request).await.unwrap_err();
        assert!(matches!(
            error,
            DeliberationError::ConnectorFailure { ref provider, .. } if provider == "oracle"
        ));
    }
}
