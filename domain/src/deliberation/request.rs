//! Deliberation request types
//!
//! The immutable input surface of the engine: which models vote, over which
//! outcomes, for how many rounds, with which attachments.

use crate::ballot::aggregate::validate_weights;
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// One participating connector/model pair (Value Object)
///
/// Immutable for the lifetime of a request. `weight` expresses the caller's
/// trust in this model relative to its peers; `samples` is how many times
/// the model is asked per round, to reduce variance by averaging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSpec {
    /// Connector id this model is served by (e.g. "openai")
    pub provider: String,
    /// Model identifier within the provider (e.g. "gpt-4o")
    pub model: String,
    /// Aggregation weight in [0, 1]
    pub weight: f64,
    /// Invocations per round, at least 1
    pub samples: u32,
}

impl ModelSpec {
    pub fn new(provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
            weight: 1.0,
            samples: 1,
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_samples(mut self, samples: u32) -> Self {
        self.samples = samples;
        self
    }

    /// `provider/model`, the form used in peer summaries and errors.
    pub fn qualified_name(&self) -> String {
        format!("{}/{}", self.provider, self.model)
    }
}

/// Ordered outcome labels (Value Object)
///
/// When a request carries no outcome set, outcomes are addressed
/// positionally and labels are generated as `outcome1`, `outcome2`, ...
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcomes(Vec<String>);

impl Outcomes {
    /// Create a named outcome set; rejects an empty list.
    pub fn new(labels: Vec<String>) -> Result<Self, DomainError> {
        if labels.is_empty() {
            return Err(DomainError::NoOutcomes);
        }
        Ok(Self(labels))
    }

    pub fn labels(&self) -> &[String] {
        &self.0
    }

    /// Dimensionality every vote must match.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Positional labels for a request without a named outcome set.
pub fn positional_labels(count: usize) -> Vec<String> {
    (1..=count).map(|i| format!("outcome{}", i)).collect()
}

/// Payload kind of an attachment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    Image,
    Text,
}

/// A normalized request attachment
///
/// A single image payload and a general attachment list are distinct
/// connector capability tiers; the controller picks the richest form the
/// connector supports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub kind: AttachmentKind,
    pub payload: Vec<u8>,
    pub media_type: String,
}

impl Attachment {
    pub fn image(payload: Vec<u8>, media_type: impl Into<String>) -> Self {
        Self {
            kind: AttachmentKind::Image,
            payload,
            media_type: media_type.into(),
        }
    }

    pub fn text(content: impl Into<String>, media_type: impl Into<String>) -> Self {
        Self {
            kind: AttachmentKind::Text,
            payload: content.into().into_bytes(),
            media_type: media_type.into(),
        }
    }

    /// The payload as UTF-8 text, for text attachments.
    pub fn as_text(&self) -> Option<&str> {
        match self.kind {
            AttachmentKind::Text => std::str::from_utf8(&self.payload).ok(),
            AttachmentKind::Image => None,
        }
    }
}

/// The immutable input of one deliberation (Entity)
///
/// Created per call, never persisted by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliberationRequest {
    /// The question put to the panel
    pub prompt: String,
    /// Named outcome set; `None` means positional outcomes
    pub outcomes: Option<Outcomes>,
    /// Participating models, in deterministic order
    pub models: Vec<ModelSpec>,
    /// Number of deliberation rounds, at least 1
    pub rounds: u32,
    /// Attachments shared with every model
    pub attachments: Vec<Attachment>,
}

impl DeliberationRequest {
    pub fn new(prompt: impl Into<String>, models: Vec<ModelSpec>) -> Self {
        Self {
            prompt: prompt.into(),
            outcomes: None,
            models,
            rounds: 1,
            attachments: Vec::new(),
        }
    }

    pub fn with_outcomes(mut self, outcomes: Outcomes) -> Self {
        self.outcomes = Some(outcomes);
        self
    }

    pub fn with_rounds(mut self, rounds: u32) -> Self {
        self.rounds = rounds;
        self
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// Validate everything checkable without a connector.
    ///
    /// Runs before any network activity; a rejected request costs nothing.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.prompt.trim().is_empty() {
            return Err(DomainError::EmptyPrompt);
        }
        if self.models.is_empty() {
            return Err(DomainError::NoModels);
        }
        if self.rounds == 0 {
            return Err(DomainError::ZeroRounds);
        }
        for spec in &self.models {
            if spec.samples == 0 {
                return Err(DomainError::ZeroSamples {
                    model: spec.qualified_name(),
                });
            }
        }

        let weights: Vec<f64> = self.models.iter().map(|spec| spec.weight).collect();
        validate_weights(&weights)
    }

    /// Vector arity every vote must match, when outcomes are named.
    pub fn expected_outcomes(&self) -> Option<usize> {
        self.outcomes.as_ref().map(Outcomes::len)
    }

    /// The attachment, if the request carries exactly one image and nothing
    /// else — the shape the single-image capability tier accepts.
    pub fn single_image(&self) -> Option<&Attachment> {
        match self.attachments.as_slice() {
            [only] if only.kind == AttachmentKind::Image => Some(only),
            _ => None,
        }
    }
}
