//! Domain error types

use thiserror::Error;

/// Request validation errors
///
/// Every variant is detectable before any connector activity, so a bad
/// request never wastes a network call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Prompt must not be empty")]
    EmptyPrompt,

    #[error("No models configured for deliberation")]
    NoModels,

    #[error("Outcome set must not be empty")]
    NoOutcomes,

    #[error("Model weight {weight} is outside [0, 1]")]
    WeightOutOfRange { weight: f64 },

    #[error("Weight sum {sum} must be greater than 0 and at most {max}")]
    WeightSumOutOfBounds { sum: f64, max: usize },

    #[error("Iteration count must be at least 1")]
    ZeroRounds,

    #[error("Sample count must be at least 1 for model {model}")]
    ZeroSamples { model: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = DomainError::WeightSumOutOfBounds { sum: 2.5, max: 2 };
        assert_eq!(
            error.to_string(),
            "Weight sum 2.5 must be greater than 0 and at most 2"
        );
    }

    #[test]
    fn test_zero_samples_names_model() {
        let error = DomainError::ZeroSamples {
            model: "openai/gpt-4o".to_string(),
        };
        assert!(error.to_string().contains("openai/gpt-4o"));
    }
}
