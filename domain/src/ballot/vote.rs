//! Vote value object
//!
//! A vote is the canonical form of one raw model response: a validated
//! decision vector plus the model's free-text justification.

use super::vector::DecisionVector;
use serde::{Deserialize, Serialize};

/// A single scored opinion extracted from one model response
///
/// The serialized shape matches the wire contract models are instructed to
/// produce: `{"score": [...], "justification": "..."}`. Deserializing runs
/// the full vector validation, so a `Vote` is valid by construction.
///
/// # Example
///
/// ```
/// use conclave_domain::ballot::{DecisionVector, Vote};
///
/// let scores = DecisionVector::new(vec![700_000, 300_000]).unwrap();
/// let vote = Vote::new(scores, "Outcome one is better supported.");
/// assert_eq!(vote.scores.components(), &[700_000, 300_000]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    /// Scored confidence over the outcome set
    #[serde(rename = "score")]
    pub scores: DecisionVector,
    /// The model's reasoning for this distribution
    pub justification: String,
}

impl Vote {
    /// Create a new vote
    pub fn new(scores: DecisionVector, justification: impl Into<String>) -> Self {
        Self {
            scores,
            justification: justification.into(),
        }
    }

    /// Serialize to the canonical JSON wire shape.
    ///
    /// Feeding this string back through the parser yields an equal vote
    /// (round-trip law).
    pub fn to_canonical_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| String::from("{}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vote(components: Vec<u64>, justification: &str) -> Vote {
        Vote::new(DecisionVector::new(components).unwrap(), justification)
    }

    #[test]
    fn test_canonical_json_shape() {
        let v = vote(vec![700_000, 300_000], "x");
        assert_eq!(
            v.to_canonical_json(),
            r#"{"score":[700000,300000],"justification":"x"}"#
        );
    }

    #[test]
    fn test_deserialization_validates_vector() {
        let ok: Vote =
            serde_json::from_str(r#"{"score":[500000,500000],"justification":"even"}"#).unwrap();
        assert_eq!(ok.scores.components(), &[500_000, 500_000]);

        let bad: Result<Vote, _> =
            serde_json::from_str(r#"{"score":[1,2],"justification":"bad"}"#);
        assert!(bad.is_err());
    }
}
