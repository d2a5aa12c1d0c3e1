//! Deliberation result types
//!
//! The terminal artifact handed back to the caller: one integer score per
//! outcome plus the synthesized justification.

use serde::{Deserialize, Serialize};

/// Final score for one outcome, in parts per million
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeScore {
    pub outcome: String,
    pub score: u64,
}

/// Terminal artifact of a deliberation
///
/// Scores are the floored components of the final composite vector; the
/// justification is the justifier connector's text, verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliberationResult {
    pub scores: Vec<OutcomeScore>,
    pub justification: String,
}

impl DeliberationResult {
    /// Pair outcome labels with the final composite components.
    ///
    /// Labels and components must have equal length; the controller
    /// guarantees this by deriving positional labels from the composite
    /// arity when the request named no outcomes.
    pub fn from_composite(
        labels: Vec<String>,
        composite: &[u64],
        justification: impl Into<String>,
    ) -> Self {
        debug_assert_eq!(labels.len(), composite.len());
        let scores = labels
            .into_iter()
            .zip(composite.iter().copied())
            .map(|(outcome, score)| OutcomeScore { outcome, score })
            .collect();

        Self {
            scores,
            justification: justification.into(),
        }
    }

    /// The highest-scored outcome, ties resolved to the earlier one.
    pub fn top_outcome(&self) -> Option<&OutcomeScore> {
        self.scores.iter().reduce(|best, candidate| {
            if candidate.score > best.score {
                candidate
            } else {
                best
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_composite_pairs_in_order() {
        let result = DeliberationResult::from_composite(
            vec!["approve".to_string(), "reject".to_string()],
            &[355_000, 645_000],
            "The panel leans toward rejection.",
        );

        assert_eq!(result.scores.len(), 2);
        assert_eq!(result.scores[0].outcome, "approve");
        assert_eq!(result.scores[0].score, 355_000);
        assert_eq!(result.scores[1].score, 645_000);
    }

    #[test]
    fn test_top_outcome() {
        let result = DeliberationResult::from_composite(
            vec!["a".to_string(), "b".to_string(), "c".to_string()],
            &[100_000, 700_000, 200_000],
            "",
        );
        assert_eq!(result.top_outcome().unwrap().outcome, "b");
    }

    #[test]
    fn test_top_outcome_tie_takes_earlier() {
        let result = DeliberationResult::from_composite(
            vec!["a".to_string(), "b".to_string()],
            &[500_000, 500_000],
            "",
        );
        assert_eq!(result.top_outcome().unwrap().outcome, "a");
    }
}
