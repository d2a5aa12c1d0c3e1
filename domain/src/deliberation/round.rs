//! Round state
//!
//! The accumulator the round loop owns. Each round's votes fold into a new
//! state by value, with no shared mutation across concurrent tasks; the
//! final state's composite and summaries become the engine's output.

use crate::ballot::aggregate::aggregate_weighted;
use crate::ballot::averaging::SampledVote;

/// One model's reduced contribution to a round
#[derive(Debug, Clone)]
pub struct ModelBallot {
    pub provider: String,
    pub model: String,
    pub weight: f64,
    pub vote: SampledVote,
}

impl ModelBallot {
    pub fn new(
        provider: impl Into<String>,
        model: impl Into<String>,
        weight: f64,
        vote: SampledVote,
    ) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
            weight,
            vote,
        }
    }
}

/// Accumulator for the deliberation loop (Value Object)
///
/// Holds the composite vector of the round just completed and one formatted
/// summary per sample of every model — the feedback injected into the next
/// round's prompts, giving every model visibility into its peers' votes and
/// reasoning. Created empty before round 0, replaced wholesale by
/// [`RoundState::advance`] at the end of every round.
#[derive(Debug, Clone, Default)]
pub struct RoundState {
    composite: Vec<u64>,
    summaries: Vec<String>,
}

impl RoundState {
    /// The state before any round has completed.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Fold a completed round into the next state.
    ///
    /// Pure: aggregates the weighted composite and formats one summary per
    /// sample, in ballot order. The previous state is consumed — summaries
    /// never accumulate across rounds; each round's feedback reflects only
    /// the round just finished.
    pub fn advance(self, ballots: &[ModelBallot]) -> RoundState {
        let vectors: Vec<&[u64]> = ballots
            .iter()
            .map(|ballot| ballot.vote.scores.as_slice())
            .collect();
        let weights: Vec<f64> = ballots.iter().map(|ballot| ballot.weight).collect();
        let composite = aggregate_weighted(&vectors, &weights);

        let summaries = ballots
            .iter()
            .flat_map(|ballot| {
                ballot.vote.samples.iter().map(|sample| {
                    format!(
                        "From {}/{}: vector={}, justification={}",
                        ballot.provider, ballot.model, sample.scores, sample.justification
                    )
                })
            })
            .collect();

        RoundState {
            composite,
            summaries,
        }
    }

    /// Composite vector of the last completed round.
    pub fn composite(&self) -> &[u64] {
        &self.composite
    }

    /// Formatted per-sample summaries of the last completed round.
    pub fn summaries(&self) -> &[String] {
        &self.summaries
    }

    /// Newline-joined summaries, the shape the feedback template takes.
    pub fn feedback_digest(&self) -> String {
        self.summaries.join("\n")
    }

    pub fn has_completed_round(&self) -> bool {
        !self.composite.is_empty()
    }
}
