//! Sample averaging
//!
//! A model queried `sampleCount` times in one round produces several votes;
//! [`average_samples`] reduces them to one representative opinion. The
//! numeric vectors are averaged per component; justification text is not
//! averaged (natural language doesn't mix), so every sample's vote is kept
//! for feedback and synthesis.

use super::vector::VectorError;
use super::vote::Vote;
use serde::{Deserialize, Serialize};

/// The reduced opinion of one model in one round
///
/// `scores` holds the per-component floored arithmetic mean of the sample
/// vectors. Flooring means the averaged components may fall short of the
/// full million by up to `len - 1` parts, so the result is kept as raw
/// components rather than re-validated as a `DecisionVector`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampledVote {
    /// Floored per-component mean over all samples
    pub scores: Vec<u64>,
    /// The original sample votes, in invocation order
    pub samples: Vec<Vote>,
}

impl SampledVote {
    /// Justification text of every retained sample, in order.
    pub fn justifications(&self) -> impl Iterator<Item = &str> {
        self.samples.iter().map(|vote| vote.justification.as_str())
    }
}

/// Reduce the repeated votes of one model into a [`SampledVote`].
///
/// Identity for a single sample. All samples must score the same number of
/// outcomes; the parser guarantees that when the outcome set is named, and
/// a mismatch is rejected here otherwise.
pub fn average_samples(votes: Vec<Vote>) -> Result<SampledVote, VectorError> {
    let Some(first) = votes.first() else {
        return Err(VectorError::Empty);
    };

    let arity = first.scores.len();
    for vote in &votes[1..] {
        if vote.scores.len() != arity {
            return Err(VectorError::LengthMismatch {
                expected: arity,
                actual: vote.scores.len(),
            });
        }
    }

    let count = votes.len() as u64;
    let scores = (0..arity)
        .map(|k| {
            let total: u64 = votes.iter().map(|vote| vote.scores.components()[k]).sum();
            total / count
        })
        .collect();

    Ok(SampledVote {
        scores,
        samples: votes,
    })
}
