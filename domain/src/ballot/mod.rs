//! Ballot subdomain
//!
//! Everything between a raw model response and a round composite:
//!
//! - [`vector::DecisionVector`] — fixed-point simplex over the outcome set
//! - [`vote::Vote`] — one parsed response (vector + justification)
//! - [`parsing::parse_vote`] — multi-strategy response parsing
//! - [`averaging::average_samples`] — per-model sample reduction
//! - [`aggregate`] — cross-model weighted aggregation and weight validation

pub mod aggregate;
pub mod averaging;
pub mod parsing;
pub mod vector;
pub mod vote;

pub use aggregate::{aggregate_weighted, validate_weights};
pub use averaging::{average_samples, SampledVote};
pub use parsing::{parse_vote, ParseError};
pub use vector::{DecisionVector, VectorError, VECTOR_TOTAL_PPM};
pub use vote::Vote;
