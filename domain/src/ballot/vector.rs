//! Decision vector value object
//!
//! A decision vector is a fixed-point probability distribution over the
//! outcome set, expressed in parts per million. Integer components give
//! every model family a format-independent target and keep repeated
//! aggregation free of floating-point drift.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Total mass of a valid decision vector, in parts per million.
pub const VECTOR_TOTAL_PPM: u64 = 1_000_000;

/// Errors produced when validating decision vector components
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VectorError {
    #[error("Decision vector is empty")]
    Empty,

    #[error("Decision vector has {actual} components, expected {expected}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Decision vector components sum to {sum}, expected {VECTOR_TOTAL_PPM}")]
    SumMismatch { sum: u64 },
}

/// A probability distribution over outcomes in parts per million (Value Object)
///
/// Invariant: components are non-negative and sum to exactly
/// [`VECTOR_TOTAL_PPM`]. Violating vectors are rejected at construction,
/// never renormalized.
///
/// # Example
///
/// ```
/// use conclave_domain::ballot::DecisionVector;
///
/// let vector = DecisionVector::new(vec![600_000, 400_000]).unwrap();
/// assert_eq!(vector.len(), 2);
/// assert!(DecisionVector::new(vec![600_000, 300_000]).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u64>", into = "Vec<u64>")]
pub struct DecisionVector(Vec<u64>);

impl DecisionVector {
    /// Create a vector, enforcing the sum invariant.
    pub fn new(components: Vec<u64>) -> Result<Self, VectorError> {
        if components.is_empty() {
            return Err(VectorError::Empty);
        }
        let sum: u64 = components.iter().sum();
        if sum != VECTOR_TOTAL_PPM {
            return Err(VectorError::SumMismatch { sum });
        }
        Ok(Self(components))
    }

    /// Create a vector, additionally enforcing a fixed dimensionality.
    ///
    /// The length check runs first so a wrong-arity vector reports as a
    /// length mismatch even when its sum also happens to be off.
    pub fn with_len(components: Vec<u64>, expected: usize) -> Result<Self, VectorError> {
        if components.len() != expected {
            return Err(VectorError::LengthMismatch {
                expected,
                actual: components.len(),
            });
        }
        Self::new(components)
    }

    /// Number of outcomes this vector scores.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The raw parts-per-million components, in outcome order.
    pub fn components(&self) -> &[u64] {
        &self.0
    }

    /// Consume and return the inner components.
    pub fn into_components(self) -> Vec<u64> {
        self.0
    }
}

impl TryFrom<Vec<u64>> for DecisionVector {
    type Error = VectorError;

    fn try_from(components: Vec<u64>) -> Result<Self, Self::Error> {
        Self::new(components)
    }
}

impl From<DecisionVector> for Vec<u64> {
    fn from(vector: DecisionVector) -> Self {
        vector.0
    }
}

impl std::fmt::Display for DecisionVector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (i, component) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", component)?;
        }
        write!(f, "]")
    }
}
