//! Cross-model weighted aggregation
//!
//! One call per round: combine the reduced vote of every model into the
//! round's composite vector, weighted by each model's configured
//! reliability.

use crate::core::error::DomainError;

/// Validate panel weights before any connector activity.
///
/// Each weight must lie in `[0, 1]`. The sum must be strictly positive
/// (an all-zero panel has no opinion to aggregate) and at most the number
/// of models. The upper bound intentionally admits sums above 1.
pub fn validate_weights(weights: &[f64]) -> Result<(), DomainError> {
    for &weight in weights {
        if !weight.is_finite() || !(0.0..=1.0).contains(&weight) {
            return Err(DomainError::WeightOutOfRange { weight });
        }
    }

    let sum: f64 = weights.iter().sum();
    if sum <= 0.0 || sum > weights.len() as f64 {
        return Err(DomainError::WeightSumOutOfBounds {
            sum,
            max: weights.len(),
        });
    }

    Ok(())
}

/// Weighted per-component mean of already-normalized vectors.
///
/// `result[k] = floor(Σ_j vector_j[k] * weight_j / Σ_j weight_j)`.
///
/// The composite is NOT renormalized to sum exactly 1,000,000: inputs were
/// floored during sample averaging and the division floors again, so each
/// component can fall short of the true weighted mean by less than one part
/// per model. Callers rely on this exact behavior; see the drift test below.
///
/// Weights are validated upstream by [`validate_weights`]; the zero-sum
/// guard here only prevents a division by zero on misuse.
pub fn aggregate_weighted(vectors: &[&[u64]], weights: &[f64]) -> Vec<u64> {
    debug_assert_eq!(vectors.len(), weights.len());

    let arity = vectors.first().map(|v| v.len()).unwrap_or(0);
    let weight_sum: f64 = weights.iter().sum();
    if weight_sum <= 0.0 {
        return vec![0; arity];
    }

    (0..arity)
        .map(|k| {
            let weighted: f64 = vectors
                .iter()
                .zip(weights)
                .map(|(vector, &weight)| vector[k] as f64 * weight)
                .sum();
            (weighted / weight_sum).floor() as u64
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== validate_weights Tests ====================

    #[test]
    fn test_weights_within_bounds_accepted() {
        // Sum 1.1 is fine: the bound is the model count, not 1.0
        assert!(validate_weights(&[0.5, 0.6]).is_ok());
        assert!(validate_weights(&[1.0, 1.0, 1.0]).is_ok());
        assert!(validate_weights(&[0.001]).is_ok());
    }

    #[test]
    fn test_negative_weight_rejected() {
        assert_eq!(
            validate_weights(&[-0.1, 0.5]).unwrap_err(),
            DomainError::WeightOutOfRange { weight: -0.1 }
        );
    }

    #[test]
    fn test_weight_above_one_rejected() {
        assert!(matches!(
            validate_weights(&[1.5]).unwrap_err(),
            DomainError::WeightOutOfRange { .. }
        ));
    }

    #[test]
    fn test_all_zero_weights_rejected() {
        assert!(matches!(
            validate_weights(&[0.0, 0.0]).unwrap_err(),
            DomainError::WeightSumOutOfBounds { .. }
        ));
    }

    #[test]
    fn test_non_finite_weight_rejected() {
        assert!(validate_weights(&[f64::NAN]).is_err());
        assert!(validate_weights(&[f64::INFINITY]).is_err());
    }

    // ==================== aggregate_weighted Tests ====================

    #[test]
    fn test_equal_weights_average() {
        let composite = aggregate_weighted(
            &[&[600_000, 400_000], &[400_000, 600_000]],
            &[0.5, 0.5],
        );
        assert_eq!(composite, vec![500_000, 500_000]);
    }

    #[test]
    fn test_unequal_weights_shift_composite() {
        let composite = aggregate_weighted(
            &[&[1_000_000, 0], &[0, 1_000_000]],
            &[0.75, 0.25],
        );
        assert_eq!(composite, vec![750_000, 250_000]);
    }

    #[test]
    fn test_weighted_mean_is_floored() {
        // (1_000_000 * 1.0 + 0 * 1.0 + 0 * 1.0) / 3.0 = 333_333.33..
        let composite = aggregate_weighted(
            &[&[1_000_000, 0], &[0, 1_000_000], &[0, 1_000_000]],
            &[1.0, 1.0, 1.0],
        );
        assert_eq!(composite, vec![333_333, 666_666]);
    }

    #[test]
    fn test_composite_drift_is_bounded_by_model_count() {
        // Floor-heavy inputs: each component may lose < 1 ppm per model,
        // so the composite sum stays within num_models of the full million.
        let vectors: Vec<&[u64]> = vec![
            &[333_333, 333_333, 333_334],
            &[333_334, 333_333, 333_333],
            &[100_000, 400_000, 500_000],
        ];
        let weights = [0.3, 0.7, 0.9];
        let composite = aggregate_weighted(&vectors, &weights);

        let total: u64 = composite.iter().sum();
        let drift = 1_000_000u64.saturating_sub(total);
        assert!(
            drift <= vectors.len() as u64 * composite.len() as u64,
            "drift {drift} out of bound"
        );
        for (k, &component) in composite.iter().enumerate() {
            let exact: f64 = vectors
                .iter()
                .zip(&weights)
                .map(|(v, &w)| v[k] as f64 * w)
                .sum::<f64>()
                / weights.iter().sum::<f64>();
            assert!(exact - component as f64 >= 0.0);
            assert!(exact - component as f64 <= vectors.len() as f64);
        }
    }

    #[test]
    fn test_zero_weight_sum_guard() {
        let composite = aggregate_weighted(&[&[1_000_000, 0]], &[0.0]);
        assert_eq!(composite, vec![0, 0]);
    }
}
