use super::errors::LearnerError;
use crate::env::UnitId;
use crate::features::FeatureContext;

/// Approximate action value: the inner product of `weights` and `features`.
pub fn q_value(weights: &[f64], features: &[f64]) -> Result<f64, LearnerError> {
    if weights.len() != features.len() {
        return Err(LearnerError::LengthMismatch {
            weights: weights.len(),
            features: features.len(),
        });
    }
    Ok(weights.iter().zip(features).map(|(w, f)| w * f).sum())
}

/// Q-value of `attacker` attacking `candidate` in the given context.
pub fn evaluate(
    ctx: &FeatureContext<'_>,
    weights: &[f64],
    attacker: UnitId,
    candidate: UnitId,
) -> Result<f64, LearnerError> {
    q_value(weights, &ctx.extract(attacker, candidate)?)
}

/// Best Q-value over every live opposing unit, `None` when none remain.
pub fn max_q(
    ctx: &FeatureContext<'_>,
    weights: &[f64],
    attacker: UnitId,
) -> Result<Option<f64>, LearnerError> {
    let mut best: Option<f64> = None;
    for candidate in ctx.roster.opposing_ids() {
        let q = evaluate(ctx, weights, attacker, *candidate)?;
        best = Some(best.map_or(q, |b| b.max(q)));
    }
    Ok(best)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bias_feature_selects_first_weight() {
        let w = [0.37, -4.0, 12.5, 0.0, 9.0];
        assert_eq!(q_value(&w, &[1.0, 0.0, 0.0, 0.0, 0.0]).unwrap(), w[0]);
    }

    #[test]
    fn inner_product() {
        let q = q_value(&[1.0, 2.0, -1.0], &[0.5, 0.25, 2.0]).unwrap();
        assert_eq!(q, -1.0);
    }

    #[test]
    fn length_mismatch_is_fatal() {
        let err = q_value(&[1.0, 2.0], &[1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(
            err,
            LearnerError::LengthMismatch {
                weights: 2,
                features: 3
            }
        ));
    }
}
