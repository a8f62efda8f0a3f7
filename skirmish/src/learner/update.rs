use serde::{Deserialize, Serialize};

use super::errors::LearnerError;
use super::qfunction::{max_q, q_value};
use crate::env::UnitId;
use crate::features::FeatureContext;

pub const DEFAULT_GAMMA: f64 = 0.9;
pub const DEFAULT_LEARNING_RATE: f64 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TdParams {
    pub gamma: f64,
    pub learning_rate: f64,
}

impl Default for TdParams {
    fn default() -> Self {
        Self {
            gamma: DEFAULT_GAMMA,
            learning_rate: DEFAULT_LEARNING_RATE,
        }
    }
}

/// One semi-gradient TD(0) step.
///
/// The target is `reward + gamma * max_next_q` where `reward` is the unit's
/// cumulative episode reward so far, not the last step's reward.
pub fn td_update(
    weights: &[f64],
    features: &[f64],
    reward: f64,
    max_next_q: f64,
    params: TdParams,
) -> Result<Vec<f64>, LearnerError> {
    let current = q_value(weights, features)?;
    let target = reward + params.gamma * max_next_q;
    let error = target - current;
    Ok(weights
        .iter()
        .zip(features)
        .map(|(w, f)| {
            let gradient = -error * f;
            w - params.learning_rate * gradient
        })
        .collect())
}

/// Update `weights` for `attacker` having chosen the action described by
/// `features`, bootstrapping from the best current action value.
///
/// With no opposing units left the bootstrap term is zero.
pub fn update(
    ctx: &FeatureContext<'_>,
    weights: &[f64],
    features: &[f64],
    total_reward: f64,
    attacker: UnitId,
    params: TdParams,
) -> Result<Vec<f64>, LearnerError> {
    let best = max_q(ctx, weights, attacker)?.unwrap_or(0.0);
    td_update(weights, features, total_reward, best, params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_td_error_leaves_weights_unchanged() {
        let weights = [0.5, -0.25, 2.0, 1.0, -1.5];
        let features = [1.0, 2.0, 0.5, 0.25, -1.0];
        let current = q_value(&weights, &features).unwrap();

        let updated = td_update(&weights, &features, current, 0.0, TdParams::default()).unwrap();
        assert_eq!(updated, weights.to_vec());
    }

    #[test]
    fn positive_error_moves_weights_along_features() {
        let params = TdParams {
            gamma: 0.5,
            learning_rate: 0.1,
        };
        let updated = td_update(&[0.0, 0.0], &[1.0, -2.0], 1.0, 2.0, params).unwrap();
        // target 2.0, current 0.0
        assert!((updated[0] - 0.2).abs() < 1e-12);
        assert!((updated[1] + 0.4).abs() < 1e-12);
    }

    #[test]
    fn mismatched_lengths_propagate() {
        let err = td_update(&[0.0; 4], &[1.0; 5], 0.0, 0.0, TdParams::default()).unwrap_err();
        assert!(matches!(err, LearnerError::LengthMismatch { .. }));
    }
}
