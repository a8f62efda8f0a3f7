use std::collections::BTreeSet;

use rand::Rng;
use rand::rngs::StdRng;
use tracing::debug;

use crate::env::UnitId;
use crate::features::FeatureContext;
use crate::learner::{LearnerError, evaluate};

pub const DEFAULT_EPSILON: f64 = 0.02;

/// Epsilon-greedy choice of an attack target.
///
/// Holds the run's single random generator. Exactly one uniform draw is
/// consumed per exploration check, and no draw at all while frozen or when
/// `epsilon` is zero. On exploration the same draw, rescaled by `epsilon`,
/// picks the uniform index.
#[derive(Debug, Clone)]
pub struct EpsilonGreedy<R = StdRng> {
    epsilon: f64,
    rng: R,
}

impl<R: Rng> EpsilonGreedy<R> {
    pub fn new(epsilon: f64, rng: R) -> Self {
        Self { epsilon, rng }
    }

    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    /// Pick among `candidates`, scoring them with `score` when acting greedily.
    /// Ties go to the first candidate in iteration order.
    pub fn select<F>(
        &mut self,
        candidates: &BTreeSet<UnitId>,
        frozen: bool,
        mut score: F,
    ) -> Result<Option<UnitId>, LearnerError>
    where
        F: FnMut(UnitId) -> Result<f64, LearnerError>,
    {
        if candidates.is_empty() {
            return Ok(None);
        }

        if !frozen && self.epsilon > 0.0 {
            let draw: f64 = self.rng.gen_range(0.0..1.0);
            if draw < self.epsilon {
                let n = candidates.len();
                let index = (((draw / self.epsilon) * n as f64).floor() as usize).min(n - 1);
                debug!(index, "exploring");
                return Ok(candidates.iter().nth(index).copied());
            }
        }

        let mut best: Option<(UnitId, f64)> = None;
        for candidate in candidates {
            let q = score(*candidate)?;
            if best.is_none_or(|(_, b)| q > b) {
                best = Some((*candidate, q));
            }
        }
        Ok(best.map(|(id, _)| id))
    }

    /// Pick a target for `attacker` among the live opposing units in `ctx`.
    pub fn select_target(
        &mut self,
        ctx: &FeatureContext<'_>,
        weights: &[f64],
        attacker: UnitId,
        frozen: bool,
    ) -> Result<Option<UnitId>, LearnerError> {
        self.select(ctx.roster.opposing_ids(), frozen, |candidate| {
            evaluate(ctx, weights, attacker, candidate)
        })
    }
}
