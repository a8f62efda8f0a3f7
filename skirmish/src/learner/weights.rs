use rand::Rng;
use serde::{Deserialize, Serialize};

use super::errors::LearnerError;
use crate::features::NUM_FEATURES;

/// The Q-function's weight vector, always exactly [`NUM_FEATURES`] long.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct Weights(Vec<f64>);

impl Weights {
    pub fn new(values: Vec<f64>) -> Result<Self, LearnerError> {
        if values.len() != NUM_FEATURES {
            return Err(LearnerError::LengthMismatch {
                weights: values.len(),
                features: NUM_FEATURES,
            });
        }
        Ok(Self(values))
    }

    /// Each weight drawn uniformly from `[-1, 1)`.
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self((0..NUM_FEATURES).map(|_| rng.gen_range(-1.0..1.0)).collect())
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<Vec<f64>> for Weights {
    type Error = LearnerError;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        Self::new(values)
    }
}

impl From<Weights> for Vec<f64> {
    fn from(weights: Weights) -> Self {
        weights.0
    }
}
