use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::env::PlayerId;
use crate::learner::update::{DEFAULT_GAMMA, DEFAULT_LEARNING_RATE};
use crate::learner::{DEFAULT_WEIGHTS_PATH, TdParams};
use crate::policy::DEFAULT_EPSILON;

pub const DEFAULT_EPISODES: u64 = 10;
pub const DEFAULT_SEED: u64 = 12345;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Episodes to play before the session ends.
    pub episodes: u64,
    /// Restore weights from `weights_path` instead of drawing random ones.
    pub load_weights: bool,
    pub weights_path: PathBuf,
    pub seed: u64,
    pub gamma: f64,
    pub learning_rate: f64,
    pub epsilon: f64,
    pub player: PlayerId,
    pub enemy: PlayerId,
    /// Unit template the controller commands; other kinds are ignored.
    pub unit_kind: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            episodes: DEFAULT_EPISODES,
            load_weights: false,
            weights_path: PathBuf::from(DEFAULT_WEIGHTS_PATH),
            seed: DEFAULT_SEED,
            gamma: DEFAULT_GAMMA,
            learning_rate: DEFAULT_LEARNING_RATE,
            epsilon: DEFAULT_EPSILON,
            player: PlayerId(0),
            enemy: PlayerId(1),
            unit_kind: "footman".to_string(),
        }
    }
}

impl AgentConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field: &'static str, reason: &str| -> Result<(), ConfigError> {
            Err(ConfigError::Invalid {
                field,
                reason: reason.to_string(),
            })
        };
        if self.episodes == 0 {
            return invalid("episodes", "must be at least 1");
        }
        if !(0.0..=1.0).contains(&self.epsilon) {
            return invalid("epsilon", "must lie in [0, 1]");
        }
        if !(0.0..=1.0).contains(&self.gamma) {
            return invalid("gamma", "must lie in [0, 1]");
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return invalid("learning_rate", "must be finite and positive");
        }
        if self.player == self.enemy {
            return invalid("enemy", "must differ from player");
        }
        Ok(())
    }

    pub fn td_params(&self) -> TdParams {
        TdParams {
            gamma: self.gamma,
            learning_rate: self.learning_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_are_valid() {
        let config = AgentConfig::default();
        config.validate().unwrap();
        assert_eq!(config.gamma, 0.9);
        assert_eq!(config.learning_rate, 1e-4);
        assert_eq!(config.epsilon, 0.02);
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("agent.json");
        fs::write(&path, r#"{"episodes": 65, "load_weights": true, "seed": 7}"#).unwrap();

        let config = AgentConfig::from_json_file(&path).unwrap();
        assert_eq!(config.episodes, 65);
        assert!(config.load_weights);
        assert_eq!(config.seed, 7);
        assert_eq!(config.enemy, PlayerId(1));
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let config = AgentConfig {
            epsilon: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "epsilon", .. })
        ));

        let config = AgentConfig {
            learning_rate: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = AgentConfig {
            episodes: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            AgentConfig::from_json_file(dir.path().join("nope.json")),
            Err(ConfigError::Io { .. })
        ));
    }
}
