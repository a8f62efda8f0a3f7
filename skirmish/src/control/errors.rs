use thiserror::Error;

use crate::config::ConfigError;
use crate::learner::LearnerError;

#[derive(Error, Debug)]
pub enum ControlError {
    #[error(transparent)]
    Learner(#[from] LearnerError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("no episode in progress")]
    NoEpisode,

    #[error("episode budget of {0} already played")]
    BudgetSpent(u64),
}
