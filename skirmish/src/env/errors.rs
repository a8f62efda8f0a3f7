use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Simulation error: {0}")]
    SimError(#[from] Box<dyn std::error::Error + Send + Sync>),

    #[error("unknown unit {0}")]
    UnknownUnit(super::UnitId),

    #[error("episode already finished")]
    EpisodeFinished,
}
