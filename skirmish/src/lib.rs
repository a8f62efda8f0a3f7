pub mod config;
pub mod control;
pub mod env;
pub mod features;
pub mod learner;
pub mod policy;
pub mod reward;
pub mod roster;
pub mod train;

pub use config::AgentConfig;
pub use control::{Controller, EpisodeOutcome, EpisodeResult, Mode};
pub use env::{Action, Commands, Snapshot, TurnHistory, UnitId};
pub use train::{TrainingStats, run_session};
