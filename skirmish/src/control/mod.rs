mod controller;
mod errors;
mod report;
mod schedule;

pub use controller::{Controller, EpisodeOutcome, EpisodeResult};
pub use errors::ControlError;
pub use report::LearningCurve;
pub use schedule::{EVAL_CYCLE, EVAL_EPISODES, EvaluationSchedule, Mode};
