pub mod arena;
mod errors;
mod traits;
mod types;

pub use arena::Arena;
pub use errors::SimError;
pub use traits::{Simulation, TurnOutcome};
pub use types::{
    Action, CommandFeedback, Commands, DamageEvent, DeathEvent, FeedbackStatus, IssuedCommand,
    PlayerId, Position, Snapshot, TurnHistory, UnitId, UnitView,
};
