use super::errors::SimError;
use super::types::{Commands, Snapshot, TurnHistory};

/// Result of advancing the simulation by one turn.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// State at the start of the new turn.
    pub snapshot: Snapshot,
    /// Events logged during the turn that just finished.
    pub history: TurnHistory,
    pub done: bool,
}

/// The turn-based simulation hosting the controller.
///
/// The simulation owns movement, pathfinding and combat resolution. The
/// controller only sees the current [`Snapshot`] and the [`TurnHistory`] of
/// the previous turn, and answers with [`Commands`].
pub trait Simulation {
    /// Start a new episode and return the turn-0 snapshot.
    fn reset(&mut self) -> Result<Snapshot, SimError>;

    /// Apply `commands` (possibly empty, letting in-flight orders continue)
    /// and resolve one turn.
    fn step(&mut self, commands: &Commands) -> Result<TurnOutcome, SimError>;
}
