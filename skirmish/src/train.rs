// skirmish/src/train.rs
use std::time::{Duration, Instant};

use serde::Serialize;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::control::{ControlError, Controller, EpisodeResult};
use crate::env::{SimError, Simulation};
use crate::learner::WeightStore;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Sim(#[from] SimError),

    #[error(transparent)]
    Control(#[from] ControlError),
}

#[derive(Debug, Clone, Serialize)]
pub struct TrainingStats {
    pub run_id: Uuid,
    pub total_episodes: u64,
    pub total_turns: u64,
    pub wins: u64,
    pub losses: u64,
    pub undecided: u64,
    pub learning_curve: Vec<f64>,
    pub final_weights: Vec<f64>,
    pub training_time: Duration,
}

/// Play episodes of `sim` until the controller's episode budget is spent.
///
/// This is the host side of the per-turn protocol: reset, hand the turn-0
/// snapshot to the controller, then alternate simulation steps and controller
/// steps until the simulation reports the episode done.
pub fn run_session<E, S>(
    sim: &mut E,
    controller: &mut Controller<S>,
) -> Result<TrainingStats, SessionError>
where
    E: Simulation,
    S: WeightStore,
{
    let started = Instant::now();
    let mut stats = TrainingStats {
        run_id: controller.run_id(),
        total_episodes: 0,
        total_turns: 0,
        wins: 0,
        losses: 0,
        undecided: 0,
        learning_curve: Vec::new(),
        final_weights: Vec::new(),
        training_time: Duration::ZERO,
    };

    loop {
        let snapshot = sim.reset()?;
        let mut commands = controller.begin_episode(&snapshot)?;
        let outcome = loop {
            let turn = sim.step(&commands)?;
            stats.total_turns += 1;
            if turn.done {
                break controller.end_episode(&turn.snapshot, Some(&turn.history))?;
            }
            commands = controller.step(&turn.snapshot, Some(&turn.history))?;
        };

        stats.total_episodes += 1;
        match outcome.result {
            EpisodeResult::Win => stats.wins += 1,
            EpisodeResult::Loss => stats.losses += 1,
            EpisodeResult::Undecided => stats.undecided += 1,
        }
        if outcome.session_complete {
            break;
        }
    }

    stats.learning_curve = controller.schedule().curve().points().to_vec();
    stats.final_weights = controller.weights().as_slice().to_vec();
    stats.training_time = started.elapsed();
    info!(
        run = %stats.run_id,
        episodes = stats.total_episodes,
        wins = stats.wins,
        losses = stats.losses,
        "session finished"
    );
    Ok(stats)
}
