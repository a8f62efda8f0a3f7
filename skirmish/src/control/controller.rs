use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::errors::ControlError;
use super::schedule::{EvaluationSchedule, Mode};
use crate::config::AgentConfig;
use crate::env::{Action, Commands, FeedbackStatus, Snapshot, TurnHistory};
use crate::features::FeatureContext;
use crate::learner::{FileWeightStore, WeightStore, Weights, update};
use crate::policy::EpsilonGreedy;
use crate::reward::{Assignment, Assignments, RewardAccumulator};
use crate::roster::Roster;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EpisodeResult {
    Win,
    Loss,
    /// Both sides still had units when the episode ended.
    Undecided,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeOutcome {
    /// 1-based number of the episode that just ended.
    pub episode: u64,
    pub result: EpisodeResult,
    pub mode: Mode,
    /// Sum of every friendly unit's cumulative reward.
    pub total_reward: f64,
    /// Set when this episode closed an evaluation window.
    pub curve_point: Option<f64>,
    /// The episode budget is spent; the host should exit.
    pub session_complete: bool,
}

#[derive(Debug)]
struct Episode {
    roster: Roster,
    rewards: RewardAccumulator,
    assignments: Assignments,
}

/// Chooses attack targets each turn and learns from the outcome.
///
/// The host calls [`Controller::begin_episode`] on turn 0,
/// [`Controller::step`] on every following turn, and
/// [`Controller::end_episode`] once the simulation reports the episode over.
pub struct Controller<S = FileWeightStore> {
    config: AgentConfig,
    run_id: Uuid,
    policy: EpsilonGreedy<StdRng>,
    weights: Weights,
    store: S,
    schedule: EvaluationSchedule,
    episode: Option<Episode>,
}

impl Controller<FileWeightStore> {
    /// Controller persisting its weights to `config.weights_path`.
    pub fn from_config(config: AgentConfig) -> Result<Self, ControlError> {
        let store = FileWeightStore::new(config.weights_path.clone());
        Self::new(config, store)
    }
}

impl<S: WeightStore> Controller<S> {
    /// Seeds the generator, then loads weights from `store` when
    /// `config.load_weights` is set, falling back to random weights drawn
    /// from the same generator. Loaded weights of the wrong length are fatal.
    pub fn new(config: AgentConfig, store: S) -> Result<Self, ControlError> {
        config.validate()?;
        let mut rng = StdRng::seed_from_u64(config.seed);
        let loaded = if config.load_weights {
            store.load().map(Weights::new).transpose()?
        } else {
            None
        };
        let weights = match loaded {
            Some(weights) => weights,
            None => {
                if config.load_weights {
                    warn!("falling back to random weights");
                }
                Weights::random(&mut rng)
            }
        };
        Ok(Self::assemble(config, store, rng, weights))
    }

    /// Start from the given weights, ignoring `config.load_weights`.
    pub fn with_weights(
        config: AgentConfig,
        store: S,
        weights: Weights,
    ) -> Result<Self, ControlError> {
        config.validate()?;
        let rng = StdRng::seed_from_u64(config.seed);
        Ok(Self::assemble(config, store, rng, weights))
    }

    fn assemble(config: AgentConfig, store: S, rng: StdRng, weights: Weights) -> Self {
        let run_id = Uuid::new_v4();
        info!(run = %run_id, episodes = config.episodes, seed = config.seed, "controller ready");
        Self {
            policy: EpsilonGreedy::new(config.epsilon, rng),
            config,
            run_id,
            weights,
            store,
            schedule: EvaluationSchedule::default(),
            episode: None,
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn weights(&self) -> &Weights {
        &self.weights
    }

    pub fn schedule(&self) -> &EvaluationSchedule {
        &self.schedule
    }

    pub fn is_frozen(&self) -> bool {
        self.schedule.is_frozen()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn roster(&self) -> Option<&Roster> {
        self.episode.as_ref().map(|e| &e.roster)
    }

    pub fn rewards(&self) -> Option<&RewardAccumulator> {
        self.episode.as_ref().map(|e| &e.rewards)
    }

    /// Populate the roster from the turn-0 snapshot, clear the per-episode
    /// state, and issue the opening commands.
    pub fn begin_episode(&mut self, snapshot: &Snapshot) -> Result<Commands, ControlError> {
        if self.schedule.episodes_played() >= self.config.episodes {
            return Err(ControlError::BudgetSpent(self.config.episodes));
        }
        let roster = Roster::from_snapshot(
            snapshot,
            self.config.player,
            self.config.enemy,
            &self.config.unit_kind,
        );
        debug!(
            run = %self.run_id,
            friendly = roster.friendly_count(),
            opposing = roster.opposing_count(),
            mode = ?self.schedule.mode(),
            "episode start"
        );
        self.episode = Some(Episode {
            rewards: RewardAccumulator::new(
                self.config.player,
                self.config.enemy,
                roster.friendly_ids().iter().copied(),
            ),
            roster,
            assignments: Assignments::default(),
        });
        self.step(snapshot, None)
    }

    /// Score last turn, prune the dead, and on a significant event pick a
    /// target for every live friendly unit, updating weights unit by unit in
    /// ascending id order while learning. Returns no commands otherwise.
    pub fn step(
        &mut self,
        snapshot: &Snapshot,
        history: Option<&TurnHistory>,
    ) -> Result<Commands, ControlError> {
        let episode = self.episode.as_mut().ok_or(ControlError::NoEpisode)?;
        let history = history.filter(|_| snapshot.turn > 0);

        episode
            .rewards
            .apply_step(&episode.roster, history, episode.assignments.previous());
        if let Some(h) = history {
            episode.roster.prune_dead(&h.deaths);
        }

        let mut commands = Commands::new();
        if !self.significant_event(snapshot, history) {
            return Ok(commands);
        }
        let episode = self.episode.as_mut().ok_or(ControlError::NoEpisode)?;

        let frozen = self.schedule.is_frozen();
        let ctx = FeatureContext {
            snapshot,
            history,
            roster: &episode.roster,
            player: self.config.player,
            enemy: self.config.enemy,
        };
        let mut assignment = Assignment::new();
        for &attacker in episode.roster.friendly_ids() {
            let target = self
                .policy
                .select_target(&ctx, self.weights.as_slice(), attacker, frozen)?;
            if let Some(target) = target {
                if !frozen {
                    let features = ctx.extract(attacker, target)?;
                    let updated = update(
                        &ctx,
                        self.weights.as_slice(),
                        &features,
                        episode.rewards.ledger().total(attacker),
                        attacker,
                        self.config.td_params(),
                    )?;
                    self.weights = Weights::new(updated)?;
                }
                commands.insert(attacker, Action::attack(attacker, target));
            }
            debug!(unit = %attacker, target = ?target, "assigned");
            assignment.insert(attacker, target);
        }
        episode.assignments.rotate(assignment);
        Ok(commands)
    }

    fn significant_event(&self, snapshot: &Snapshot, history: Option<&TurnHistory>) -> bool {
        if snapshot.turn == 0 {
            return true;
        }
        let Some(history) = history else {
            return false;
        };
        !history.deaths.is_empty()
            || history
                .feedback_of(self.config.player)
                .any(|f| f.status != FeedbackStatus::InProgress)
    }

    /// Settle the final turn, report the result, advance the evaluation
    /// schedule and persist the weights.
    pub fn end_episode(
        &mut self,
        snapshot: &Snapshot,
        history: Option<&TurnHistory>,
    ) -> Result<EpisodeOutcome, ControlError> {
        let mut episode = self.episode.take().ok_or(ControlError::NoEpisode)?;
        let history = history.filter(|_| snapshot.turn > 0);
        episode
            .rewards
            .apply_step(&episode.roster, history, episode.assignments.previous());
        if let Some(h) = history {
            episode.roster.prune_dead(&h.deaths);
        }

        let result = if episode.roster.friendly_count() == 0 {
            info!(remaining = episode.roster.opposing_count(), "you lose");
            EpisodeResult::Loss
        } else if episode.roster.opposing_count() == 0 {
            info!(remaining = episode.roster.friendly_count(), "you win");
            EpisodeResult::Win
        } else {
            warn!(
                friendly = episode.roster.friendly_count(),
                opposing = episode.roster.opposing_count(),
                "winner unknown"
            );
            EpisodeResult::Undecided
        };

        let mode = self.schedule.mode();
        let total_reward = episode.rewards.ledger().episode_total();
        let curve_point = self.schedule.record_episode(total_reward);
        let played = self.schedule.episodes_played();
        info!(run = %self.run_id, episode = played, total_reward, ?mode, "episode finished");
        if curve_point.is_some() {
            info!("{}", self.schedule.curve());
        }

        if let Err(e) = self.store.save(self.weights.as_slice()) {
            warn!(error = %e, "failed to save weights");
        }

        let session_complete = played >= self.config.episodes;
        if session_complete {
            info!(run = %self.run_id, episodes = played, "session complete");
        }
        Ok(EpisodeOutcome {
            episode: played,
            result,
            mode,
            total_reward,
            curve_point,
            session_complete,
        })
    }
}
