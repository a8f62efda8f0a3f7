use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::report::LearningCurve;

/// Episodes in one learning/evaluation cycle.
pub const EVAL_CYCLE: u64 = 15;
/// Frozen evaluation episodes at the start of each cycle.
pub const EVAL_EPISODES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    /// Epsilon-greedy exploration with weight updates.
    Learning,
    /// Greedy play with the weights held fixed.
    FrozenEval,
}

/// Alternates evaluation and learning episodes and accumulates the
/// learning curve from the evaluation windows.
///
/// Every cycle of [`EVAL_CYCLE`] episodes opens with [`EVAL_EPISODES`]
/// frozen episodes; the session starts frozen so the first window measures
/// the initial weights.
#[derive(Debug, Clone)]
pub struct EvaluationSchedule {
    episodes_played: u64,
    mode: Mode,
    window: Vec<f64>,
    curve: LearningCurve,
}

impl Default for EvaluationSchedule {
    fn default() -> Self {
        Self {
            episodes_played: 0,
            mode: Mode::FrozenEval,
            window: Vec::with_capacity(EVAL_EPISODES),
            curve: LearningCurve::default(),
        }
    }
}

impl EvaluationSchedule {
    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_frozen(&self) -> bool {
        self.mode == Mode::FrozenEval
    }

    pub fn episodes_played(&self) -> u64 {
        self.episodes_played
    }

    pub fn window(&self) -> &[f64] {
        &self.window
    }

    pub fn curve(&self) -> &LearningCurve {
        &self.curve
    }

    /// Count a finished episode and apply the mode transition. Returns the
    /// new learning-curve point when an evaluation window just closed.
    pub fn record_episode(&mut self, total_reward: f64) -> Option<f64> {
        self.episodes_played += 1;
        if self.is_frozen() {
            if self.window.len() < EVAL_EPISODES {
                self.window.push(total_reward);
            } else {
                warn!(total_reward, "evaluation window full, reward dropped");
            }
        }

        let n = self.episodes_played;
        if n % EVAL_CYCLE == 0 {
            info!(episodes = n, "entering evaluation mode, freezing Q function");
            self.mode = Mode::FrozenEval;
            self.window.clear();
            None
        } else if n % EVAL_CYCLE == EVAL_EPISODES as u64 {
            self.mode = Mode::Learning;
            let mean = if self.window.is_empty() {
                0.0
            } else {
                self.window.iter().sum::<f64>() / self.window.len() as f64
            };
            self.curve.push(mean);
            info!(episodes = n, mean, "entering learning mode, unfreezing Q function");
            Some(mean)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frozen_for_five_then_learning_for_ten() {
        let mut schedule = EvaluationSchedule::default();
        let mut points = 0;
        for episode in 0..EVAL_CYCLE {
            assert_eq!(schedule.is_frozen(), episode < 5, "episode {episode}");
            if schedule.record_episode(episode as f64).is_some() {
                points += 1;
            }
        }
        assert!(schedule.is_frozen());
        assert_eq!(points, 1);
        assert_eq!(schedule.curve().len(), 1);
    }

    #[test]
    fn curve_point_is_window_mean() {
        let mut schedule = EvaluationSchedule::default();
        let rewards = [10.0, -20.0, 30.0, 0.0, 5.0];
        let mut point = None;
        for r in rewards {
            point = schedule.record_episode(r);
        }
        assert_eq!(point, Some(5.0));
        assert_eq!(schedule.mode(), Mode::Learning);
    }

    #[test]
    fn learning_rewards_stay_out_of_the_window() {
        let mut schedule = EvaluationSchedule::default();
        for _ in 0..5 {
            schedule.record_episode(1.0);
        }
        for _ in 0..9 {
            schedule.record_episode(1000.0);
        }
        assert_eq!(schedule.window(), &[1.0; 5]);

        schedule.record_episode(1000.0);
        assert!(schedule.window().is_empty());

        for _ in 0..5 {
            schedule.record_episode(-4.0);
        }
        assert_eq!(schedule.curve().points(), &[1.0, -4.0]);
    }
}
