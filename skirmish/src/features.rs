//! Hand-designed features describing one attacker/target pairing.
//!
//! | index | feature |
//! |---|---|
//! | 0 | bias, always `1.0` |
//! | 1 | closeness: other live opposing units minus the candidate's distance rank |
//! | 2 | attacker health divided by candidate health |
//! | 3 | share of friendly units already ordered onto the candidate |
//! | 4 | `1.0` if the candidate was ordered onto the attacker last turn, else `-1.0` |
use crate::env::{Action, PlayerId, Snapshot, TurnHistory, UnitId};
use crate::learner::LearnerError;
use crate::roster::Roster;

/// Length of every feature vector, and therefore of the weight vector.
pub const NUM_FEATURES: usize = 5;

/// Health ratio used when the candidate reports zero health.
pub const ZERO_HEALTH_RATIO: f64 = 1.0e3;

/// Everything feature extraction may look at for one turn: the current
/// snapshot and the previous turn's log, nothing later.
#[derive(Debug, Clone, Copy)]
pub struct FeatureContext<'a> {
    pub snapshot: &'a Snapshot,
    /// `None` on turn 0.
    pub history: Option<&'a TurnHistory>,
    pub roster: &'a Roster,
    pub player: PlayerId,
    pub enemy: PlayerId,
}

impl FeatureContext<'_> {
    pub fn extract(&self, attacker: UnitId, candidate: UnitId) -> Result<Vec<f64>, LearnerError> {
        let attacker_view = self
            .snapshot
            .unit(attacker)
            .ok_or(LearnerError::MissingUnit(attacker))?;
        let target_view = self
            .snapshot
            .unit(candidate)
            .ok_or(LearnerError::MissingUnit(candidate))?;

        let mut features = vec![0.0; NUM_FEATURES];
        features[0] = 1.0;

        let target_distance = attacker_view.position.chebyshev(&target_view.position);
        let rank = self
            .roster
            .opposing_ids()
            .iter()
            .filter_map(|id| self.snapshot.unit(*id))
            .filter(|enemy| attacker_view.position.chebyshev(&enemy.position) < target_distance)
            .count();
        let others = self.roster.opposing_count().saturating_sub(1);
        features[1] = others as f64 - rank as f64;

        features[2] = if target_view.health == 0 {
            ZERO_HEALTH_RATIO
        } else {
            f64::from(attacker_view.health) / f64::from(target_view.health)
        };

        features[3] = self.focus_fire(attacker, candidate);

        let threatened = self
            .history
            .and_then(|h| h.last_command(self.enemy, candidate))
            .and_then(Action::target)
            == Some(attacker);
        features[4] = if threatened { 1.0 } else { -1.0 };

        Ok(features)
    }

    fn focus_fire(&self, attacker: UnitId, candidate: UnitId) -> f64 {
        let total = self.roster.friendly_count();
        let Some(history) = self.history else {
            return 0.0;
        };
        if total == 0 {
            return 0.0;
        }
        let joining = history
            .latest_commands(self.player)
            .into_iter()
            .filter(|(unit, action)| {
                *unit != attacker
                    && self.roster.is_friendly(*unit)
                    && action.target() == Some(candidate)
            })
            .count();
        joining as f64 / total as f64
    }
}
