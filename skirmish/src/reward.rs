//! Per-unit reward shaping from the previous turn's events.
use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::env::{Action, PlayerId, TurnHistory, UnitId};
use crate::roster::Roster;

/// Charged when a unit is sent after a different target.
pub const NEW_COMMAND_PENALTY: f64 = 0.1;
pub const DEATH_PENALTY: f64 = 100.0;
pub const KILL_REWARD: f64 = 100.0;

/// Target chosen for each friendly unit on a decision turn; `None` when no
/// opposing units remained.
pub type Assignment = BTreeMap<UnitId, Option<UnitId>>;

/// The last two generations of target assignments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Assignments {
    current: Option<Assignment>,
    previous: Option<Assignment>,
}

impl Assignments {
    pub fn rotate(&mut self, next: Assignment) {
        self.previous = self.current.replace(next);
    }

    pub fn current(&self) -> Option<&Assignment> {
        self.current.as_ref()
    }

    pub fn previous(&self) -> Option<&Assignment> {
        self.previous.as_ref()
    }
}

/// Cumulative reward per friendly unit for the current episode. Entries of
/// dead units stay for end-of-episode totals.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RewardLedger {
    totals: BTreeMap<UnitId, f64>,
}

impl RewardLedger {
    pub fn new(units: impl IntoIterator<Item = UnitId>) -> Self {
        Self {
            totals: units.into_iter().map(|id| (id, 0.0)).collect(),
        }
    }

    pub fn add(&mut self, unit: UnitId, reward: f64) {
        *self.totals.entry(unit).or_insert(0.0) += reward;
    }

    pub fn total(&self, unit: UnitId) -> f64 {
        self.totals.get(&unit).copied().unwrap_or(0.0)
    }

    /// Sum over every unit that started the episode.
    pub fn episode_total(&self) -> f64 {
        self.totals.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (UnitId, f64)> + '_ {
        self.totals.iter().map(|(id, r)| (*id, *r))
    }
}

/// Turns last turn's log into rewards, crediting each enemy death once.
#[derive(Debug, Clone)]
pub struct RewardAccumulator {
    player: PlayerId,
    enemy: PlayerId,
    ledger: RewardLedger,
    credited: BTreeSet<UnitId>,
}

impl RewardAccumulator {
    pub fn new(player: PlayerId, enemy: PlayerId, units: impl IntoIterator<Item = UnitId>) -> Self {
        Self {
            player,
            enemy,
            ledger: RewardLedger::new(units),
            credited: BTreeSet::new(),
        }
    }

    pub fn ledger(&self) -> &RewardLedger {
        &self.ledger
    }

    /// Enemy units whose death has already been credited this episode.
    pub fn credited(&self) -> &BTreeSet<UnitId> {
        &self.credited
    }

    /// Reward earned by `unit` during the turn logged in `history`.
    ///
    /// `previous` is the assignment generation in force before the commands
    /// in `history` were issued. Claims kill credit as a side effect.
    pub fn step_reward(
        &mut self,
        unit: UnitId,
        history: Option<&TurnHistory>,
        previous: Option<&Assignment>,
    ) -> f64 {
        let Some(history) = history else {
            return 0.0;
        };
        let mut reward = 0.0;

        if let Some(command) = history.last_command(self.player, unit) {
            let pursued = previous.and_then(|p| p.get(&unit).copied().flatten());
            if command.target() != pursued {
                reward -= NEW_COMMAND_PENALTY;
            }
        }

        for damage in &history.damage {
            if damage.defender == unit {
                reward -= f64::from(damage.amount);
            }
            if damage.attacker == unit {
                reward += f64::from(damage.amount);
            }
        }

        for death in &history.deaths {
            if death.owner == self.enemy {
                let killer = history
                    .feedback_of(self.player)
                    .any(|f| f.action == Action::attack(unit, death.unit));
                if killer && self.credited.insert(death.unit) {
                    reward += KILL_REWARD;
                }
            } else if death.unit == unit {
                reward -= DEATH_PENALTY;
            }
        }

        reward
    }

    /// Add this turn's reward to the ledger for every tracked friendly unit.
    pub fn apply_step(
        &mut self,
        roster: &Roster,
        history: Option<&TurnHistory>,
        previous: Option<&Assignment>,
    ) {
        for unit in roster.friendly_ids() {
            let reward = self.step_reward(*unit, history, previous);
            if reward != 0.0 {
                debug!(unit = %unit, reward, "step reward");
            }
            self.ledger.add(*unit, reward);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{CommandFeedback, DamageEvent, DeathEvent, FeedbackStatus, IssuedCommand};

    const ME: PlayerId = PlayerId(0);
    const THEM: PlayerId = PlayerId(1);

    fn accumulator() -> RewardAccumulator {
        RewardAccumulator::new(ME, THEM, [UnitId(1), UnitId(2), UnitId(3)])
    }

    fn attack_feedback(unit: u32, target: u32) -> CommandFeedback {
        CommandFeedback {
            player: ME,
            action: Action::attack(UnitId(unit), UnitId(target)),
            status: FeedbackStatus::InProgress,
        }
    }

    fn order(unit: u32, target: u32) -> IssuedCommand {
        IssuedCommand {
            player: ME,
            action: Action::attack(UnitId(unit), UnitId(target)),
        }
    }

    #[test]
    fn first_turn_earns_nothing() {
        let mut acc = accumulator();
        assert_eq!(acc.step_reward(UnitId(1), None, None), 0.0);
    }

    #[test]
    fn new_target_is_penalised_but_reissue_is_not() {
        let mut acc = accumulator();
        let mut history = TurnHistory::new(3);
        history.commands = vec![order(1, 10), order(2, 11)];
        let previous: Assignment = [(UnitId(1), Some(UnitId(10))), (UnitId(2), Some(UnitId(10)))]
            .into_iter()
            .collect();

        assert_eq!(acc.step_reward(UnitId(1), Some(&history), Some(&previous)), 0.0);
        assert_eq!(acc.step_reward(UnitId(2), Some(&history), Some(&previous)), -0.1);
        // No previous generation at all counts as a new decision.
        assert_eq!(acc.step_reward(UnitId(1), Some(&history), None), -0.1);
    }

    #[test]
    fn damage_dealt_and_taken_are_additive() {
        let mut acc = accumulator();
        let mut history = TurnHistory::new(3);
        history.damage = vec![
            DamageEvent {
                attacker: UnitId(1),
                defender: UnitId(10),
                amount: 7,
            },
            DamageEvent {
                attacker: UnitId(10),
                defender: UnitId(1),
                amount: 3,
            },
            DamageEvent {
                attacker: UnitId(11),
                defender: UnitId(2),
                amount: 5,
            },
        ];
        assert_eq!(acc.step_reward(UnitId(1), Some(&history), None), 4.0);
        assert_eq!(acc.step_reward(UnitId(2), Some(&history), None), -5.0);
    }

    #[test]
    fn quiet_unit_only_sees_its_command_penalty() {
        let mut acc = accumulator();
        let mut history = TurnHistory::new(3);
        history.commands = vec![order(3, 12)];
        history.damage = vec![DamageEvent {
            attacker: UnitId(1),
            defender: UnitId(10),
            amount: 9,
        }];
        history.deaths = vec![DeathEvent {
            unit: UnitId(10),
            owner: THEM,
        }];
        history.feedback = vec![attack_feedback(1, 10)];

        assert_eq!(acc.step_reward(UnitId(3), Some(&history), None), -0.1);
        assert_eq!(acc.step_reward(UnitId(2), Some(&history), None), 0.0);
    }

    #[test]
    fn own_death_costs_a_hundred() {
        let mut acc = accumulator();
        let mut history = TurnHistory::new(8);
        history.deaths = vec![DeathEvent {
            unit: UnitId(2),
            owner: ME,
        }];
        assert_eq!(acc.step_reward(UnitId(2), Some(&history), None), -100.0);
        assert_eq!(acc.step_reward(UnitId(1), Some(&history), None), 0.0);
    }

    #[test]
    fn kill_credit_goes_to_exactly_one_attacker() {
        let mut acc = accumulator();
        let roster = Roster::new([UnitId(1), UnitId(2), UnitId(3)], [UnitId(10)]);
        let mut history = TurnHistory::new(6);
        history.deaths = vec![DeathEvent {
            unit: UnitId(10),
            owner: THEM,
        }];
        history.feedback = vec![
            attack_feedback(1, 10),
            attack_feedback(2, 10),
            attack_feedback(3, 10),
        ];

        acc.apply_step(&roster, Some(&history), None);
        // The same death reported again later is not credited twice.
        acc.apply_step(&roster, Some(&history), None);

        let credited: Vec<f64> = acc.ledger().iter().map(|(_, r)| r).collect();
        assert_eq!(credited, vec![100.0, 0.0, 0.0]);
        assert!(acc.credited().contains(&UnitId(10)));
        assert_eq!(acc.ledger().episode_total(), 100.0);
    }

    #[test]
    fn kill_credit_requires_attacking_that_unit() {
        let mut acc = accumulator();
        let mut history = TurnHistory::new(6);
        history.deaths = vec![DeathEvent {
            unit: UnitId(10),
            owner: THEM,
        }];
        history.feedback = vec![attack_feedback(1, 11)];
        assert_eq!(acc.step_reward(UnitId(1), Some(&history), None), 0.0);
        assert!(acc.credited().is_empty());
    }

    #[test]
    fn ledger_keeps_pruned_units() {
        let mut acc = accumulator();
        let mut history = TurnHistory::new(1);
        history.damage = vec![DamageEvent {
            attacker: UnitId(3),
            defender: UnitId(10),
            amount: 2,
        }];
        let full = Roster::new([UnitId(1), UnitId(2), UnitId(3)], [UnitId(10)]);
        acc.apply_step(&full, Some(&history), None);

        let pruned = Roster::new([UnitId(1), UnitId(2)], [UnitId(10)]);
        acc.apply_step(&pruned, Some(&history), None);

        assert_eq!(acc.ledger().total(UnitId(3)), 2.0);
        assert_eq!(acc.ledger().iter().count(), 3);
    }

    #[test]
    fn assignments_keep_two_generations() {
        let mut assignments = Assignments::default();
        let first: Assignment = [(UnitId(1), Some(UnitId(10)))].into_iter().collect();
        let second: Assignment = [(UnitId(1), None)].into_iter().collect();
        assignments.rotate(first.clone());
        assert_eq!(assignments.previous(), None);
        assignments.rotate(second.clone());
        assert_eq!(assignments.previous(), Some(&first));
        assert_eq!(assignments.current(), Some(&second));
    }
}
