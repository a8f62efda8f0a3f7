// Small deterministic melee simulation used to host the controller in tests
// and in the demo example.
use std::collections::BTreeMap;

use tracing::warn;

use super::errors::SimError;
use super::traits::{Simulation, TurnOutcome};
use super::types::{
    Action, CommandFeedback, Commands, DamageEvent, DeathEvent, FeedbackStatus, IssuedCommand,
    PlayerId, Position, Snapshot, TurnHistory, UnitId, UnitView,
};

const DEFAULT_DAMAGE: u32 = 3;
const DEFAULT_MAX_TURNS: u32 = 500;

/// Grid arena where units walk toward their target and hit it once adjacent.
///
/// One player is scripted: each of its units attacks the nearest living
/// enemy whenever it has no live target. The other player is driven by the
/// commands passed to [`Simulation::step`].
pub struct Arena {
    start: Vec<UnitView>,
    units: Vec<UnitView>,
    orders: BTreeMap<UnitId, Action>,
    scripted: PlayerId,
    damage: u32,
    max_turns: u32,
    turn: u32,
    finished: bool,
}

impl Arena {
    pub fn new(mut units: Vec<UnitView>, scripted: PlayerId) -> Self {
        units.sort_by_key(|u| u.id);
        Self {
            start: units.clone(),
            units,
            orders: BTreeMap::new(),
            scripted,
            damage: DEFAULT_DAMAGE,
            max_turns: DEFAULT_MAX_TURNS,
            turn: 0,
            finished: false,
        }
    }

    /// `friendly` footmen of player 0 in column 0 facing `opposing` footmen
    /// of the scripted player 1 in column 4.
    pub fn line_up(friendly: u32, opposing: u32, health: u32) -> Self {
        let footman = |id: u32, owner: u32, x: i32, y: u32| UnitView {
            id: UnitId(id),
            owner: PlayerId(owner),
            kind: "footman".to_string(),
            position: Position::new(x, y as i32),
            health,
        };
        let mut units: Vec<UnitView> = (0..friendly).map(|i| footman(i, 0, 0, i)).collect();
        units.extend((0..opposing).map(|i| footman(100 + i, 1, 4, i)));
        Self::new(units, PlayerId(1))
    }

    pub fn with_damage(mut self, damage: u32) -> Self {
        self.damage = damage;
        self
    }

    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns;
        self
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            turn: self.turn,
            units: self.units.clone(),
        }
    }

    fn alive(&self, id: UnitId) -> Option<&UnitView> {
        self.units.iter().find(|u| u.id == id && u.health > 0)
    }

    fn owner_of(&self, id: UnitId) -> Option<PlayerId> {
        self.units.iter().find(|u| u.id == id).map(|u| u.owner)
    }

    fn script_orders(&mut self, history: &mut TurnHistory) {
        let scripted: Vec<UnitView> = self
            .units
            .iter()
            .filter(|u| u.owner == self.scripted)
            .cloned()
            .collect();
        for unit in scripted {
            let has_target = self
                .orders
                .get(&unit.id)
                .and_then(Action::target)
                .is_some_and(|t| self.alive(t).is_some());
            if has_target {
                continue;
            }
            let nearest = self
                .units
                .iter()
                .filter(|u| u.owner != self.scripted && u.health > 0)
                .min_by_key(|u| (unit.position.chebyshev(&u.position), u.id));
            if let Some(enemy) = nearest {
                let action = Action::attack(unit.id, enemy.id);
                history.commands.push(IssuedCommand {
                    player: self.scripted,
                    action: action.clone(),
                });
                self.orders.insert(unit.id, action);
            }
        }
    }

    fn resolve(&mut self, history: &mut TurnHistory) {
        let ids: Vec<UnitId> = self.units.iter().map(|u| u.id).collect();
        for id in ids {
            let Some(attacker) = self.alive(id).cloned() else {
                continue;
            };
            let Some(action) = self.orders.get(&id).cloned() else {
                continue;
            };
            let Some(target_id) = action.target() else {
                history.feedback.push(CommandFeedback {
                    player: attacker.owner,
                    action,
                    status: FeedbackStatus::Completed,
                });
                self.orders.remove(&id);
                continue;
            };
            let Some(target) = self.alive(target_id).cloned() else {
                history.feedback.push(CommandFeedback {
                    player: attacker.owner,
                    action,
                    status: FeedbackStatus::Failed,
                });
                self.orders.remove(&id);
                continue;
            };

            let status = if attacker.position.chebyshev(&target.position) <= 1 {
                let amount = self.damage.min(target.health);
                history.damage.push(DamageEvent {
                    attacker: id,
                    defender: target_id,
                    amount,
                });
                let left = target.health - amount;
                if let Some(t) = self.units.iter_mut().find(|u| u.id == target_id) {
                    t.health = left;
                }
                if left == 0 {
                    history.deaths.push(DeathEvent {
                        unit: target_id,
                        owner: target.owner,
                    });
                    FeedbackStatus::Completed
                } else {
                    FeedbackStatus::InProgress
                }
            } else {
                let step = Position::new(
                    (target.position.x - attacker.position.x).signum(),
                    (target.position.y - attacker.position.y).signum(),
                );
                if let Some(a) = self.units.iter_mut().find(|u| u.id == id) {
                    a.position.x += step.x;
                    a.position.y += step.y;
                }
                FeedbackStatus::InProgress
            };
            history.feedback.push(CommandFeedback {
                player: attacker.owner,
                action,
                status,
            });
        }

        let dead: Vec<UnitId> = history.deaths.iter().map(|d| d.unit).collect();
        self.units.retain(|u| !dead.contains(&u.id));
        for id in &dead {
            self.orders.remove(id);
        }
    }

    fn side_eliminated(&self) -> bool {
        let mut owners: Vec<PlayerId> = self.start.iter().map(|u| u.owner).collect();
        owners.sort();
        owners.dedup();
        owners
            .iter()
            .any(|owner| !self.units.iter().any(|u| u.owner == *owner))
    }
}

impl Simulation for Arena {
    fn reset(&mut self) -> Result<Snapshot, SimError> {
        self.units = self.start.clone();
        self.orders.clear();
        self.turn = 0;
        self.finished = false;
        Ok(self.snapshot())
    }

    fn step(&mut self, commands: &Commands) -> Result<TurnOutcome, SimError> {
        if self.finished {
            return Err(SimError::EpisodeFinished);
        }
        let mut history = TurnHistory::new(self.turn);

        for (unit, action) in commands {
            match self.owner_of(*unit) {
                None => return Err(SimError::UnknownUnit(*unit)),
                Some(player) if player != self.scripted => {
                    history.commands.push(IssuedCommand {
                        player,
                        action: action.clone(),
                    });
                    self.orders.insert(*unit, action.clone());
                }
                _ => warn!(unit = %unit, "ignoring command for a unit the host does not control"),
            }
        }
        self.script_orders(&mut history);
        self.resolve(&mut history);

        self.turn += 1;
        self.finished = self.side_eliminated() || self.turn >= self.max_turns;
        Ok(TurnOutcome {
            snapshot: self.snapshot(),
            history,
            done: self.finished,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn footman(id: u32, owner: u32, x: i32, health: u32) -> UnitView {
        UnitView {
            id: UnitId(id),
            owner: PlayerId(owner),
            kind: "footman".to_string(),
            position: Position::new(x, 0),
            health,
        }
    }

    #[test]
    fn adjacent_attack_deals_damage_and_kills() {
        let units = vec![footman(0, 0, 0, 3), footman(100, 1, 1, 3)];
        let mut arena = Arena::new(units, PlayerId(1)).with_damage(3);
        let snapshot = arena.reset().unwrap();
        assert_eq!(snapshot.turn, 0);

        let mut commands = Commands::new();
        commands.insert(UnitId(0), Action::attack(UnitId(0), UnitId(100)));
        let outcome = arena.step(&commands).unwrap();

        assert_eq!(outcome.snapshot.turn, 1);
        assert_eq!(outcome.history.damage.len(), 1);
        assert_eq!(outcome.history.damage[0].attacker, UnitId(0));
        assert_eq!(outcome.history.deaths[0].unit, UnitId(100));
        assert!(outcome.snapshot.unit(UnitId(100)).is_none());
        assert!(outcome.done);
        assert!(matches!(
            arena.step(&Commands::new()),
            Err(SimError::EpisodeFinished)
        ));
    }

    #[test]
    fn distant_units_close_in_before_fighting() {
        let mut arena = Arena::line_up(1, 1, 10);
        arena.reset().unwrap();
        let mut commands = Commands::new();
        commands.insert(UnitId(0), Action::attack(UnitId(0), UnitId(100)));
        let outcome = arena.step(&commands).unwrap();

        assert!(outcome.history.damage.is_empty());
        assert_eq!(
            outcome.snapshot.unit(UnitId(0)).map(|u| u.position),
            Some(Position::new(1, 0))
        );
        assert!(
            outcome
                .history
                .feedback
                .iter()
                .all(|f| f.status == FeedbackStatus::InProgress)
        );
        assert!(!outcome.done);
    }

    #[test]
    fn scripted_side_issues_commands_on_first_turn() {
        let mut arena = Arena::line_up(2, 2, 10);
        arena.reset().unwrap();
        let outcome = arena.step(&Commands::new()).unwrap();
        let scripted: Vec<_> = outcome.history.commands_of(PlayerId(1)).collect();
        assert_eq!(scripted.len(), 2);
        assert!(outcome.history.commands_of(PlayerId(0)).next().is_none());
    }

    #[test]
    fn commanding_a_missing_unit_is_an_error() {
        let mut arena = Arena::line_up(1, 1, 10);
        arena.reset().unwrap();
        let commands: Commands = [(UnitId(42), Action::attack(UnitId(42), UnitId(100)))]
            .into_iter()
            .collect();
        assert!(matches!(
            arena.step(&commands),
            Err(SimError::UnknownUnit(UnitId(42)))
        ));
    }
}
