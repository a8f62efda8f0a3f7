use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Handle the simulation assigns to a unit; stable for the unit's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(pub u32);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Player number owning a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn chebyshev(&self, other: &Position) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitView {
    pub id: UnitId,
    pub owner: PlayerId,
    /// Template name, e.g. "footman".
    pub kind: String,
    pub position: Position,
    pub health: u32,
}

/// Read-only view of the simulation at the start of a turn.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub turn: u32,
    pub units: Vec<UnitView>,
}

impl Snapshot {
    pub fn unit(&self, id: UnitId) -> Option<&UnitView> {
        self.units.iter().find(|u| u.id == id)
    }

    pub fn units_of(&self, owner: PlayerId) -> impl Iterator<Item = &UnitView> {
        self.units.iter().filter(move |u| u.owner == owner)
    }
}

/// A command a unit can be given.
///
/// Only [`Action::Attack`] carries a target; everything that reads targets
/// goes through [`Action::target`] instead of assuming the variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Move into range of `target` and attack it until it dies.
    Attack { unit: UnitId, target: UnitId },
    Move { unit: UnitId, to: Position },
    Idle { unit: UnitId },
}

impl Action {
    pub fn attack(unit: UnitId, target: UnitId) -> Self {
        Action::Attack { unit, target }
    }

    pub fn unit(&self) -> UnitId {
        match self {
            Action::Attack { unit, .. } | Action::Move { unit, .. } | Action::Idle { unit } => {
                *unit
            }
        }
    }

    pub fn target(&self) -> Option<UnitId> {
        match self {
            Action::Attack { target, .. } => Some(*target),
            _ => None,
        }
    }
}

/// Commands emitted for one turn, keyed by the commanded unit.
pub type Commands = BTreeMap<UnitId, Action>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeathEvent {
    pub unit: UnitId,
    pub owner: PlayerId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageEvent {
    pub attacker: UnitId,
    pub defender: UnitId,
    pub amount: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedCommand {
    pub player: PlayerId,
    pub action: Action,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackStatus {
    InProgress,
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandFeedback {
    pub player: PlayerId,
    pub action: Action,
    pub status: FeedbackStatus,
}

/// Everything the simulation logged during a single turn.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TurnHistory {
    pub turn: u32,
    #[serde(default)]
    pub deaths: Vec<DeathEvent>,
    #[serde(default)]
    pub damage: Vec<DamageEvent>,
    #[serde(default)]
    pub commands: Vec<IssuedCommand>,
    #[serde(default)]
    pub feedback: Vec<CommandFeedback>,
}

impl TurnHistory {
    pub fn new(turn: u32) -> Self {
        Self {
            turn,
            ..Default::default()
        }
    }

    /// Commands `player` issued this turn, in issue order.
    pub fn commands_of(&self, player: PlayerId) -> impl DoubleEndedIterator<Item = &Action> {
        self.commands
            .iter()
            .filter(move |c| c.player == player)
            .map(|c| &c.action)
    }

    /// The most recent command `player` issued to `unit` this turn.
    pub fn last_command(&self, player: PlayerId, unit: UnitId) -> Option<&Action> {
        self.commands_of(player).rfind(|a| a.unit() == unit)
    }

    /// Most recent command per unit for `player`.
    pub fn latest_commands(&self, player: PlayerId) -> BTreeMap<UnitId, &Action> {
        self.commands_of(player).map(|a| (a.unit(), a)).collect()
    }

    pub fn feedback_of(&self, player: PlayerId) -> impl Iterator<Item = &CommandFeedback> {
        self.feedback.iter().filter(move |f| f.player == player)
    }
}
