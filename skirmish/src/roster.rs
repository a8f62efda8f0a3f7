use std::collections::BTreeSet;

use tracing::warn;

use crate::env::{DeathEvent, PlayerId, Snapshot, UnitId};

/// Live friendly and opposing units for the current episode.
///
/// Both sets iterate in ascending [`UnitId`] order, which fixes the order of
/// target evaluation and of the sequential weight updates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    friendly: BTreeSet<UnitId>,
    opposing: BTreeSet<UnitId>,
}

impl Roster {
    pub fn new(
        friendly: impl IntoIterator<Item = UnitId>,
        opposing: impl IntoIterator<Item = UnitId>,
    ) -> Self {
        let mut roster = Self::default();
        roster.initialize(friendly, opposing);
        roster
    }

    /// Build the roster from the episode's first snapshot, keeping only units
    /// of `kind`.
    pub fn from_snapshot(
        snapshot: &Snapshot,
        player: PlayerId,
        enemy: PlayerId,
        kind: &str,
    ) -> Self {
        let pick = |owner: PlayerId| -> Vec<UnitId> {
            snapshot
                .units_of(owner)
                .filter(|unit| {
                    let known = unit.kind.eq_ignore_ascii_case(kind);
                    if !known {
                        warn!(unit = %unit.id, kind = %unit.kind, "unknown unit type, not tracked");
                    }
                    known
                })
                .map(|unit| unit.id)
                .collect()
        };
        Self::new(pick(player), pick(enemy))
    }

    /// Replace both sets.
    pub fn initialize(
        &mut self,
        friendly: impl IntoIterator<Item = UnitId>,
        opposing: impl IntoIterator<Item = UnitId>,
    ) {
        self.friendly = friendly.into_iter().collect();
        self.opposing = opposing.into_iter().collect();
    }

    /// Remove every unit named in `deaths`. Returns the ids found in neither
    /// set; those are logged and leave the roster untouched.
    pub fn prune_dead(&mut self, deaths: &[DeathEvent]) -> Vec<UnitId> {
        let mut unidentified = Vec::new();
        for death in deaths {
            if self.friendly.remove(&death.unit) || self.opposing.remove(&death.unit) {
                continue;
            }
            warn!(unit = %death.unit, "dead unit not identified in either roster");
            unidentified.push(death.unit);
        }
        unidentified
    }

    pub fn friendly_count(&self) -> usize {
        self.friendly.len()
    }

    pub fn opposing_count(&self) -> usize {
        self.opposing.len()
    }

    pub fn friendly_ids(&self) -> &BTreeSet<UnitId> {
        &self.friendly
    }

    pub fn opposing_ids(&self) -> &BTreeSet<UnitId> {
        &self.opposing
    }

    pub fn is_friendly(&self, id: UnitId) -> bool {
        self.friendly.contains(&id)
    }

    pub fn is_opposing(&self, id: UnitId) -> bool {
        self.opposing.contains(&id)
    }
}
