//! Turn order for one encounter.

use crate::env::Dice;
use crate::state::{Combatant, EntityId, Round, Stat};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InitiativeEntry {
    pub entity: EntityId,
    /// `1d20 + Dexterity modifier`.
    pub roll: i32,
    pub is_player: bool,
}

/// Initiative order plus the turn pointer and round counter.
///
/// Rebuilt every encounter. Entries are removed on death; the pointer is
/// adjusted so the remaining order is untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InitiativeTracker {
    entries: Vec<InitiativeEntry>,
    pointer: usize,
    round: Round,
    started: bool,
    /// The next advance stays on `pointer` (first turn, or current entry removed).
    hold: bool,
}

impl InitiativeTracker {
    /// Rolls initiative for every participant and sorts descending.
    /// Ties put the player first and otherwise keep participant order.
    pub fn roll<'c>(
        participants: impl IntoIterator<Item = &'c Combatant>,
        dice: &mut Dice<'_>,
    ) -> Self {
        let entries = participants
            .into_iter()
            .map(|combatant| InitiativeEntry {
                entity: combatant.id,
                roll: dice.d20() as i32 + combatant.stat_modifier(Stat::Dexterity),
                is_player: combatant.is_player(),
            })
            .collect();
        Self::from_entries(entries)
    }

    /// Builds a tracker from already-rolled entries.
    pub fn from_entries(mut entries: Vec<InitiativeEntry>) -> Self {
        entries.sort_by(|a, b| {
            b.roll
                .cmp(&a.roll)
                .then_with(|| b.is_player.cmp(&a.is_player))
        });
        Self {
            entries,
            pointer: 0,
            round: Round(1),
            started: false,
            hold: true,
        }
    }

    pub fn entries(&self) -> &[InitiativeEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn round(&self) -> Round {
        self.round
    }

    pub fn pointer(&self) -> usize {
        self.pointer
    }

    pub fn current(&self) -> Option<&InitiativeEntry> {
        if !self.started {
            return None;
        }
        self.entries.get(self.pointer)
    }

    pub fn contains(&self, entity: EntityId) -> bool {
        self.entries.iter().any(|entry| entry.entity == entity)
    }

    /// Moves to the next entry. Returns true when the pointer wrapped into a
    /// new round.
    pub fn advance(&mut self) -> bool {
        self.started = true;
        if self.hold {
            self.hold = false;
        } else {
            self.pointer += 1;
        }
        if self.pointer >= self.entries.len() {
            self.pointer = 0;
            self.round = self.round.next();
            return true;
        }
        false
    }

    /// Removes `entity`, keeping the pointer on the same upcoming actor.
    pub fn remove(&mut self, entity: EntityId) -> bool {
        let Some(index) = self.entries.iter().position(|e| e.entity == entity) else {
            return false;
        };
        self.entries.remove(index);
        if index < self.pointer {
            self.pointer -= 1;
        } else if index == self.pointer {
            self.hold = true;
        }
        true
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
