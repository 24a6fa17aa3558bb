use std::collections::BTreeMap;

use super::{Combatant, EntityId, Position, TeamId};

/// World registry of combatants.
///
/// Combatants persist here across encounters. Death removes the record.
/// Iteration order is by [`EntityId`], which keeps every scan deterministic.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Roster {
    combatants: BTreeMap<EntityId, Combatant>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a combatant, returning the previous record.
    pub fn insert(&mut self, combatant: Combatant) -> Option<Combatant> {
        self.combatants.insert(combatant.id, combatant)
    }

    pub fn remove(&mut self, id: EntityId) -> Option<Combatant> {
        self.combatants.remove(&id)
    }

    pub fn get(&self, id: EntityId) -> Option<&Combatant> {
        self.combatants.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Combatant> {
        self.combatants.get_mut(&id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.combatants.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.combatants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.combatants.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Combatant> {
        self.combatants.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Combatant> {
        self.combatants.values_mut()
    }

    pub fn ids(&self) -> Vec<EntityId> {
        self.combatants.keys().copied().collect()
    }

    pub fn player(&self) -> Option<&Combatant> {
        self.combatants.values().find(|c| c.is_player())
    }

    /// Members of `team` other than the listed exclusions.
    pub fn teammates(
        &self,
        team: TeamId,
        exclude: &[EntityId],
    ) -> impl Iterator<Item = &Combatant> + '_ {
        let exclude = exclude.to_vec();
        self.combatants
            .values()
            .filter(move |c| c.team == team && !exclude.contains(&c.id))
    }

    pub fn occupant_at(&self, position: Position) -> Option<&Combatant> {
        self.combatants.values().find(|c| c.position == position)
    }

    /// Tiles occupied by anyone except `except`.
    pub fn occupied_tiles(&self, except: EntityId) -> Vec<Position> {
        self.combatants
            .values()
            .filter(|c| c.id != except)
            .map(|c| c.position)
            .collect()
    }
}

impl FromIterator<Combatant> for Roster {
    fn from_iter<T: IntoIterator<Item = Combatant>>(iter: T) -> Self {
        let mut roster = Roster::new();
        for combatant in iter {
            roster.insert(combatant);
        }
        roster
    }
}
