use arrayvec::ArrayVec;

use super::{EntityId, Position, Round};
use crate::config::CombatConfig;

/// Where and when a target was last seen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sighting {
    pub target: EntityId,
    pub position: Position,
    pub round: Round,
}

/// Decision memory carried by AI-controlled combatants between turns.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AiMemory {
    /// Currently selected combat target.
    pub target: Option<EntityId>,
    pub last_seen: Option<Sighting>,
    /// Bounded ring of recently visited tiles, oldest first.
    pub recent_tiles: ArrayVec<Position, { CombatConfig::MAX_RECENT_TILES }>,
    pub exploration_target: Option<Position>,
}

impl AiMemory {
    pub fn remember_sighting(&mut self, target: EntityId, position: Position, round: Round) {
        self.last_seen = Some(Sighting {
            target,
            position,
            round,
        });
    }

    /// Records a visited tile, evicting the oldest when full.
    pub fn visit(&mut self, position: Position) {
        if self.recent_tiles.last() == Some(&position) {
            return;
        }
        if self.recent_tiles.is_full() {
            self.recent_tiles.remove(0);
        }
        self.recent_tiles.push(position);
    }

    pub fn recently_visited(&self, position: Position) -> bool {
        self.recent_tiles.contains(&position)
    }

    /// Sighting still fresh at `now`, given a time-to-live in rounds.
    pub fn fresh_sighting(&self, now: Round, ttl: u32) -> Option<Sighting> {
        self.last_seen
            .filter(|sighting| now.since(sighting.round) <= ttl)
    }

    pub fn forget_target(&mut self) {
        self.target = None;
    }
}
