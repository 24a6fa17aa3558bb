//! Authoritative combat state.
//!
//! [`CombatState`] owns the world registry ([`Roster`]), the encounter
//! bookkeeping, the dice cursor and the pending event log. Host layers read it
//! freely but mutate it exclusively through [`crate::engine::CombatEngine`].
mod aggro;
mod body;
mod combatant;
mod common;
mod memory;
mod roster;

pub use aggro::{AggroEntry, AggroList};
pub use body::{Body, BodyPart, PartHealth};
pub use combatant::{
    Armor, BehaviorProfile, Combatant, Controller, Loadout, Points, Skill, Skills, StandingOrder,
    Stat, Stats, WeaponSlot,
};
pub use common::{EntityId, Position, Round, TeamId};
pub use memory::{AiMemory, Sighting};
pub use roster::Roster;

use crate::config::CombatConfig;
use crate::engine::{CombatEvent, Encounter};
use crate::env::RollCursor;

/// Canonical snapshot of everything the combat engine mutates.
#[derive(Clone, Debug)]
pub struct CombatState {
    /// World registry. Persists across encounters.
    pub roster: Roster,

    /// Encounter bookkeeping; inactive between encounters.
    pub encounter: Encounter,

    /// Dice position. Seeded once, advanced by every roll.
    pub cursor: RollCursor,

    /// Tunable rule constants.
    pub config: CombatConfig,

    /// Events not yet drained by the host.
    events: Vec<CombatEvent>,
}

impl CombatState {
    pub fn new(roster: Roster, seed: u64) -> Self {
        Self::with_config(roster, seed, CombatConfig::default())
    }

    pub fn with_config(roster: Roster, seed: u64, config: CombatConfig) -> Self {
        Self {
            roster,
            encounter: Encounter::default(),
            cursor: RollCursor::new(seed),
            config,
            events: Vec::new(),
        }
    }

    pub(crate) fn emit(&mut self, event: CombatEvent) {
        tracing::trace!(?event, "combat event");
        self.events.push(event);
    }

    /// Takes every event emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<CombatEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn pending_events(&self) -> &[CombatEvent] {
        &self.events
    }
}
