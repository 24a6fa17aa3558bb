//! Encounter-scoped bookkeeping owned by the state machine.

use strum::Display;

use super::initiative::InitiativeTracker;
use super::phase::CombatPhase;
use crate::action::PendingCombatAction;
use crate::state::EntityId;

/// How an encounter finished.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum EncounterOutcome {
    /// Only the player's team is left standing.
    Victory,
    /// The player died.
    Defeat,
    /// A missing reference forced the encounter closed.
    Aborted,
    /// Ended by the host, or a fight without the player ran out of foes.
    Ended,
}

/// Per-turn working set.
///
/// Replaces shared "current attacker / defender / pending action" fields:
/// everything here is dropped when the turn ends.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TurnSession {
    pub actor: EntityId,
    /// At most one live declaration; consumed by resolution.
    pub pending: Option<PendingCombatAction>,
    pub defender: Option<EntityId>,
    /// Projectiles the pending attack sends.
    pub volley: u32,
    /// An off-hand follow-up needs this.
    pub main_attack_made: bool,
    pub ai: AiTurnState,
}

impl TurnSession {
    pub fn new(actor: EntityId) -> Self {
        Self {
            actor,
            pending: None,
            defender: None,
            volley: 0,
            main_attack_made: false,
            ai: AiTurnState::default(),
        }
    }

    /// Drops any declaration left from a previous step.
    pub fn clear_declaration(&mut self) {
        self.pending = None;
        self.defender = None;
        self.volley = 0;
    }
}

/// Options an NPC already tried and lost this turn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AiTurnState {
    pub iterations: u32,
    pub attack_blocked: bool,
    pub reload_blocked: bool,
    pub move_blocked: bool,
    pub drop_declined: bool,
}

/// Bounded poll counter for the presentation "effect playing" signal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectGate {
    polls: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateState {
    Open,
    Wait,
    /// Retries exhausted; proceed anyway.
    Forced { polls: u32 },
}

impl EffectGate {
    pub fn poll(&mut self, effect_playing: bool, max_retries: u32) -> GateState {
        if !effect_playing {
            self.polls = 0;
            return GateState::Open;
        }
        if self.polls < max_retries {
            self.polls += 1;
            return GateState::Wait;
        }
        let polls = self.polls;
        self.polls = 0;
        GateState::Forced { polls }
    }

    pub fn polls(&self) -> u32 {
        self.polls
    }
}

/// Everything that lives exactly as long as one encounter.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Encounter {
    pub tracker: InitiativeTracker,
    pub phase: CombatPhase,
    pub session: Option<TurnSession>,
    pub gate: EffectGate,
    pub outcome: Option<EncounterOutcome>,
    /// The player was rolled into initiative.
    pub player_involved: bool,
}

impl Encounter {
    pub fn is_active(&self) -> bool {
        self.phase.is_active()
    }

    pub fn current_actor(&self) -> Option<EntityId> {
        self.session.as_ref().map(|s| s.actor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_waits_then_forces_open() {
        let mut gate = EffectGate::default();
        assert_eq!(gate.poll(true, 2), GateState::Wait);
        assert_eq!(gate.poll(true, 2), GateState::Wait);
        assert_eq!(gate.poll(true, 2), GateState::Forced { polls: 2 });
        assert_eq!(gate.polls(), 0);
    }

    #[test]
    fn gate_resets_when_effect_finishes() {
        let mut gate = EffectGate::default();
        gate.poll(true, 5);
        assert_eq!(gate.poll(false, 5), GateState::Open);
        assert_eq!(gate.polls(), 0);
    }
}
