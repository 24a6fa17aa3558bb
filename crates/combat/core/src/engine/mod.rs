//! Turn scheduling and action resolution.
//!
//! The [`CombatEngine`] is the authoritative reducer for [`CombatState`]. It
//! owns the phase machine, the per-turn session and the only path by which
//! player and NPC declarations reach the roll and damage pipeline, so both
//! actor kinds see identical rules.
//!
//! The engine never blocks. Where combat has to wait (player input, an effect
//! still playing) it parks in an explicit phase and returns an [`Advance`]
//! telling the host what to do next.

mod declare;
mod errors;
mod events;
mod initiative;
mod npc;
mod phase;
mod resolve;
mod session;
mod turns;


pub use errors::{CombatError, MissingReference};
pub use events::CombatEvent;
pub use initiative::{InitiativeEntry, InitiativeTracker};
pub use phase::CombatPhase;
pub use session::{AiTurnState, EffectGate, Encounter, EncounterOutcome, GateState, TurnSession};

use std::time::Duration;

use crate::action::AttackKind;
use crate::state::{CombatState, EntityId};

/// What the host has to provide.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Awaiting {
    /// A [`crate::action::PlayerCommand`] for the player's turn.
    Command { actor: EntityId },
    /// A defense against an incoming attack.
    Defense {
        attacker: EntityId,
        defender: EntityId,
        attack: AttackKind,
    },
}

/// Result of every engine step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Advance {
    /// An effect is still playing; call `advance_turn` again after the delay.
    Waiting { retry_in: Duration },
    AwaitingPlayer(Awaiting),
    /// A turn finished (or was skipped); call `advance_turn` for the next one.
    TurnEnded { actor: EntityId },
    Ended(EncounterOutcome),
}

/// Combat engine driving one [`CombatState`].
pub struct CombatEngine<'a> {
    state: &'a mut CombatState,
}

impl<'a> CombatEngine<'a> {
    pub fn new(state: &'a mut CombatState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &CombatState {
        &*self.state
    }

    pub fn phase(&self) -> CombatPhase {
        self.state.encounter.phase
    }

    /// Moves the machine to `next`, rejecting edges the phase graph lacks.
    fn transition(&mut self, next: CombatPhase) -> Result<(), CombatError> {
        let from = self.state.encounter.phase;
        if from == next {
            return Ok(());
        }
        if !from.can_transition_to(next) {
            tracing::error!(%from, to = %next, "illegal phase transition");
            return Err(CombatError::IllegalTransition { from, to: next });
        }
        tracing::debug!(%from, to = %next, "phase");
        self.state.encounter.phase = next;
        self.state.emit(CombatEvent::PhaseChanged { from, to: next });
        Ok(())
    }

    fn session(&self) -> Result<&TurnSession, CombatError> {
        self.state
            .encounter
            .session
            .as_ref()
            .ok_or(CombatError::MissingReference(MissingReference::Session))
    }

    fn session_mut(&mut self) -> Result<&mut TurnSession, CombatError> {
        self.state
            .encounter
            .session
            .as_mut()
            .ok_or(CombatError::MissingReference(MissingReference::Session))
    }

    /// `Some` once the encounter has ended.
    fn ended(&self) -> Option<Advance> {
        (self.state.encounter.phase == CombatPhase::Ended).then(|| self.outcome_advance())
    }
}
