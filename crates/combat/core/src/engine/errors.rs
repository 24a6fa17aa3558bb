//! Errors surfaced by the combat engine.

use super::phase::CombatPhase;
use crate::action::Rejection;
use crate::env::OracleError;
use crate::error::{ErrorSeverity, GameError};
use crate::state::EntityId;

/// Something the engine expected to exist has vanished.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MissingReference {
    #[error("current initiative entry")]
    InitiativeEntry,

    #[error("combatant {0}")]
    Combatant(EntityId),

    #[error("turn session")]
    Session,

    #[error("pending action")]
    PendingAction,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CombatError {
    /// Logged and answered by ending the encounter; hosts only see it when
    /// calling into a dead encounter.
    #[error("missing reference: {0}")]
    MissingReference(MissingReference),

    /// The declaration was refused; state is unchanged.
    #[error("invalid action: {0}")]
    InvalidAction(#[from] Rejection),

    #[error("illegal phase transition {from} -> {to}")]
    IllegalTransition { from: CombatPhase, to: CombatPhase },

    #[error("no encounter is active")]
    NoActiveEncounter,

    #[error("an encounter is already running")]
    EncounterInProgress,

    #[error(transparent)]
    Oracle(#[from] OracleError),
}

impl CombatError {
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            CombatError::InvalidAction(rejection) => Some(rejection),
            _ => None,
        }
    }
}

impl From<MissingReference> for CombatError {
    fn from(missing: MissingReference) -> Self {
        CombatError::MissingReference(missing)
    }
}

impl GameError for CombatError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            CombatError::MissingReference(_) => ErrorSeverity::Internal,
            CombatError::InvalidAction(rejection) => rejection.severity(),
            CombatError::IllegalTransition { .. } => ErrorSeverity::Internal,
            CombatError::NoActiveEncounter | CombatError::EncounterInProgress => {
                ErrorSeverity::Validation
            }
            CombatError::Oracle(error) => error.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            CombatError::MissingReference(_) => "COMBAT_MISSING_REFERENCE",
            CombatError::InvalidAction(rejection) => rejection.error_code(),
            CombatError::IllegalTransition { .. } => "COMBAT_ILLEGAL_TRANSITION",
            CombatError::NoActiveEncounter => "COMBAT_NO_ACTIVE_ENCOUNTER",
            CombatError::EncounterInProgress => "COMBAT_ENCOUNTER_IN_PROGRESS",
            CombatError::Oracle(error) => error.error_code(),
        }
    }
}
