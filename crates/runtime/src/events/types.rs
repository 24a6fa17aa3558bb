//! Notices raised by the host loop itself, next to the engine's own
//! [`combat_core::CombatEvent`]s.
use serde::{Deserialize, Serialize};

use combat_core::{Awaiting, EncounterOutcome, EntityId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HostEvent {
    /// The engine parked for a player declaration.
    AwaitingPlayer(Awaiting),

    /// The controller failed; the runner fell back to a safe declaration.
    ControllerFailed { actor: EntityId, message: String },

    /// The same actor had this many declarations refused in a row and
    /// its turn was ended for it.
    RejectionLimit { actor: EntityId, rejections: u32 },

    /// The round cap was hit and the encounter was ended by the host.
    RoundLimit { rounds: u32 },

    EncounterFinished {
        outcome: EncounterOutcome,
        rounds: u32,
    },
}
