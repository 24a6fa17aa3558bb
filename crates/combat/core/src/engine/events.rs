use super::initiative::InitiativeEntry;
use super::phase::CombatPhase;
use super::session::EncounterOutcome;
use crate::action::{Hand, Rejection};
use crate::combat::{
    CrisisResolution, DamageType, DeathCause, DefenseKind, RollResult, Verdict, WoundOutcome,
};
use crate::state::{BodyPart, EntityId, Position, Round};

/// Observable record of everything the engine did.
///
/// Appended to [`crate::state::CombatState`] and drained by the host.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CombatEvent {
    EncounterStarted {
        order: Vec<InitiativeEntry>,
    },
    RoundStarted {
        round: Round,
    },
    TurnStarted {
        actor: EntityId,
        round: Round,
    },
    /// Incapacitated combatants lose their turn.
    TurnSkipped {
        actor: EntityId,
    },
    PhaseChanged {
        from: CombatPhase,
        to: CombatPhase,
    },
    EffectGateForced {
        polls: u32,
    },
    Rejected {
        actor: EntityId,
        reason: Rejection,
    },
    AttackResolved {
        attacker: EntityId,
        defender: EntityId,
        attack: RollResult,
        defense_kind: DefenseKind,
        defense: RollResult,
        verdict: Verdict,
    },
    Exploded {
        at: Position,
        radius: u32,
        affected: Vec<EntityId>,
    },
    BlastDodged {
        target: EntityId,
        dodge: RollResult,
    },
    DamageApplied {
        target: EntityId,
        source: Option<EntityId>,
        part: BodyPart,
        damage_type: DamageType,
        raw: u32,
        effective: u32,
        outcome: WoundOutcome,
    },
    CrisisEntered {
        target: EntityId,
        part: BodyPart,
        damage_type: DamageType,
    },
    CrisisResolved {
        target: EntityId,
        resolution: CrisisResolution,
    },
    CombatantDied {
        target: EntityId,
        cause: DeathCause,
    },
    /// The player died.
    GameOver,
    AggroShared {
        victim: EntityId,
        attacker: EntityId,
        amount: u32,
        recipients: Vec<EntityId>,
    },
    Moved {
        actor: EntityId,
        from: Position,
        to: Position,
        cost: u32,
    },
    Dropped {
        actor: EntityId,
        from: Position,
        to: Position,
        fall_height: u32,
    },
    FallRefused {
        actor: EntityId,
        fall_height: u32,
        roll: Option<RollResult>,
        difficulty: i32,
    },
    Reloaded {
        actor: EntityId,
        hand: Hand,
        loaded: u32,
        reserve: u32,
    },
    GrappleStarted {
        actor: EntityId,
        target: EntityId,
    },
    GrappleReleased {
        actor: EntityId,
        target: EntityId,
    },
    TurnEnded {
        actor: EntityId,
        forfeited: bool,
    },
    EncounterEnded {
        outcome: EncounterOutcome,
    },
}
