//! Deterministic turn-based tactical combat rules.
//!
//! `combat-core` defines initiative, the combat phase machine, attack and
//! defense rolls, body-part damage, threat, explosives and the NPC decision
//! loop. It is synchronous and performs no I/O: world data, dice and
//! presentation arrive through the oracle traits in [`env`], and all state
//! mutation flows through [`engine::CombatEngine`].
pub mod action;
pub mod ai;
pub mod combat;
pub mod config;
pub mod engine;
pub mod env;
pub mod error;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

pub use action::{
    ActionType, AttackDeclaration, AttackKind, Delivery, FireMode, Hand, PendingCombatAction,
    PlayerCommand, RangedClass, Rejection, TargetRef,
};
pub use ai::{AiContext, Decision, ExploreChoice, NpcStep, StopReason};
pub use combat::{DamageType, DefenseKind, RollResult, Verdict, WoundOutcome};
pub use config::CombatConfig;
pub use engine::{
    Advance, Awaiting, CombatEngine, CombatError, CombatEvent, CombatPhase, EncounterOutcome,
    InitiativeEntry, InitiativeTracker, MissingReference,
};
pub use env::{
    AmbientLight, CombatEnv, DiceExpr, DropOption, EffectCue, Env, FireModes, OracleError,
    PathStep, PathingOracle, PcgRng, PresentationError, PresentationSink, RngOracle,
    SightOracle, TileInfo, TileLayer, TileOracle, WeaponData, WeaponId, WeaponOracle,
    WeaponTags,
};
pub use error::{ErrorSeverity, GameError};
pub use state::{
    Armor, BehaviorProfile, Body, BodyPart, CombatState, Combatant, Controller, EntityId,
    Position, Roster, Round, Skills, StandingOrder, Stats, TeamId, WeaponSlot,
};
