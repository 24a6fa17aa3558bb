//! Combat resolution rules.
//!
//! This module provides the pure pieces of the attack pipeline. The engine
//! gathers inputs from state and oracles, calls these functions and applies
//! the results, so player and NPC attacks share every formula.
//!
//! # Core Functions
//!
//! - `roll_attack` / `roll_defense`: d20 rolls with itemised modifiers
//! - `decide`: critical precedence, then strict total comparison
//! - `apply_wound`: HP, crisis and death rules for one body part
//! - `share_aggro`: threat propagation to the victim's team
//! - `affected` / `plan_blast`: explosive occupancy and exposure

pub mod area;
pub mod attack;
pub mod cover;
pub mod damage;
pub mod defense;
pub mod outcome;
pub mod roll;
pub mod threat;

pub use area::{BlastExposure, Exposure, affected, burst_radius_tiles, plan_blast};
pub use attack::{AttackInputs, attack_modifiers, range_modifier, roll_attack};
pub use cover::cover_bonus;
pub use damage::{
    CrisisResolution, DamageType, DeathCause, Hit, WoundOutcome, apply_wound, mitigate,
    roll_fall_damage, roll_unarmed_damage, roll_weapon_damage, tick_crises,
};
pub use defense::{DefenseInputs, DefenseKind, best_defense, legalize, roll_defense};
pub use outcome::{DecidedBy, Verdict, decide};
pub use roll::{Critical, Modifier, ModifierSource, RollMode, RollResult};
pub use threat::{record_hit, share_aggro};
