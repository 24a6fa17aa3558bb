//! NPC decision making.
//!
//! The AI never mutates state. Each call reads an [`AiContext`] and returns a
//! [`Decision`]; the engine executes the chosen step through the same
//! declaration path the player uses, so NPC attacks obey identical rules.
//!
//! # Layers
//!
//! - [`targeting`]: aggro-first target acquisition with a weighted fallback
//! - [`turn`]: one iteration of the bounded action loop
//! - [`fall`]: risk-gated tactical drops
//! - [`orders`]: companion standing orders
//! - [`explore`]: behaviour when there is nothing to fight

pub mod explore;
pub mod fall;
pub mod orders;
pub mod targeting;
pub mod turn;

pub use explore::{ExploreChoice, explore_choice};
pub use fall::{FallCheck, best_drop, fall_difficulty, score_drop, should_take_fall};
pub use targeting::{TargetScore, acquire_target, is_valid_target, score_candidate, select_target};
pub use turn::decide;

use crate::action::{AttackDeclaration, Hand};
use crate::config::CombatConfig;
use crate::engine::InitiativeTracker;
use crate::env::{CombatEnv, DropOption, OracleError, WeaponData};
use crate::state::{Combatant, EntityId, Position, Roster, Round, Sighting};

/// Read-only blackboard for one NPC decision.
pub struct AiContext<'a> {
    /// The combatant deciding.
    pub me: &'a Combatant,
    pub roster: &'a Roster,
    /// Initiative set of the running encounter (empty outside combat).
    pub tracker: &'a InitiativeTracker,
    pub config: &'a CombatConfig,
    pub round: Round,
    pub env: CombatEnv<'a>,
}

impl<'a> AiContext<'a> {
    pub fn new(
        me: &'a Combatant,
        roster: &'a Roster,
        tracker: &'a InitiativeTracker,
        config: &'a CombatConfig,
        env: CombatEnv<'a>,
    ) -> Self {
        Self {
            me,
            roster,
            tracker,
            config,
            round: tracker.round(),
            env,
        }
    }

    pub fn player(&self) -> Option<&'a Combatant> {
        self.roster.player()
    }

    /// Catalog entry for the weapon in `hand`, `None` when the hand is empty.
    pub fn weapon(&self, hand: Hand) -> Result<Option<WeaponData>, OracleError> {
        self.me
            .loadout
            .slot(hand)
            .map(|slot| self.env.weapon(slot.weapon))
            .transpose()
    }
}

/// What the NPC wants to do next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NpcStep {
    Attack(AttackDeclaration),
    Reload(Hand),
    Drop(DropOption),
    /// One pathing step toward the position.
    Move { toward: Position },
    Stop(StopReason),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StopReason {
    NoTarget,
    OutOfPoints,
    NothingProductive,
    /// Standing orders forbid moving.
    HoldingPosition,
    LoopCap,
}

/// Output of one AI iteration. `target` and `sighting` are written back to
/// the NPC's memory before the step runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Decision {
    pub target: Option<EntityId>,
    pub sighting: Option<Sighting>,
    pub step: NpcStep,
}

impl Decision {
    pub fn stop(target: Option<EntityId>, reason: StopReason) -> Self {
        Self {
            target,
            sighting: None,
            step: NpcStep::Stop(reason),
        }
    }
}
