use crate::error::{ErrorSeverity, GameError};
use crate::state::EntityId;

/// Why a declaration was refused.
///
/// Rejections never end an encounter: the player is re-prompted and the AI
/// moves on to its next option.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Rejection {
    #[error("it is not {actor}'s turn")]
    NotYourTurn { actor: EntityId },

    #[error("no declaration is expected right now")]
    NotAwaitingDeclaration,

    #[error("no action points left")]
    NoActionPoints,

    #[error("no movement points left")]
    NoMovementPoints,

    #[error("target is out of range")]
    OutOfRange,

    #[error("no line of sight to target")]
    NoLineOfSight,

    #[error("cannot block armed without a melee weapon")]
    IllegalDefense,

    #[error("no weapon in hand")]
    NoWeapon,

    #[error("no off-hand weapon")]
    NoOffHandWeapon,

    #[error("off-hand attack needs a main-hand attack first")]
    OffHandWithoutMainAttack,

    #[error("weapon does not support that fire mode")]
    FireModeUnsupported,

    #[error("out of ammunition")]
    OutOfAmmo,

    #[error("magazine already full")]
    MagazineFull,

    #[error("weapon cannot be reloaded")]
    NotReloadable,

    #[error("target {target} is not hostile")]
    TargetNotHostile { target: EntityId },

    #[error("target {target} is not in this encounter")]
    TargetNotInEncounter { target: EntityId },

    #[error("this attack needs a creature target")]
    NeedsCreatureTarget,

    #[error("no path toward destination")]
    PathBlocked,

    #[error("grapple target is out of reach")]
    GrappleOutOfReach,
}

impl GameError for Rejection {
    fn severity(&self) -> ErrorSeverity {
        use Rejection::*;
        match self {
            NoActionPoints | NoMovementPoints | OutOfRange | NoLineOfSight | OutOfAmmo
            | PathBlocked | GrappleOutOfReach => ErrorSeverity::Recoverable,
            _ => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        use Rejection::*;
        match self {
            NotYourTurn { .. } => "REJECT_NOT_YOUR_TURN",
            NotAwaitingDeclaration => "REJECT_NOT_AWAITING_DECLARATION",
            NoActionPoints => "REJECT_NO_ACTION_POINTS",
            NoMovementPoints => "REJECT_NO_MOVEMENT_POINTS",
            OutOfRange => "REJECT_OUT_OF_RANGE",
            NoLineOfSight => "REJECT_NO_LINE_OF_SIGHT",
            IllegalDefense => "REJECT_ILLEGAL_DEFENSE",
            NoWeapon => "REJECT_NO_WEAPON",
            NoOffHandWeapon => "REJECT_NO_OFF_HAND_WEAPON",
            OffHandWithoutMainAttack => "REJECT_OFF_HAND_WITHOUT_MAIN_ATTACK",
            FireModeUnsupported => "REJECT_FIRE_MODE_UNSUPPORTED",
            OutOfAmmo => "REJECT_OUT_OF_AMMO",
            MagazineFull => "REJECT_MAGAZINE_FULL",
            NotReloadable => "REJECT_NOT_RELOADABLE",
            TargetNotHostile { .. } => "REJECT_TARGET_NOT_HOSTILE",
            TargetNotInEncounter { .. } => "REJECT_TARGET_NOT_IN_ENCOUNTER",
            NeedsCreatureTarget => "REJECT_NEEDS_CREATURE_TARGET",
            PathBlocked => "REJECT_PATH_BLOCKED",
            GrappleOutOfReach => "REJECT_GRAPPLE_OUT_OF_REACH",
        }
    }
}
