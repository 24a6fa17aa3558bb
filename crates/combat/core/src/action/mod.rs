//! Declarations and the pending action record.
//!
//! Raw weapon tags are resolved exactly once, when an attack is declared,
//! into the closed [`AttackKind`] variant. Resolution code matches on the
//! variant and never looks at catalog tags again.
mod error;

pub use error::Rejection;

use crate::combat::burst_radius_tiles;
use crate::env::{FireModes, WeaponData, WeaponId, WeaponTags};
use crate::state::{BodyPart, EntityId, Position, Skill, Stat};

/// Ranged weapon families that differ in long-range accuracy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RangedClass {
    Pistol,
    Rifle,
    Sniper,
    Shotgun,
    Bow,
    Crossbow,
}

impl RangedClass {
    /// Adjustment applied beyond the 6-tile band.
    pub const fn long_range_adjustment(self) -> i32 {
        match self {
            RangedClass::Bow => -3,
            RangedClass::Shotgun => -2,
            RangedClass::Rifle => 2,
            RangedClass::Sniper => 5,
            RangedClass::Pistol | RangedClass::Crossbow => 0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Delivery {
    /// Hand-thrown; bystanders get a dodge roll.
    Thrown,
    /// Impact-triggered projectile; bystanders take collateral damage.
    Launched,
}

/// Closed classification of an attack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttackKind {
    Unarmed,
    Melee {
        weapon: WeaponId,
    },
    Ranged {
        weapon: WeaponId,
        class: RangedClass,
        point_blank_needs_grapple: bool,
    },
    Thrown {
        weapon: WeaponId,
    },
    Explosive {
        weapon: WeaponId,
        delivery: Delivery,
        radius_tiles: u32,
        explodes_on_impact: bool,
    },
}

/// Where an attack's skill bonus comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkillSource {
    Skill(Skill),
    Stat(Stat),
}

impl AttackKind {
    /// Resolves catalog tags into an attack kind. `None` means unarmed.
    pub fn classify(weapon: Option<&WeaponData>) -> Self {
        let Some(weapon) = weapon else {
            return AttackKind::Unarmed;
        };
        let tags = weapon.tags;
        let id = weapon.id;

        if tags.contains(WeaponTags::EXPLOSIVE) {
            let delivery = if tags.contains(WeaponTags::THROWN) {
                Delivery::Thrown
            } else {
                Delivery::Launched
            };
            return AttackKind::Explosive {
                weapon: id,
                delivery,
                radius_tiles: burst_radius_tiles(weapon.burst_radius_ft.unwrap_or(0)),
                explodes_on_impact: tags.contains(WeaponTags::EXPLODES_ON_IMPACT),
            };
        }
        if tags.contains(WeaponTags::MELEE) {
            return AttackKind::Melee { weapon: id };
        }
        if tags.contains(WeaponTags::THROWN) {
            return AttackKind::Thrown { weapon: id };
        }
        if tags.intersects(
            WeaponTags::FIREARM | WeaponTags::BOW | WeaponTags::CROSSBOW | WeaponTags::LAUNCHER,
        ) {
            let class = if tags.contains(WeaponTags::SNIPER) {
                RangedClass::Sniper
            } else if tags.contains(WeaponTags::SHOTGUN) {
                RangedClass::Shotgun
            } else if tags.contains(WeaponTags::BOW) {
                RangedClass::Bow
            } else if tags.contains(WeaponTags::CROSSBOW) {
                RangedClass::Crossbow
            } else if tags.intersects(WeaponTags::RIFLE | WeaponTags::LAUNCHER) {
                RangedClass::Rifle
            } else {
                RangedClass::Pistol
            };
            return AttackKind::Ranged {
                weapon: id,
                class,
                point_blank_needs_grapple: tags.contains(WeaponTags::POINT_BLANK_NEEDS_GRAPPLE),
            };
        }
        // Untagged items are swung like clubs.
        AttackKind::Melee { weapon: id }
    }

    pub fn weapon(&self) -> Option<WeaponId> {
        match *self {
            AttackKind::Unarmed => None,
            AttackKind::Melee { weapon }
            | AttackKind::Ranged { weapon, .. }
            | AttackKind::Thrown { weapon }
            | AttackKind::Explosive { weapon, .. } => Some(weapon),
        }
    }

    pub fn skill_source(&self) -> SkillSource {
        match self {
            AttackKind::Unarmed => SkillSource::Skill(Skill::Unarmed),
            AttackKind::Melee { .. } => SkillSource::Skill(Skill::MeleeWeapons),
            AttackKind::Ranged { .. } => SkillSource::Skill(Skill::Guns),
            AttackKind::Thrown { .. } => SkillSource::Stat(Stat::Strength),
            AttackKind::Explosive { .. } => SkillSource::Skill(Skill::Explosives),
        }
    }

    /// Unarmed and melee attacks must be within reach.
    pub fn is_close_combat(&self) -> bool {
        matches!(self, AttackKind::Unarmed | AttackKind::Melee { .. })
    }

    /// Only non-thrown ranged attacks leave no room for an active defense.
    pub fn allows_active_defense(&self) -> bool {
        !matches!(
            self,
            AttackKind::Ranged { .. }
                | AttackKind::Explosive {
                    delivery: Delivery::Launched,
                    ..
                }
        )
    }

    pub fn is_explosive(&self) -> bool {
        matches!(self, AttackKind::Explosive { .. })
    }
}

/// How many projectiles the trigger sends.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FireMode {
    #[default]
    Single,
    Burst,
    Automatic,
}

impl FireMode {
    pub const fn flag(self) -> FireModes {
        match self {
            FireMode::Single => FireModes::SINGLE,
            FireMode::Burst => FireModes::BURST,
            FireMode::Automatic => FireModes::AUTOMATIC,
        }
    }

    pub const fn modifier(self) -> i32 {
        match self {
            FireMode::Single => 0,
            FireMode::Burst => -5,
            FireMode::Automatic => -8,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Hand {
    #[default]
    Main,
    /// Dual-wield follow-up: rolls with disadvantage, never critical.
    Off,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionType {
    Attack,
    Reload,
    Grapple,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TargetRef {
    Entity(EntityId),
    Tile(Position),
}

impl TargetRef {
    pub fn entity(&self) -> Option<EntityId> {
        match *self {
            TargetRef::Entity(id) => Some(id),
            TargetRef::Tile(_) => None,
        }
    }
}

/// Attack as declared by a player or built by the AI.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttackDeclaration {
    pub target: TargetRef,
    pub body_part: BodyPart,
    pub fire_mode: FireMode,
    pub hand: Hand,
}

impl AttackDeclaration {
    /// Single main-hand attack at the torso.
    pub fn at(target: EntityId) -> Self {
        Self {
            target: TargetRef::Entity(target),
            body_part: BodyPart::Torso,
            fire_mode: FireMode::Single,
            hand: Hand::Main,
        }
    }

    pub fn at_tile(position: Position) -> Self {
        Self {
            target: TargetRef::Tile(position),
            ..Self::at(EntityId::PLAYER)
        }
    }

    pub fn aimed_at(mut self, body_part: BodyPart) -> Self {
        self.body_part = body_part;
        self
    }

    pub fn with_fire_mode(mut self, fire_mode: FireMode) -> Self {
        self.fire_mode = fire_mode;
        self
    }

    pub fn off_hand(mut self) -> Self {
        self.hand = Hand::Off;
        self
    }
}

/// The single live action record. Created by declaration, consumed once by
/// resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PendingCombatAction {
    pub actor: EntityId,
    pub target: TargetRef,
    pub weapon: Option<WeaponId>,
    pub attack: AttackKind,
    pub body_part: BodyPart,
    pub fire_mode: FireMode,
    pub hand: Hand,
    pub action_type: ActionType,
}

/// Everything a player can ask for during their turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PlayerCommand {
    Attack(AttackDeclaration),
    /// Take one step toward the destination.
    Move { toward: Position },
    Reload { hand: Hand },
    Grapple { target: EntityId },
    /// Forfeit remaining points.
    EndTurn,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{DiceExpr, WeaponData};

    fn weapon(tags: WeaponTags) -> WeaponData {
        WeaponData::new(WeaponId(1), "test", DiceExpr::new(1, 6, 0), tags)
    }

    #[test]
    fn classifies_each_family_once() {
        assert_eq!(AttackKind::classify(None), AttackKind::Unarmed);
        assert!(matches!(
            AttackKind::classify(Some(&weapon(WeaponTags::MELEE))),
            AttackKind::Melee { .. }
        ));
        assert!(matches!(
            AttackKind::classify(Some(&weapon(WeaponTags::THROWN))),
            AttackKind::Thrown { .. }
        ));
        assert!(matches!(
            AttackKind::classify(Some(&weapon(WeaponTags::FIREARM | WeaponTags::SNIPER))),
            AttackKind::Ranged {
                class: RangedClass::Sniper,
                ..
            }
        ));
        assert!(matches!(
            AttackKind::classify(Some(&weapon(WeaponTags::LAUNCHER))),
            AttackKind::Ranged {
                class: RangedClass::Rifle,
                ..
            }
        ));
    }

    #[test]
    fn explosives_carry_radius_and_delivery() {
        let grenade =
            weapon(WeaponTags::THROWN | WeaponTags::EXPLOSIVE).with_burst_radius(10);
        let rocket = weapon(
            WeaponTags::LAUNCHER | WeaponTags::EXPLOSIVE | WeaponTags::EXPLODES_ON_IMPACT,
        )
        .with_burst_radius(12);

        assert_eq!(
            AttackKind::classify(Some(&grenade)),
            AttackKind::Explosive {
                weapon: WeaponId(1),
                delivery: Delivery::Thrown,
                radius_tiles: 2,
                explodes_on_impact: false,
            }
        );
        let rocket_kind = AttackKind::classify(Some(&rocket));
        assert!(matches!(
            rocket_kind,
            AttackKind::Explosive {
                delivery: Delivery::Launched,
                radius_tiles: 3,
                explodes_on_impact: true,
                ..
            }
        ));
        assert_eq!(
            rocket_kind.skill_source(),
            SkillSource::Skill(Skill::Explosives)
        );
    }

    #[test]
    fn only_thrown_and_close_attacks_allow_active_defense() {
        let gun = AttackKind::classify(Some(&weapon(WeaponTags::FIREARM)));
        let knife = AttackKind::classify(Some(&weapon(WeaponTags::THROWN)));

        assert!(!gun.allows_active_defense());
        assert!(knife.allows_active_defense());
        assert!(AttackKind::Unarmed.allows_active_defense());
        assert_eq!(knife.skill_source(), SkillSource::Stat(Stat::Strength));
    }
}
