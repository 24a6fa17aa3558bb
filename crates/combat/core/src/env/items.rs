use bitflags::bitflags;

use super::DiceExpr;
use crate::combat::DamageType;

/// Catalog key for a weapon definition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WeaponId(pub u16);

bitflags! {
    /// Raw catalog tags. Resolved once per declaration into
    /// [`crate::action::AttackKind`]; nothing downstream re-reads them.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[cfg_attr(feature = "serde", serde(transparent))]
    pub struct WeaponTags: u16 {
        const MELEE = 1 << 0;
        const FIREARM = 1 << 1;
        const BOW = 1 << 2;
        const CROSSBOW = 1 << 3;
        const LAUNCHER = 1 << 4;
        const THROWN = 1 << 5;
        const EXPLOSIVE = 1 << 6;
        const EXPLODES_ON_IMPACT = 1 << 7;
        const SNIPER = 1 << 8;
        const SHOTGUN = 1 << 9;
        const RIFLE = 1 << 10;
        /// The point-blank bonus only applies while the wielder grapples.
        const POINT_BLANK_NEEDS_GRAPPLE = 1 << 11;
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[cfg_attr(feature = "serde", serde(transparent))]
    pub struct FireModes: u8 {
        const SINGLE = 1 << 0;
        const BURST = 1 << 1;
        const AUTOMATIC = 1 << 2;
    }
}

/// Read-only weapon definition.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WeaponData {
    pub id: WeaponId,
    pub name: String,
    pub damage: DiceExpr,
    pub damage_type: DamageType,
    pub tags: WeaponTags,
    pub fire_modes: FireModes,
    /// Blast radius in feet for explosives.
    pub burst_radius_ft: Option<u32>,
    /// Magazine capacity. `None` means no ammunition is tracked.
    pub magazine: Option<u32>,
}

impl WeaponData {
    pub fn new(id: WeaponId, name: impl Into<String>, damage: DiceExpr, tags: WeaponTags) -> Self {
        Self {
            id,
            name: name.into(),
            damage,
            damage_type: DamageType::Physical,
            tags,
            fire_modes: FireModes::SINGLE,
            burst_radius_ft: None,
            magazine: None,
        }
    }

    pub fn with_damage_type(mut self, damage_type: DamageType) -> Self {
        self.damage_type = damage_type;
        self
    }

    pub fn with_fire_modes(mut self, fire_modes: FireModes) -> Self {
        self.fire_modes = fire_modes;
        self
    }

    pub fn with_burst_radius(mut self, feet: u32) -> Self {
        self.burst_radius_ft = Some(feet);
        self
    }

    pub fn with_magazine(mut self, capacity: u32) -> Self {
        self.magazine = Some(capacity);
        self
    }

    pub fn is_melee(&self) -> bool {
        self.tags.contains(WeaponTags::MELEE)
    }
}

/// Weapon catalog oracle.
pub trait WeaponOracle: Send + Sync {
    fn weapon(&self, id: WeaponId) -> Option<WeaponData>;
}
