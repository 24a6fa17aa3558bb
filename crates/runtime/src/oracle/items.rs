//! [`combat_core::WeaponOracle`] backed by an in-memory map.
use std::collections::HashMap;

use combat_core::{DamageType, DiceExpr, FireModes, WeaponData, WeaponId, WeaponOracle, WeaponTags};

/// Weapon catalog keyed by [`WeaponId`].
#[derive(Debug, Clone, Default)]
pub struct WeaponCatalog {
    definitions: HashMap<WeaponId, WeaponData>,
}

impl WeaponCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a definition, replacing any previous one with the same id.
    pub fn add_definition(&mut self, weapon: WeaponData) -> Option<WeaponData> {
        self.definitions.insert(weapon.id, weapon)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Built-in arsenal used when a scenario ships no weapons of its own.
    ///
    /// | id | weapon          |
    /// |----|-----------------|
    /// | 1  | pistol          |
    /// | 2  | knife           |
    /// | 3  | frag grenade    |
    /// | 4  | rocket launcher |
    /// | 5  | smg             |
    /// | 6  | hunting rifle   |
    /// | 7  | shotgun         |
    /// | 8  | crossbow        |
    pub fn standard() -> Self {
        let weapons = [
            WeaponData::new(WeaponId(1), "pistol", DiceExpr::new(2, 4, 0), WeaponTags::FIREARM)
                .with_damage_type(DamageType::Piercing)
                .with_magazine(6),
            WeaponData::new(WeaponId(2), "knife", DiceExpr::new(1, 4, 1), WeaponTags::MELEE),
            WeaponData::new(
                WeaponId(3),
                "frag grenade",
                DiceExpr::new(3, 6, 0),
                WeaponTags::THROWN | WeaponTags::EXPLOSIVE,
            )
            .with_damage_type(DamageType::Blast)
            .with_burst_radius(10),
            WeaponData::new(
                WeaponId(4),
                "rocket launcher",
                DiceExpr::new(4, 6, 0),
                WeaponTags::LAUNCHER | WeaponTags::EXPLOSIVE | WeaponTags::EXPLODES_ON_IMPACT,
            )
            .with_damage_type(DamageType::Blast)
            .with_burst_radius(5)
            .with_magazine(1),
            WeaponData::new(WeaponId(5), "smg", DiceExpr::new(1, 8, 0), WeaponTags::FIREARM)
                .with_damage_type(DamageType::Piercing)
                .with_fire_modes(FireModes::SINGLE | FireModes::BURST | FireModes::AUTOMATIC)
                .with_magazine(30),
            WeaponData::new(
                WeaponId(6),
                "hunting rifle",
                DiceExpr::new(2, 8, 0),
                WeaponTags::FIREARM | WeaponTags::RIFLE,
            )
            .with_damage_type(DamageType::Piercing)
            .with_magazine(5),
            WeaponData::new(
                WeaponId(7),
                "shotgun",
                DiceExpr::new(3, 4, 0),
                WeaponTags::FIREARM | WeaponTags::SHOTGUN,
            )
            .with_damage_type(DamageType::Piercing)
            .with_magazine(2),
            WeaponData::new(
                WeaponId(8),
                "crossbow",
                DiceExpr::new(1, 10, 0),
                WeaponTags::CROSSBOW,
            )
            .with_damage_type(DamageType::Piercing)
            .with_magazine(1),
        ];
        weapons.into_iter().collect()
    }
}

impl FromIterator<WeaponData> for WeaponCatalog {
    fn from_iter<I: IntoIterator<Item = WeaponData>>(iter: I) -> Self {
        Self {
            definitions: iter.into_iter().map(|weapon| (weapon.id, weapon)).collect(),
        }
    }
}

impl WeaponOracle for WeaponCatalog {
    fn weapon(&self, id: WeaponId) -> Option<WeaponData> {
        self.definitions.get(&id).cloned()
    }
}
