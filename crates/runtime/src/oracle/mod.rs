//! In-memory oracle implementations.
//!
//! These back the `combat-core` oracle traits with scenario data and bundle
//! them into an [`OracleManager`] so the runtime can lend out
//! [`combat_core::CombatEnv`] snapshots on demand. Map and catalog data are
//! immutable once loaded; everything that changes lives in
//! [`combat_core::CombatState`].
mod effects;
mod items;
mod map;

use std::sync::Arc;

use combat_core::{CombatEnv, Env, PcgRng};

pub use effects::{CueDurations, TimedEffects};
pub use items::WeaponCatalog;
pub use map::{GridMap, LightSource};

/// Owns every oracle implementation and hands out borrowed environments.
#[derive(Clone)]
pub struct OracleManager {
    pub(crate) map: Arc<GridMap>,
    pub(crate) weapons: Arc<WeaponCatalog>,
    pub(crate) effects: Arc<TimedEffects>,
    pub(crate) rng: PcgRng,
}

impl OracleManager {
    pub fn new(map: Arc<GridMap>, weapons: Arc<WeaponCatalog>, effects: Arc<TimedEffects>) -> Self {
        Self {
            map,
            weapons,
            effects,
            rng: PcgRng, // PcgRng is stateless
        }
    }

    /// Borrows every oracle as a [`CombatEnv`]. The map answers tile, sight
    /// and pathing queries.
    pub fn env(&self) -> CombatEnv<'_> {
        Env::new(
            Some(self.map.as_ref()),
            Some(self.weapons.as_ref()),
            Some(self.map.as_ref()),
            Some(self.map.as_ref()),
            Some(self.effects.as_ref()),
            Some(&self.rng),
        )
        .into_combat_env()
    }

    pub fn map(&self) -> &GridMap {
        &self.map
    }

    pub fn weapons(&self) -> Arc<WeaponCatalog> {
        Arc::clone(&self.weapons)
    }

    pub fn effects(&self) -> &TimedEffects {
        &self.effects
    }
}
