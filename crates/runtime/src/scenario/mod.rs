//! Scenario files: map layout, weapons and combatant placement.
//!
//! Scenarios are RON documents. The map and weapon sections become the
//! immutable oracles; the combatant section becomes the initial
//! [`Roster`]. Validation happens before anything is built, so a bad file
//! never produces a half-initialized state.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use combat_core::{
    AmbientLight, Armor, BehaviorProfile, Body, BodyPart, CombatConfig, CombatState, Combatant,
    Controller, DamageType, DiceExpr, DropOption, EntityId, FireModes, Position, Roster, Skills,
    StandingOrder, Stats, TeamId, WeaponData, WeaponId, WeaponSlot, WeaponTags,
};
use serde::{Deserialize, Serialize};

use crate::api::{Result, RuntimeError};
use crate::oracle::{GridMap, OracleManager, TimedEffects, WeaponCatalog};

/// A complete encounter setup.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: String,

    /// Encounter seed. Overridden by [`crate::RuntimeConfig::seed`].
    #[serde(default)]
    pub seed: u64,

    pub map: MapSpec,

    /// Added on top of [`WeaponCatalog::standard`], replacing equal ids.
    #[serde(default)]
    pub weapons: Vec<WeaponSpec>,

    pub combatants: Vec<CombatantSpec>,

    /// Who rolls initiative. Everyone when absent.
    #[serde(default)]
    pub encounter: Option<Vec<u32>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapSpec {
    pub width: u32,
    pub height: u32,
    #[serde(default = "one_level")]
    pub levels: u32,
    #[serde(default)]
    pub ambient: AmbientLight,
    #[serde(default)]
    pub walls: Vec<Position>,
    #[serde(default)]
    pub doors: Vec<DoorSpec>,
    #[serde(default)]
    pub cover: Vec<CoverSpec>,
    #[serde(default)]
    pub lights: Vec<LightSpec>,
    #[serde(default)]
    pub loot: Vec<Position>,
    #[serde(default)]
    pub drops: Vec<DropSpec>,
}

fn one_level() -> u32 {
    1
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoorSpec {
    pub at: Position,
    #[serde(default = "door_cost")]
    pub open_cost: u32,
}

fn door_cost() -> u32 {
    1
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverSpec {
    pub at: Position,
    pub bonus: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightSpec {
    pub at: Position,
    pub radius: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropSpec {
    pub from: Position,
    pub landing: Position,
    pub fall_height: u32,
}

/// Weapon definition with catalog defaults filled in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponSpec {
    pub id: u16,
    pub name: String,
    pub damage: DiceExpr,
    #[serde(default)]
    pub damage_type: DamageType,
    pub tags: WeaponTags,
    #[serde(default = "single_fire")]
    pub fire_modes: FireModes,
    #[serde(default)]
    pub burst_radius_ft: Option<u32>,
    #[serde(default)]
    pub magazine: Option<u32>,
}

fn single_fire() -> FireModes {
    FireModes::SINGLE
}

impl From<&WeaponSpec> for WeaponData {
    fn from(spec: &WeaponSpec) -> Self {
        let mut weapon = WeaponData::new(WeaponId(spec.id), spec.name.clone(), spec.damage, spec.tags)
            .with_damage_type(spec.damage_type)
            .with_fire_modes(spec.fire_modes);
        weapon.burst_radius_ft = spec.burst_radius_ft;
        weapon.magazine = spec.magazine;
        weapon
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotSpec {
    pub weapon: u16,
    #[serde(default)]
    pub loaded: u32,
    #[serde(default)]
    pub reserve: u32,
}

impl From<SlotSpec> for WeaponSlot {
    fn from(spec: SlotSpec) -> Self {
        WeaponSlot::with_ammo(WeaponId(spec.weapon), spec.loaded, spec.reserve)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatantSpec {
    pub id: u32,
    pub name: String,
    /// Team 0 is the player's.
    #[serde(default)]
    pub team: u16,
    pub controller: Controller,
    pub position: Position,
    #[serde(default)]
    pub stats: Stats,
    #[serde(default)]
    pub skills: Skills,
    /// Flat armor on every part.
    #[serde(default)]
    pub armor: u32,
    /// Part maxima: head, torso, left arm, right arm, left leg, right leg.
    #[serde(default)]
    pub body: Option<[u32; BodyPart::COUNT]>,
    #[serde(default)]
    pub main_hand: Option<SlotSpec>,
    #[serde(default)]
    pub off_hand: Option<SlotSpec>,
    #[serde(default)]
    pub orders: StandingOrder,
    #[serde(default)]
    pub profile: BehaviorProfile,
}

impl CombatantSpec {
    fn build(&self) -> Combatant {
        let mut combatant = Combatant::new(
            EntityId(self.id),
            self.name.clone(),
            TeamId(self.team),
            self.controller,
            self.position,
        )
        .with_stats(self.stats)
        .with_skills(self.skills)
        .with_armor(Armor::uniform(self.armor))
        .with_orders(self.orders)
        .with_profile(self.profile);
        if let Some(maxima) = self.body {
            combatant = combatant.with_body(Body::from_maxima(maxima));
        }
        if let Some(slot) = self.main_hand {
            combatant = combatant.with_main_hand(slot.into());
        }
        if let Some(slot) = self.off_hand {
            combatant = combatant.with_off_hand(slot.into());
        }
        combatant
    }
}

impl Scenario {
    /// Reads and validates a scenario file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| RuntimeError::ScenarioIo {
            path: path.to_path_buf(),
            source,
        })?;
        let scenario = Self::from_ron_str(&text)?;
        tracing::info!(
            path = %path.display(),
            name = %scenario.name,
            combatants = scenario.combatants.len(),
            "scenario loaded"
        );
        Ok(scenario)
    }

    /// Parses and validates a scenario from RON text.
    pub fn from_ron_str(text: &str) -> Result<Self> {
        let scenario: Scenario = ron::from_str(text)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Checks ids, player identity and placement against the map.
    pub fn validate(&self) -> Result<()> {
        if self.map.width == 0 || self.map.height == 0 {
            return Err(RuntimeError::InvalidScenario("map has no tiles".into()));
        }
        let map = self.build_map();
        let mut ids = HashSet::new();
        let mut positions = HashSet::new();
        for spec in &self.combatants {
            let id = EntityId(spec.id);
            if !ids.insert(id) {
                return Err(RuntimeError::DuplicateCombatant(id));
            }
            if (spec.controller == Controller::Player) != id.is_player() {
                return Err(RuntimeError::InvalidScenario(format!(
                    "{} ({id}) must use id 0 exactly when player-controlled",
                    spec.name
                )));
            }
            if !map.is_passable(spec.position) {
                return Err(RuntimeError::InvalidScenario(format!(
                    "{} stands on blocked tile {}",
                    spec.name, spec.position
                )));
            }
            if !positions.insert(spec.position) {
                return Err(RuntimeError::InvalidScenario(format!(
                    "{} shares tile {} with another combatant",
                    spec.name, spec.position
                )));
            }
        }
        if let Some(encounter) = &self.encounter
            && let Some(stranger) = encounter.iter().find(|id| !ids.contains(&EntityId(**id)))
        {
            return Err(RuntimeError::InvalidScenario(format!(
                "encounter lists unknown combatant {}",
                EntityId(*stranger)
            )));
        }
        Ok(())
    }

    pub fn build_map(&self) -> GridMap {
        let spec = &self.map;
        let mut map = GridMap::new(spec.width, spec.height, spec.levels).with_ambient(spec.ambient);
        for wall in &spec.walls {
            map.add_wall(*wall);
        }
        for door in &spec.doors {
            map.add_door(door.at, door.open_cost);
        }
        for cover in &spec.cover {
            map.add_cover(cover.at, cover.bonus);
        }
        for light in &spec.lights {
            map.add_light(light.at, light.radius);
        }
        for loot in &spec.loot {
            map.add_loot(*loot);
        }
        for drop in &spec.drops {
            map.add_drop(
                drop.from,
                DropOption {
                    landing: drop.landing,
                    fall_height: drop.fall_height,
                },
            );
        }
        map
    }

    pub fn build_catalog(&self) -> WeaponCatalog {
        let mut catalog = WeaponCatalog::standard();
        for spec in &self.weapons {
            catalog.add_definition(spec.into());
        }
        catalog
    }

    pub fn build_roster(&self) -> Roster {
        self.combatants.iter().map(CombatantSpec::build).collect()
    }

    /// Encounter participants in file order.
    pub fn participants(&self) -> Vec<EntityId> {
        match &self.encounter {
            Some(ids) => ids.iter().copied().map(EntityId).collect(),
            None => self.combatants.iter().map(|c| EntityId(c.id)).collect(),
        }
    }

    pub fn create_oracles(&self, effects: TimedEffects) -> OracleManager {
        OracleManager::new(
            Arc::new(self.build_map()),
            Arc::new(self.build_catalog()),
            Arc::new(effects),
        )
    }

    /// Builds the starting state. `seed` replaces the scenario's own seed.
    pub fn create_initial_state(&self, config: CombatConfig, seed: Option<u64>) -> CombatState {
        let seed = seed.unwrap_or(self.seed);
        tracing::info!(
            name = %self.name,
            seed,
            combatants = self.combatants.len(),
            "creating initial state from scenario"
        );
        CombatState::with_config(self.build_roster(), seed, config)
    }
}
