//! Deterministic oracle doubles shared by unit tests.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::env::{
    AmbientLight, CombatEnv, DiceExpr, DropOption, EffectCue, Env, FireModes, PathStep,
    PathingOracle, PresentationError, PresentationSink, RngOracle, SightOracle, TileInfo,
    TileLayer, TileOracle, WeaponData, WeaponId, WeaponOracle, WeaponTags,
};
use crate::state::{Combatant, Controller, EntityId, Position, TeamId};

pub const PISTOL: WeaponId = WeaponId(1);
pub const KNIFE: WeaponId = WeaponId(2);
pub const GRENADE: WeaponId = WeaponId(3);
pub const ROCKET: WeaponId = WeaponId(4);
pub const SMG: WeaponId = WeaponId(5);

/// Plays back scripted die faces in order. Once the script runs out every
/// die shows its middle face.
#[derive(Debug)]
pub struct ScriptedRng {
    faces: Mutex<VecDeque<u32>>,
}

impl ScriptedRng {
    pub fn new(faces: impl IntoIterator<Item = u32>) -> Self {
        Self {
            faces: Mutex::new(faces.into_iter().collect()),
        }
    }

    pub fn remaining(&self) -> usize {
        self.faces.lock().map(|faces| faces.len()).unwrap_or(0)
    }
}

impl Default for ScriptedRng {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl RngOracle for ScriptedRng {
    fn next_u32(&self, seed: u64) -> u32 {
        seed as u32
    }

    fn roll_die(&self, _seed: u64, sides: u32) -> u32 {
        let scripted = self
            .faces
            .lock()
            .ok()
            .and_then(|mut faces| faces.pop_front());
        scripted.unwrap_or(sides.div_ceil(2))
    }
}

/// Open floor everywhere unless told otherwise.
#[derive(Debug, Default)]
pub struct TestTiles {
    tiles: HashMap<(TileLayer, Position), TileInfo>,
    loot: HashSet<Position>,
    lit: HashSet<Position>,
    ambient: AmbientLight,
}

impl TestTiles {
    pub fn with_tile(mut self, layer: TileLayer, at: Position, info: TileInfo) -> Self {
        self.tiles.insert((layer, at), info);
        self
    }

    pub fn with_loot(mut self, at: Position) -> Self {
        self.loot.insert(at);
        self
    }

    pub fn with_light(mut self, at: Position) -> Self {
        self.lit.insert(at);
        self
    }

    pub fn with_ambient(mut self, ambient: AmbientLight) -> Self {
        self.ambient = ambient;
        self
    }
}

impl TileOracle for TestTiles {
    fn tile(&self, layer: TileLayer, position: Position) -> Option<TileInfo> {
        self.tiles.get(&(layer, position)).copied()
    }

    fn is_lit(&self, position: Position) -> bool {
        self.lit.contains(&position)
    }

    fn ambient_light(&self) -> AmbientLight {
        self.ambient
    }

    fn has_loot(&self, position: Position) -> bool {
        self.loot.contains(&position)
    }
}

/// Everything is visible except the listed tiles, which can neither see nor
/// be seen.
#[derive(Debug, Default)]
pub struct TestSight {
    hidden: HashSet<Position>,
}

impl TestSight {
    pub fn blocking(tiles: impl IntoIterator<Item = Position>) -> Self {
        Self {
            hidden: tiles.into_iter().collect(),
        }
    }
}

impl SightOracle for TestSight {
    fn has_line_of_sight(&self, from: Position, to: Position) -> bool {
        !self.hidden.contains(&from) && !self.hidden.contains(&to)
    }
}

/// Greedy 4-neighbour stepping on a single level with optional walls and
/// ledges.
#[derive(Debug, Default)]
pub struct TestPathing {
    walls: HashSet<Position>,
    drops: HashMap<Position, Vec<DropOption>>,
}

impl TestPathing {
    pub fn open() -> Self {
        Self::default()
    }

    pub fn with_wall(mut self, at: Position) -> Self {
        self.walls.insert(at);
        self
    }

    pub fn with_drop(mut self, from: Position, option: DropOption) -> Self {
        self.drops.entry(from).or_default().push(option);
        self
    }
}

impl PathingOracle for TestPathing {
    fn next_step(&self, from: Position, to: Position, occupied: &[Position]) -> Option<PathStep> {
        let flat = |p: Position| (p.x - to.x).unsigned_abs() + (p.y - to.y).unsigned_abs();
        let here = flat(from);
        self.neighbours(from)
            .into_iter()
            .filter(|step| !occupied.contains(step))
            .filter(|step| flat(*step) < here)
            .min_by_key(|step| flat(*step))
            .map(PathStep::new)
    }

    fn neighbours(&self, from: Position) -> Vec<Position> {
        [(1, 0), (-1, 0), (0, 1), (0, -1)]
            .into_iter()
            .map(|(dx, dy)| Position::new(from.x + dx, from.y + dy, from.z))
            .filter(|tile| !self.walls.contains(tile))
            .collect()
    }

    fn drop_options(&self, from: Position) -> Vec<DropOption> {
        self.drops.get(&from).cloned().unwrap_or_default()
    }
}

/// A small fixed catalog keyed by the weapon constants above.
#[derive(Debug)]
pub struct TestWeapons {
    catalog: HashMap<WeaponId, WeaponData>,
}

impl Default for TestWeapons {
    fn default() -> Self {
        let catalog = [
            WeaponData::new(PISTOL, "pistol", DiceExpr::new(2, 4, 0), WeaponTags::FIREARM)
                .with_magazine(6),
            WeaponData::new(KNIFE, "knife", DiceExpr::new(1, 4, 1), WeaponTags::MELEE),
            WeaponData::new(
                GRENADE,
                "grenade",
                DiceExpr::new(3, 6, 0),
                WeaponTags::THROWN | WeaponTags::EXPLOSIVE,
            )
            .with_burst_radius(10),
            WeaponData::new(
                ROCKET,
                "rocket launcher",
                DiceExpr::new(4, 6, 0),
                WeaponTags::LAUNCHER | WeaponTags::EXPLOSIVE | WeaponTags::EXPLODES_ON_IMPACT,
            )
            .with_burst_radius(5)
            .with_magazine(1),
            WeaponData::new(SMG, "smg", DiceExpr::new(1, 8, 0), WeaponTags::FIREARM)
                .with_fire_modes(FireModes::SINGLE | FireModes::BURST | FireModes::AUTOMATIC)
                .with_magazine(30),
        ]
        .into_iter()
        .map(|weapon| (weapon.id, weapon))
        .collect();
        Self { catalog }
    }
}

impl WeaponOracle for TestWeapons {
    fn weapon(&self, id: WeaponId) -> Option<WeaponData> {
        self.catalog.get(&id).cloned()
    }
}

/// Records cues; reports an effect playing for a fixed number of polls.
#[derive(Debug, Default)]
pub struct TestEffects {
    busy_polls: AtomicU32,
    failing: bool,
    played: Mutex<Vec<EffectCue>>,
}

impl TestEffects {
    pub fn busy_for(polls: u32) -> Self {
        Self {
            busy_polls: AtomicU32::new(polls),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn played(&self) -> Vec<EffectCue> {
        self.played
            .lock()
            .map(|cues| cues.clone())
            .unwrap_or_default()
    }
}

impl PresentationSink for TestEffects {
    fn play(&self, cue: EffectCue) -> Result<(), PresentationError> {
        if self.failing {
            return Err(PresentationError("renderer offline".into()));
        }
        if let Ok(mut cues) = self.played.lock() {
            cues.push(cue);
        }
        Ok(())
    }

    fn is_effect_playing(&self) -> Result<bool, PresentationError> {
        if self.failing {
            return Err(PresentationError("renderer offline".into()));
        }
        let remaining = self.busy_polls.load(Ordering::SeqCst);
        if remaining == 0 {
            return Ok(false);
        }
        self.busy_polls.store(remaining - 1, Ordering::SeqCst);
        Ok(true)
    }
}

/// One of each oracle double, lent out as a [`CombatEnv`].
#[derive(Debug, Default)]
pub struct TestOracles {
    pub tiles: TestTiles,
    pub weapons: TestWeapons,
    pub sight: TestSight,
    pub pathing: TestPathing,
    pub effects: TestEffects,
    pub rng: ScriptedRng,
}

impl TestOracles {
    pub fn with_rolls(faces: impl IntoIterator<Item = u32>) -> Self {
        Self {
            rng: ScriptedRng::new(faces),
            ..Self::default()
        }
    }

    pub fn env(&self) -> CombatEnv<'_> {
        Env::new(
            Some(&self.tiles),
            Some(&self.weapons),
            Some(&self.sight),
            Some(&self.pathing),
            Some(&self.effects),
            Some(&self.rng),
        )
        .into_combat_env()
    }
}

/// Hostile NPC on team 1.
pub fn npc_at(id: EntityId, at: Position) -> Combatant {
    Combatant::new(id, format!("npc{}", id.0), TeamId(1), Controller::Npc, at)
}

/// Hostile NPC on team 2, hostile to both the player and team 1.
pub fn raider_at(id: EntityId, at: Position) -> Combatant {
    Combatant::new(id, format!("raider{}", id.0), TeamId(2), Controller::Npc, at)
}
