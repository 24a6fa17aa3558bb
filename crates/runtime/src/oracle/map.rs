//! Static tactical map served through the tile, sight and pathing oracles.
use std::collections::{HashMap, HashSet};

use combat_core::{
    AmbientLight, DropOption, PathStep, PathingOracle, Position, SightOracle, TileInfo, TileLayer,
    TileOracle,
};

/// A light source covering every tile within `radius` on its level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LightSource {
    pub at: Position,
    pub radius: u32,
}

/// 3D tile grid with per-layer tiles, lights, loot markers and ledges.
///
/// Unset tiles inside the bounds are open floor. Walls live on the building
/// layer and are the only thing that blocks sight; doors are passable
/// building tiles with an open cost.
#[derive(Clone, Debug)]
pub struct GridMap {
    width: u32,
    height: u32,
    levels: u32,
    ambient: AmbientLight,
    tiles: HashMap<(TileLayer, Position), TileInfo>,
    lights: Vec<LightSource>,
    loot: HashSet<Position>,
    drops: HashMap<Position, Vec<DropOption>>,
}

const NEIGHBOURS: [(i32, i32); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

impl GridMap {
    pub fn new(width: u32, height: u32, levels: u32) -> Self {
        Self {
            width,
            height,
            levels: levels.max(1),
            ambient: AmbientLight::default(),
            tiles: HashMap::new(),
            lights: Vec::new(),
            loot: HashSet::new(),
            drops: HashMap::new(),
        }
    }

    /// Open floor of the given size on a single level.
    pub fn open(width: u32, height: u32) -> Self {
        Self::new(width, height, 1)
    }

    pub fn with_ambient(mut self, ambient: AmbientLight) -> Self {
        self.ambient = ambient;
        self
    }

    pub fn set_tile(&mut self, layer: TileLayer, at: Position, info: TileInfo) {
        self.tiles.insert((layer, at), info);
    }

    pub fn add_wall(&mut self, at: Position) {
        self.set_tile(TileLayer::Building, at, TileInfo::wall());
    }

    pub fn add_door(&mut self, at: Position, open_cost: u32) {
        let door = TileInfo {
            open_cost,
            ..TileInfo::floor()
        };
        self.set_tile(TileLayer::Building, at, door);
    }

    /// Cover objects (crates, sandbags) sit on the object layer.
    pub fn add_cover(&mut self, at: Position, bonus: i32) {
        self.set_tile(TileLayer::Object, at, TileInfo::cover(bonus));
    }

    pub fn add_light(&mut self, at: Position, radius: u32) {
        self.lights.push(LightSource { at, radius });
    }

    pub fn add_loot(&mut self, at: Position) {
        self.loot.insert(at);
    }

    pub fn add_drop(&mut self, from: Position, option: DropOption) {
        self.drops.entry(from).or_default().push(option);
    }

    pub fn contains(&self, at: Position) -> bool {
        (0..self.width as i32).contains(&at.x)
            && (0..self.height as i32).contains(&at.y)
            && (0..self.levels as i32).contains(&at.z)
    }

    /// Inside the grid and passable on every layer.
    pub fn is_passable(&self, at: Position) -> bool {
        self.contains(at) && self.layers_at(at).all(|info| info.passable)
    }

    fn blocks_sight(&self, at: Position) -> bool {
        self.tiles
            .get(&(TileLayer::Building, at))
            .is_some_and(|info| !info.passable)
    }

    fn open_cost(&self, at: Position) -> u32 {
        self.layers_at(at).map(|info| info.open_cost).sum()
    }

    fn layers_at(&self, at: Position) -> impl Iterator<Item = &TileInfo> + '_ {
        [TileLayer::Building, TileLayer::Object, TileLayer::Landscape]
            .into_iter()
            .filter_map(move |layer| self.tiles.get(&(layer, at)))
    }
}

/// Ordering key for greedy stepping: king-move distance first, then
/// Manhattan distance so straight lines beat zig-zags.
fn closeness(from: Position, to: Position) -> (u32, u32) {
    let dx = (from.x - to.x).unsigned_abs();
    let dy = (from.y - to.y).unsigned_abs();
    (dx.max(dy), dx + dy)
}

/// Tiles strictly between `from` and `to`, Bresenham on the plane with the
/// level interpolated along the line.
fn line_between(from: Position, to: Position) -> Vec<Position> {
    let dx = (to.x - from.x).abs();
    let dy = -(to.y - from.y).abs();
    let sx = if from.x < to.x { 1 } else { -1 };
    let sy = if from.y < to.y { 1 } else { -1 };
    let steps = dx.max(-dy);

    let mut cells = Vec::new();
    let (mut x, mut y) = (from.x, from.y);
    let mut err = dx + dy;
    let mut walked = 0;
    while (x, y) != (to.x, to.y) {
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
        walked += 1;
        if (x, y) == (to.x, to.y) {
            break;
        }
        let z = from.z + (to.z - from.z) * walked / steps.max(1);
        cells.push(Position::new(x, y, z));
    }
    cells
}

impl TileOracle for GridMap {
    fn tile(&self, layer: TileLayer, position: Position) -> Option<TileInfo> {
        if !self.contains(position) {
            return None;
        }
        self.tiles.get(&(layer, position)).copied()
    }

    fn is_lit(&self, position: Position) -> bool {
        self.lights.iter().any(|light| {
            let reach = i64::from(light.radius);
            light.at.z == position.z && light.at.distance_squared(position) <= reach * reach
        })
    }

    fn ambient_light(&self) -> AmbientLight {
        self.ambient
    }

    fn has_loot(&self, position: Position) -> bool {
        self.loot.contains(&position)
    }
}

impl SightOracle for GridMap {
    fn has_line_of_sight(&self, from: Position, to: Position) -> bool {
        if !self.contains(from) || !self.contains(to) {
            return false;
        }
        line_between(from, to)
            .into_iter()
            .all(|cell| !self.blocks_sight(cell))
    }
}

impl PathingOracle for GridMap {
    fn next_step(&self, from: Position, to: Position, occupied: &[Position]) -> Option<PathStep> {
        // Other levels are only reachable by dropping; walk toward the spot
        // above or below the destination.
        let goal = Position::new(to.x, to.y, from.z);
        let here = closeness(from, goal);
        self.neighbours(from)
            .into_iter()
            .filter(|step| !occupied.contains(step))
            .filter(|step| closeness(*step, goal) < here)
            .min_by_key(|step| (closeness(*step, goal), *step))
            .map(|position| PathStep {
                position,
                extra_cost: self.open_cost(position),
            })
    }

    fn neighbours(&self, from: Position) -> Vec<Position> {
        NEIGHBOURS
            .iter()
            .map(|(dx, dy)| Position::new(from.x + dx, from.y + dy, from.z))
            .filter(|tile| self.is_passable(*tile))
            .collect()
    }

    fn drop_options(&self, from: Position) -> Vec<DropOption> {
        self.drops.get(&from).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walls_block_sight_but_doors_do_not() {
        let mut map = GridMap::open(10, 10);
        map.add_wall(Position::flat(3, 0));
        map.add_door(Position::flat(3, 2), 1);

        assert!(!map.has_line_of_sight(Position::flat(0, 0), Position::flat(6, 0)));
        assert!(map.has_line_of_sight(Position::flat(0, 2), Position::flat(6, 2)));
        assert!(map.has_line_of_sight(Position::flat(0, 0), Position::flat(0, 9)));
        assert!(!map.has_line_of_sight(Position::flat(0, 0), Position::flat(12, 0)));
    }

    #[test]
    fn adjacent_tiles_always_see_each_other() {
        let mut map = GridMap::open(4, 4);
        map.add_wall(Position::flat(1, 0));
        assert!(map.has_line_of_sight(Position::flat(0, 0), Position::flat(1, 1)));
    }

    #[test]
    fn greedy_step_goes_around_occupants_and_pays_for_doors() {
        let mut map = GridMap::open(10, 10);
        map.add_door(Position::flat(1, 0), 2);

        let step = map
            .next_step(Position::flat(0, 0), Position::flat(5, 0), &[])
            .unwrap();
        assert_eq!(step.position, Position::flat(1, 0));
        assert_eq!(step.cost(), 3);

        let step = map
            .next_step(
                Position::flat(0, 0),
                Position::flat(5, 0),
                &[Position::flat(1, 0)],
            )
            .unwrap();
        assert_eq!(step.position, Position::flat(1, 1));
    }

    #[test]
    fn walled_in_mover_has_no_step() {
        let mut map = GridMap::open(3, 1);
        map.add_wall(Position::flat(1, 0));
        assert_eq!(
            map.next_step(Position::flat(0, 0), Position::flat(2, 0), &[]),
            None
        );
        assert!(map.neighbours(Position::flat(0, 0)).is_empty());
    }

    #[test]
    fn lights_cover_a_radius_on_their_level() {
        let mut map = GridMap::new(10, 10, 2).with_ambient(AmbientLight::Dark);
        map.add_light(Position::flat(5, 5), 2);

        assert!(map.is_lit(Position::flat(6, 6)));
        assert!(!map.is_lit(Position::flat(8, 5)));
        assert!(!map.is_lit(Position::new(5, 5, 1)));
        assert_eq!(map.ambient_light(), AmbientLight::Dark);
    }

    #[test]
    fn cover_sits_on_the_object_layer() {
        let mut map = GridMap::open(5, 5);
        map.add_cover(Position::flat(2, 2), 3);

        assert_eq!(
            map.tile(TileLayer::Object, Position::flat(2, 2)),
            Some(TileInfo::cover(3))
        );
        assert_eq!(map.tile(TileLayer::Building, Position::flat(2, 2)), None);
        assert!(map.is_passable(Position::flat(2, 2)));
    }
}
