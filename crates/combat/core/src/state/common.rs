use std::fmt;

/// Unique identifier for any combatant tracked by the world registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityId(pub u32);

impl EntityId {
    /// Reserved identifier for the controllable player character.
    pub const PLAYER: Self = Self(0);

    /// Returns true if this entity represents the player.
    #[inline]
    pub const fn is_player(self) -> bool {
        self.0 == Self::PLAYER.0
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::PLAYER
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Allegiance group. Combatants on different teams are hostile to each other.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TeamId(pub u16);

impl TeamId {
    /// Team shared by the player and their companions.
    pub const PLAYER: Self = Self(0);
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "team{}", self.0)
    }
}

/// Discrete tile position. `z` is the map level; one level equals one tile of fall height.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Position {
    pub const ORIGIN: Self = Self { x: 0, y: 0, z: 0 };

    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Same-level position, the common case for flat maps.
    pub const fn flat(x: i32, y: i32) -> Self {
        Self { x, y, z: 0 }
    }

    /// Squared Euclidean distance in tiles.
    ///
    /// Range bands compare against squared thresholds so no floating point is
    /// involved in hit resolution.
    pub fn distance_squared(self, other: Position) -> i64 {
        let dx = (self.x - other.x) as i64;
        let dy = (self.y - other.y) as i64;
        let dz = (self.z - other.z) as i64;
        dx * dx + dy * dy + dz * dz
    }

    /// Euclidean distance in tenths of a tile, rounded.
    pub fn distance_tenths(self, other: Position) -> i32 {
        ((self.distance_squared(other) as f64).sqrt() * 10.0).round() as i32
    }

    /// Manhattan distance across all three axes.
    pub fn manhattan(self, other: Position) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y) + self.z.abs_diff(other.z)
    }

    /// Absolute level difference.
    pub fn z_gap(self, other: Position) -> u32 {
        self.z.abs_diff(other.z)
    }

    /// Returns true if `other` lies within `reach` tiles (Euclidean).
    pub fn within(self, other: Position, reach: f32) -> bool {
        let reach = reach as f64;
        (self.distance_squared(other) as f64) <= reach * reach
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Encounter round counter. Starts at 1 when an encounter begins.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Round(pub u32);

impl Round {
    pub const ZERO: Self = Self(0);

    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// Rounds elapsed since `earlier` (saturating).
    pub fn since(self, earlier: Round) -> u32 {
        self.0.saturating_sub(earlier.0)
    }
}

impl fmt::Display for Round {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distances_cover_all_three_axes() {
        let a = Position::new(0, 0, 0);
        let b = Position::new(3, 4, 0);

        assert_eq!(a.distance_squared(b), 25);
        assert_eq!(a.distance_tenths(b), 50);
        assert_eq!(a.manhattan(b), 7);
        assert_eq!(a.manhattan(Position::new(1, 1, 2)), 4);
        assert_eq!(a.z_gap(Position::new(0, 0, -3)), 3);
    }

    #[test]
    fn diagonal_is_within_melee_reach() {
        let a = Position::flat(5, 5);
        assert!(a.within(Position::flat(6, 6), 1.8));
        assert!(!a.within(Position::flat(7, 5), 1.8));
    }
}
