use strum::{Display, EnumIter};

use crate::state::Position;

/// Map layers that can contribute cover or block movement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum TileLayer {
    Building,
    Object,
    Landscape,
}

/// What one layer holds at one position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TileInfo {
    pub passable: bool,
    /// `coverBonus` tag, if the tile carries one.
    pub cover_bonus: Option<i32>,
    /// Extra movement points to pass (e.g. opening a door).
    pub open_cost: u32,
}

impl TileInfo {
    pub const fn floor() -> Self {
        Self {
            passable: true,
            cover_bonus: None,
            open_cost: 0,
        }
    }

    pub const fn wall() -> Self {
        Self {
            passable: false,
            cover_bonus: None,
            open_cost: 0,
        }
    }

    pub const fn cover(bonus: i32) -> Self {
        Self {
            passable: true,
            cover_bonus: Some(bonus),
            open_cost: 0,
        }
    }
}

/// Ambient light category of the current map.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum AmbientLight {
    #[default]
    Bright,
    Dim,
    Dark,
}

/// Tile and cover catalog: read-only, per layer and per level.
pub trait TileOracle: Send + Sync {
    fn tile(&self, layer: TileLayer, position: Position) -> Option<TileInfo>;

    /// True if an active light source covers the position.
    fn is_lit(&self, position: Position) -> bool;

    fn ambient_light(&self) -> AmbientLight;

    /// Scavengeable loot lies at the position.
    fn has_loot(&self, _position: Position) -> bool {
        false
    }
}
