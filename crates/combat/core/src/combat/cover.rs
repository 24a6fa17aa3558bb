use strum::IntoEnumIterator;

use crate::env::{TileLayer, TileOracle};
use crate::state::Position;

/// Highest `cover_bonus` tag across the building, object and landscape
/// layers at `position`. Untagged tiles give 0 and cover never goes negative.
pub fn cover_bonus(tiles: &(impl TileOracle + ?Sized), position: Position) -> i32 {
    TileLayer::iter()
        .filter_map(|layer| tiles.tile(layer, position))
        .filter_map(|tile| tile.cover_bonus)
        .fold(0, i32::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::TileInfo;
    use crate::testing::TestTiles;

    #[test]
    fn untagged_tile_gives_no_cover() {
        let tiles = TestTiles::default();
        assert_eq!(cover_bonus(&tiles, Position::flat(2, 2)), 0);
    }

    #[test]
    fn best_layer_wins() {
        let at = Position::flat(2, 2);
        let tiles = TestTiles::default()
            .with_tile(TileLayer::Object, at, TileInfo::cover(2))
            .with_tile(TileLayer::Building, at, TileInfo::cover(4))
            .with_tile(TileLayer::Landscape, at, TileInfo::floor());
        assert_eq!(cover_bonus(&tiles, at), 4);
    }

    #[test]
    fn negative_tags_never_expose_the_defender() {
        let at = Position::flat(1, 1);
        let tiles = TestTiles::default().with_tile(TileLayer::Object, at, TileInfo::cover(-3));
        assert_eq!(cover_bonus(&tiles, at), 0);
    }
}
