//! Conversions between board, authored-map and world coordinates.

use bevy::prelude::{IVec2, UVec2, Vec2};
use getset::CopyGetters;

/// Placement of a board inside the authored canvas and the world.
///
/// * `origin` is the `(left, top)` world offset of the level.
/// * `map_offset` is the `(leftOffset, topOffset)` of the playable footprint inside the
///   authored map, in cells.
#[derive(Clone, Copy, CopyGetters, Debug, PartialEq)]
#[getset(get_copy = "pub")]
pub struct BoardGeometry {
    origin: Vec2,
    tile_size: Vec2,
    map_offset: IVec2,
}

impl BoardGeometry {
    pub fn new(origin: Vec2, tile_size: Vec2, map_offset: IVec2) -> Self {
        BoardGeometry {
            origin,
            tile_size,
            map_offset,
        }
    }

    /// Geometry for a footprint starting at map cell `map_offset`. The origin is chosen so
    /// that [`board_to_world`](Self::board_to_world) lands on the pixel centre of the authored
    /// cell, shifted by the layer's pixel offset.
    pub fn from_footprint(map_offset: IVec2, tile_size: Vec2, layer_offset: Vec2) -> Self {
        let origin = layer_offset + map_offset.as_vec2() * tile_size - tile_size / 2.0;
        BoardGeometry::new(origin, tile_size, map_offset)
    }

    pub fn board_to_world(&self, pt: UVec2) -> Vec2 {
        self.origin + pt.as_vec2() * self.tile_size + self.tile_size
    }

    /// Nearest board position to a world point, or `None` if it falls left of or above the
    /// board.
    pub fn world_to_board(&self, world: Vec2) -> Option<UVec2> {
        let cell = ((world - self.origin - self.tile_size) / self.tile_size).round();
        (cell.x >= 0.0 && cell.y >= 0.0).then(|| cell.as_uvec2())
    }

    pub fn map_to_board(&self, map_pt: IVec2) -> IVec2 {
        map_pt - self.map_offset
    }

    pub fn board_to_map(&self, board_pt: IVec2) -> IVec2 {
        board_pt + self.map_offset
    }
}

impl Default for BoardGeometry {
    fn default() -> Self {
        BoardGeometry::new(Vec2::ZERO, Vec2::splat(32.0), IVec2::ZERO)
    }
}
