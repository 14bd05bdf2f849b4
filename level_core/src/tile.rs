use bevy::prelude::{IVec2, UVec2};
use getset::CopyGetters;
use serde::{Deserialize, Serialize};

use crate::tile_type::TileType;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Face {
    Front,
    Back,
}

/// Where a tile came from in the authored data. Generated tiles have no gid.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct TileSource {
    pub map_point: IVec2,
    pub gid: Option<u32>,
}

/// Static description of a board cell, fixed once the level data is built.
#[derive(Clone, Copy, CopyGetters, Debug, PartialEq)]
#[getset(get_copy = "pub")]
pub struct DataTile {
    tile_type: TileType,
    source: TileSource,
    /// False only for walls boxed in by other walls on all sides.
    is_reachable: bool,
}

/// A board tile during play: the data tile plus reveal, consumption and scramble state.
#[derive(Clone, CopyGetters, Debug, PartialEq)]
#[getset(get_copy = "pub")]
pub struct Tile {
    data: DataTile,
    position: UVec2,
    is_revealed: bool,
    /// True for authored blanks, and for any tile whose content has been used up.
    is_currently_blank: bool,
    is_scrambled: bool,
    is_highlighted: bool,
}

impl DataTile {
    pub fn new(tile_type: TileType, source: TileSource) -> Self {
        DataTile {
            tile_type,
            source,
            is_reachable: true,
        }
    }

    pub fn is_wall(&self) -> bool {
        self.tile_type == TileType::Wall
    }

    pub(crate) fn set_tile_type(&mut self, tile_type: TileType) {
        self.tile_type = tile_type;
    }

    pub(crate) fn set_reachable(&mut self, is_reachable: bool) {
        self.is_reachable = is_reachable;
    }
}

impl Tile {
    pub fn new(data: DataTile, position: UVec2) -> Self {
        Tile {
            data,
            position,
            is_revealed: false,
            is_currently_blank: data.tile_type() == TileType::Blank,
            is_scrambled: false,
            is_highlighted: false,
        }
    }

    pub fn tile_type(&self) -> TileType {
        self.data.tile_type()
    }

    pub fn is_reachable(&self) -> bool {
        self.data.is_reachable()
    }

    pub fn is_wall(&self) -> bool {
        self.data.is_wall()
    }

    /// Whether the player may path through this tile. Door cells are handled by the level.
    pub fn is_walkable(&self) -> bool {
        self.is_revealed && self.is_currently_blank && !self.is_wall()
    }

    /// A live scramble source: an unconsumed SCRAMBLE_ENEMY.
    pub fn emits_scramble(&self) -> bool {
        self.tile_type() == TileType::ScrambleEnemy && !self.is_currently_blank
    }

    /// Starts a reveal. Returns false without changing anything if the tile is already
    /// revealed, so a second call never produces a second flip.
    pub fn flip_to_front(&mut self) -> bool {
        !std::mem::replace(&mut self.is_revealed, true)
    }

    /// Hides the tile again. Only level transitions do this.
    pub fn flip_to_back(&mut self) -> bool {
        std::mem::replace(&mut self.is_revealed, false)
    }

    /// Marks the tile's one-time content as used. Returns false if it already was blank.
    pub fn consume(&mut self) -> bool {
        !std::mem::replace(&mut self.is_currently_blank, true)
    }

    pub(crate) fn set_scrambled(&mut self, scrambled: bool) -> bool {
        std::mem::replace(&mut self.is_scrambled, scrambled) != scrambled
    }

    pub(crate) fn set_highlighted(&mut self, highlighted: bool) -> bool {
        std::mem::replace(&mut self.is_highlighted, highlighted) != highlighted
    }
}

#[cfg(test)]
mod test {
    use test_log::test;

    use super::*;

    fn tile(tile_type: TileType) -> Tile {
        Tile::new(DataTile::new(tile_type, TileSource::default()), UVec2::ZERO)
    }

    #[test]
    fn only_authored_blanks_start_blank() {
        assert!(tile(TileType::Blank).is_currently_blank());
        assert!(!tile(TileType::Gold).is_currently_blank());
        assert!(!tile(TileType::Wall).is_currently_blank());
    }

    #[test]
    fn reveal_is_one_way_until_flipped_back() {
        let mut blank = tile(TileType::Blank);
        assert!(!blank.is_walkable());
        assert!(blank.flip_to_front());
        assert!(!blank.flip_to_front());
        assert!(blank.is_revealed());
        assert!(blank.is_walkable());
        assert!(blank.flip_to_back());
        assert!(!blank.flip_to_back());
        assert!(!blank.is_revealed());
    }

    #[test]
    fn consumed_content_becomes_walkable() {
        let mut enemy = tile(TileType::ScrambleEnemy);
        enemy.flip_to_front();
        assert!(enemy.emits_scramble());
        assert!(!enemy.is_walkable());
        assert!(enemy.consume());
        assert!(!enemy.consume());
        assert!(!enemy.emits_scramble());
        assert!(enemy.is_walkable());
        assert_eq!(enemy.tile_type(), TileType::ScrambleEnemy);
    }

    #[test]
    fn walls_are_never_walkable() {
        let mut wall = tile(TileType::Wall);
        wall.flip_to_front();
        wall.consume();
        assert!(!wall.is_walkable());
    }
}
