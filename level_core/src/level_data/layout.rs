//! Plain-text level layouts, one whitespace-separated glyph per cell.
//!
//! ```text
//! E . # .
//! . g # k
//! _ . s X
//! ```

use bevy::prelude::UVec2;

use super::{LevelData, LevelGrid, PlacementReport};
use crate::door::DoorKind;
use crate::error::{BuildResult, LevelBuildError};
use crate::geometry::BoardGeometry;
use crate::tile::{DataTile, TileSource};
use crate::tile_type::TileType;

const NO_TILE: char = '_';

/// The cell a glyph stands for: `Some(None)` is a gap in the board, `None` an unknown glyph.
pub fn glyph_tile_type(glyph: char) -> Option<Option<TileType>> {
    let tile_type = match glyph {
        NO_TILE => return Some(None),
        '.' => TileType::Blank,
        '#' => TileType::Wall,
        'E' => TileType::Entrance,
        'X' => TileType::Exit,
        'e' => TileType::Enemy,
        's' => TileType::ScrambleEnemy,
        'S' => TileType::SuperEnemy,
        'B' => TileType::Boss,
        'g' => TileType::Gold,
        'k' => TileType::Key,
        'c' => TileType::Compass,
        'n' => TileType::Sniper,
        'm' => TileType::Emp,
        'a' => TileType::Ammo,
        '!' => TileType::Alert,
        'u' => TileType::Upgrade,
        'w' => TileType::Weapon,
        '$' => TileType::Shop,
        _ => return None,
    };
    Some(Some(tile_type))
}

pub fn tile_type_glyph(tile_type: Option<TileType>) -> char {
    match tile_type {
        None => NO_TILE,
        Some(TileType::Blank) => '.',
        Some(TileType::Wall) => '#',
        Some(TileType::Entrance) => 'E',
        Some(TileType::Exit) => 'X',
        Some(TileType::Enemy) => 'e',
        Some(TileType::ScrambleEnemy) => 's',
        Some(TileType::SuperEnemy) => 'S',
        Some(TileType::Boss) => 'B',
        Some(TileType::Gold) => 'g',
        Some(TileType::Key) => 'k',
        Some(TileType::Compass) => 'c',
        Some(TileType::Sniper) => 'n',
        Some(TileType::Emp) => 'm',
        Some(TileType::Ammo) => 'a',
        Some(TileType::Alert) => '!',
        Some(TileType::Upgrade) => 'u',
        Some(TileType::Weapon) => 'w',
        Some(TileType::Shop) => '$',
    }
}

impl LevelData {
    /// Parses a text layout. Blank lines are ignored, every other line is a row. Exactly one
    /// `E` and one `X` are required.
    pub fn from_layout(layout: &str) -> BuildResult<Self> {
        let mut grid: LevelGrid = Vec::new();
        let mut entrance = None;
        let mut exit = None;

        for (row, line) in layout
            .lines()
            .filter(|line| !line.trim().is_empty())
            .enumerate()
        {
            let mut cells = Vec::new();
            for (column, token) in line.split_whitespace().enumerate() {
                let mut chars = token.chars();
                let cell = match (chars.next(), chars.next()) {
                    (Some(glyph), None) => glyph_tile_type(glyph),
                    _ => None,
                }
                .ok_or_else(|| LevelBuildError::UnknownGlyph {
                    glyph: token.to_owned(),
                    row,
                    column,
                })?;

                let pt = UVec2::new(column as u32, row as u32);
                let door = match cell {
                    Some(TileType::Entrance) => Some((&mut entrance, DoorKind::Entrance)),
                    Some(TileType::Exit) => Some((&mut exit, DoorKind::Exit)),
                    _ => None,
                };
                if let Some((slot, kind)) = door {
                    if slot.replace(pt).is_some() {
                        return Err(LevelBuildError::DuplicateDoor(kind));
                    }
                }

                cells.push(cell.map(|tile_type| {
                    DataTile::new(
                        tile_type,
                        TileSource {
                            map_point: pt.as_ivec2(),
                            gid: None,
                        },
                    )
                }));
            }
            if let Some(expected) = grid.first().map(Vec::len) {
                if cells.len() != expected {
                    return Err(LevelBuildError::RaggedLayout {
                        row,
                        expected,
                        actual: cells.len(),
                    });
                }
            }
            grid.push(cells);
        }

        let entrance = entrance.ok_or(LevelBuildError::MissingDoor(DoorKind::Entrance))?;
        let exit = exit.ok_or(LevelBuildError::MissingDoor(DoorKind::Exit))?;
        Ok(LevelData::from_grid(
            grid,
            BoardGeometry::default(),
            entrance,
            exit,
            PlacementReport::default(),
        ))
    }

    /// Renders the authored types back into layout text.
    pub fn to_layout(&self) -> String {
        self.grid
            .iter()
            .map(|row| {
                row.iter()
                    .map(|tile| tile_type_glyph(tile.as_ref().map(DataTile::tile_type)).to_string())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
