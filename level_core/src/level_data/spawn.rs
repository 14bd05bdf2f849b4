//! Randomized spawn regions from the authored object layers.

use bevy::prelude::{UVec2, Vec2};
use getset::CopyGetters;
use rand::seq::SliceRandom;
use rand::Rng;

use super::{board_points, tile_type_at, LevelGrid};
use crate::authored::AuthoredMap;
use crate::error::BuildResult;
use crate::geometry::BoardGeometry;
use crate::pickup::PickupRotation;
use crate::tile_type::TileType;

/// The object layers that request randomized tiles, in the order they are placed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SpawnKind {
    Key,
    ScrambleEnemy,
    Enemy,
    Pickup,
}

/// How a placement pass went. A shortfall is not an error, just fewer tiles than authored.
#[derive(Clone, Copy, CopyGetters, Debug, Default, Eq, PartialEq)]
#[getset(get_copy = "pub")]
pub struct PlacementReport {
    attempts: u32,
    requested: usize,
    placed: usize,
}

/// A region outline and the tile types to scatter inside it.
#[derive(Clone, Debug)]
pub(super) struct SpawnRegion {
    outline: Vec<Vec2>,
    tile_types: Vec<TileType>,
}

impl SpawnKind {
    pub const ALL: [SpawnKind; 4] = [
        SpawnKind::Key,
        SpawnKind::ScrambleEnemy,
        SpawnKind::Enemy,
        SpawnKind::Pickup,
    ];

    pub fn layer_name(&self) -> &'static str {
        match self {
            SpawnKind::Key => "RandomKey",
            SpawnKind::ScrambleEnemy => "RandomScrambleEnemy",
            SpawnKind::Enemy => "RandomEnemy",
            SpawnKind::Pickup => "RandomPickup",
        }
    }

    fn tile_type(
        &self,
        level_key: &str,
        rotation: &mut PickupRotation,
    ) -> BuildResult<TileType> {
        match self {
            SpawnKind::Key => Ok(TileType::Key),
            SpawnKind::ScrambleEnemy => Ok(TileType::ScrambleEnemy),
            SpawnKind::Enemy => Ok(TileType::Enemy),
            SpawnKind::Pickup => rotation.next_for(level_key),
        }
    }
}

impl PlacementReport {
    pub fn new(attempts: u32, requested: usize, placed: usize) -> Self {
        PlacementReport {
            attempts,
            requested,
            placed,
        }
    }

    pub fn shortfall(&self) -> usize {
        self.requested.saturating_sub(self.placed)
    }

    pub fn is_complete(&self) -> bool {
        self.shortfall() == 0
    }
}

/// Even-odd containment of `pt` in the closed polygon `outline`.
pub fn polygon_contains(outline: &[Vec2], pt: Vec2) -> bool {
    let mut inside = false;
    for (a, b) in outline.iter().zip(outline.iter().cycle().skip(1)) {
        if (a.y > pt.y) != (b.y > pt.y) && pt.x < (b.x - a.x) * (pt.y - a.y) / (b.y - a.y) + a.x
        {
            inside = !inside;
        }
    }
    inside
}

/// Reads every spawn layer. Each region asks for one tile per placeholder object whose
/// centre falls inside it. Pickup types are drawn from the rotation here, once, so that
/// placement retries see the same types.
pub(super) fn collect_regions(
    map: &AuthoredMap,
    level_key: &str,
    rotation: &mut PickupRotation,
) -> BuildResult<Vec<SpawnRegion>> {
    let mut regions = Vec::new();
    for kind in SpawnKind::ALL {
        let Some(layer) = map.object_layer(kind.layer_name()) else {
            continue;
        };
        let offset = layer.offset();
        let placeholders: Vec<Vec2> = layer
            .objects
            .iter()
            .filter(|object| object.is_placeholder())
            .map(|object| object.placeholder_center() + offset)
            .collect();
        let mut claimed = vec![false; placeholders.len()];

        for object in layer.objects.iter().filter(|object| !object.is_placeholder()) {
            let outline: Vec<Vec2> = object
                .outline()
                .into_iter()
                .map(|pt| pt + offset)
                .collect();
            let mut count = 0;
            for (center, claimed) in placeholders.iter().zip(claimed.iter_mut()) {
                if !*claimed && polygon_contains(&outline, *center) {
                    *claimed = true;
                    count += 1;
                }
            }
            let tile_types = (0..count)
                .map(|_| kind.tile_type(level_key, rotation))
                .collect::<BuildResult<Vec<_>>>()?;
            regions.push(SpawnRegion {
                outline,
                tile_types,
            });
        }

        let stray = claimed.iter().filter(|claimed| !**claimed).count();
        if stray > 0 {
            log::warn!(
                "{stray} placeholder(s) in [{}] lie outside every region",
                kind.layer_name()
            );
        }
    }
    Ok(regions)
}

/// Places every region's tiles, retrying the whole pass up to `attempts` times until
/// nothing is left over. The last attempt is kept if none succeeds.
pub(super) fn place_regions<R: Rng + ?Sized>(
    grid: &mut LevelGrid,
    geometry: &BoardGeometry,
    regions: &[SpawnRegion],
    attempts: u32,
    rng: &mut R,
) -> PlacementReport {
    let requested: usize = regions.iter().map(|region| region.tile_types.len()).sum();
    if requested == 0 {
        return PlacementReport::default();
    }
    let attempts = attempts.max(1);
    let mut attempt = 0;
    let (placed_grid, placed) = loop {
        attempt += 1;
        let mut candidate = grid.clone();
        let placed = place_once(&mut candidate, geometry, regions, rng);
        log::debug!("placement attempt {attempt}/{attempts}: {placed} of {requested} tiles");
        if placed == requested || attempt >= attempts {
            break (candidate, placed);
        }
    };
    if placed < requested {
        log::warn!(
            "accepting partial placement after {attempt} attempts: {placed} of {requested} tiles"
        );
    }
    *grid = placed_grid;
    PlacementReport::new(attempt, requested, placed)
}

fn place_once<R: Rng + ?Sized>(
    grid: &mut LevelGrid,
    geometry: &BoardGeometry,
    regions: &[SpawnRegion],
    rng: &mut R,
) -> usize {
    let height = grid.len() as u32;
    let width = grid.first().map_or(0, |row| row.len() as u32);
    let mut placed = 0;
    for region in regions {
        // Cells filled by an earlier region are no longer blank
        let mut candidates: Vec<UVec2> = board_points(width, height)
            .filter(|pt| tile_type_at(grid, *pt) == Some(TileType::Blank))
            .filter(|pt| polygon_contains(&region.outline, geometry.board_to_world(*pt)))
            .collect();
        candidates.shuffle(rng);
        for (pt, tile_type) in candidates.into_iter().zip(region.tile_types.iter()) {
            if let Some(tile) = grid[pt.y as usize][pt.x as usize].as_mut() {
                tile.set_tile_type(*tile_type);
                placed += 1;
            }
        }
    }
    placed
}

#[cfg(test)]
mod test {
    use test_log::test;

    use super::*;

    #[test]
    fn even_odd_containment() {
        let square = [
            Vec2::new(0.0, 0.0),
            Vec2::new(20.0, 0.0),
            Vec2::new(20.0, 10.0),
            Vec2::new(0.0, 10.0),
        ];
        assert!(polygon_contains(&square, Vec2::new(5.0, 5.0)));
        assert!(polygon_contains(&square, Vec2::new(15.0, 5.0)));
        assert!(!polygon_contains(&square, Vec2::new(25.0, 5.0)));
        assert!(!polygon_contains(&square, Vec2::new(5.0, -1.0)));
        assert!(!polygon_contains(&[], Vec2::ZERO));

        let triangle = [
            Vec2::new(0.0, 0.0),
            Vec2::new(30.0, 0.0),
            Vec2::new(0.0, 30.0),
        ];
        assert!(polygon_contains(&triangle, Vec2::new(5.0, 5.0)));
        assert!(!polygon_contains(&triangle, Vec2::new(25.0, 25.0)));
    }

    #[test]
    fn report_shortfall() {
        let report = PlacementReport::new(3, 5, 3);
        assert_eq!(report.shortfall(), 2);
        assert!(!report.is_complete());
        assert!(PlacementReport::default().is_complete());
    }
}
