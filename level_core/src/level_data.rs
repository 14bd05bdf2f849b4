//! Static level content: which tile sits on which board cell, where the doors are, and which
//! walls are boxed in.

mod layout;
mod spawn;

use bevy::prelude::{IVec2, UVec2, Vec2};
use getset::{CopyGetters, Getters};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::authored::{
    AuthoredMap, TileCatalog, TileLayer, DECORATION_LAYER, GROUND_LAYER, OVERLAY_LAYER,
};
use crate::common::GridPoints;
use crate::configuration::LevelConfiguration;
use crate::door::DoorKind;
use crate::error::{BuildResult, Edge, LevelBuildError};
use crate::geometry::BoardGeometry;
use crate::pickup::PickupRotation;
use crate::tile::{DataTile, TileSource};
use crate::tile_type::TileType;

pub use layout::{glyph_tile_type, tile_type_glyph};
pub use spawn::{polygon_contains, PlacementReport, SpawnKind};

/// Rows of optional tiles, indexed `[y][x]`. `None` cells are outside the playable shape.
pub type LevelGrid = Vec<Vec<Option<DataTile>>>;

#[derive(Clone, CopyGetters, Debug, Getters)]
pub struct LevelData {
    #[getset(get_copy = "pub")]
    width: u32,
    #[getset(get_copy = "pub")]
    height: u32,
    #[getset(get = "pub")]
    grid: LevelGrid,
    #[getset(get_copy = "pub")]
    geometry: BoardGeometry,
    #[getset(get_copy = "pub")]
    entrance: UVec2,
    #[getset(get_copy = "pub")]
    exit: UVec2,
    #[getset(get = "pub")]
    placement: PlacementReport,
}

/// Input for a generated rectangular level with no authored map behind it.
#[derive(Clone, Debug, Default)]
pub struct LevelComposition {
    pub width: u32,
    pub height: u32,
    pub entrance: UVec2,
    pub exit: UVec2,
    /// Tiles placed before anything random.
    pub fixed: Vec<(UVec2, TileType)>,
    pub enemy_count: usize,
    pub gold_count: usize,
    pub key: bool,
}

impl LevelComposition {
    pub fn new(width: u32, height: u32, entrance: UVec2, exit: UVec2) -> Self {
        LevelComposition {
            width,
            height,
            entrance,
            exit,
            ..Default::default()
        }
    }

    pub fn with_tile(mut self, pt: UVec2, tile_type: TileType) -> Self {
        self.fixed.push((pt, tile_type));
        self
    }

    pub fn with_enemies(mut self, enemy_count: usize) -> Self {
        self.enemy_count = enemy_count;
        self
    }

    pub fn with_gold(mut self, gold_count: usize) -> Self {
        self.gold_count = gold_count;
        self
    }

    pub fn with_key(mut self) -> Self {
        self.key = true;
        self
    }
}

impl LevelData {
    /// Builds a level from an authored map.
    ///
    /// The playable footprint is the bounding box of the ground layer. Overlay tiles set
    /// cell types, decoration markers place the doors, and spawn layers scatter keys,
    /// enemies and pickups over blank cells. Pickups for `"RandomPickup"` regions come from
    /// `rotation` under `level_key`.
    pub fn from_authored<R: Rng + ?Sized>(
        map: &AuthoredMap,
        level_key: &str,
        rotation: &mut PickupRotation,
        config: &LevelConfiguration,
        rng: &mut R,
    ) -> BuildResult<Self> {
        let ground = map.required_tile_layer(GROUND_LAYER)?;
        let (min, max) = ground_footprint(ground)?;
        let width = (max.x - min.x + 1) as u32;
        let height = (max.y - min.y + 1) as u32;
        let tile_size = map.tile_size(Vec2::new(
            config.tile_width as f32,
            config.tile_height as f32,
        ));
        let geometry = BoardGeometry::from_footprint(min, tile_size, ground.offset());
        let catalog = map.catalog();

        let overlay = map.tile_layer(OVERLAY_LAYER);
        if overlay.is_none() {
            log::debug!("map has no [{OVERLAY_LAYER}] layer, every ground cell is blank");
        }
        let mut grid: LevelGrid = (0..height)
            .map(|y| {
                (0..width)
                    .map(|x| {
                        let map_point = geometry.board_to_map(IVec2::new(x as i32, y as i32));
                        authored_cell(ground, overlay, &catalog, map_point)
                    })
                    .collect()
            })
            .collect();

        let decorations = map.required_tile_layer(DECORATION_LAYER)?;
        let entrance = place_door(
            &mut grid,
            decorations,
            &catalog,
            &geometry,
            DoorKind::Entrance,
        )?;
        let exit = place_door(&mut grid, decorations, &catalog, &geometry, DoorKind::Exit)?;
        if entrance == exit {
            return Err(LevelBuildError::DuplicateDoor(DoorKind::Exit));
        }

        let regions = spawn::collect_regions(map, level_key, rotation)?;
        let placement = spawn::place_regions(
            &mut grid,
            &geometry,
            &regions,
            config.placement_attempts,
            rng,
        );

        Ok(LevelData::from_grid(grid, geometry, entrance, exit, placement))
    }

    /// Builds a rectangular level with the doors and fixed tiles given, then scatters the
    /// requested enemies, gold and key over the remaining blank cells.
    pub fn compose<R: Rng + ?Sized>(
        composition: &LevelComposition,
        rng: &mut R,
    ) -> BuildResult<Self> {
        let LevelComposition {
            width,
            height,
            entrance,
            exit,
            ..
        } = *composition;
        let in_bounds = |pt: UVec2| pt.x < width && pt.y < height;
        for pt in [entrance, exit]
            .into_iter()
            .chain(composition.fixed.iter().map(|(pt, _)| *pt))
        {
            if !in_bounds(pt) {
                return Err(LevelBuildError::PointOutOfBounds(pt));
            }
        }
        if entrance == exit {
            return Err(LevelBuildError::DuplicateDoor(DoorKind::Exit));
        }

        let fixed_non_blank = composition
            .fixed
            .iter()
            .filter(|(pt, tile_type)| {
                *tile_type != TileType::Blank && *pt != entrance && *pt != exit
            })
            .count();
        let random_count =
            composition.enemy_count + composition.gold_count + usize::from(composition.key);
        let required = random_count + fixed_non_blank + 2;
        let available = width as usize * height as usize;
        if required > available {
            return Err(LevelBuildError::CompositionOverflow {
                required,
                available,
            });
        }

        let mut grid: LevelGrid = (0..height)
            .map(|y| {
                (0..width)
                    .map(|x| {
                        let source = TileSource {
                            map_point: IVec2::new(x as i32, y as i32),
                            gid: None,
                        };
                        Some(DataTile::new(TileType::Blank, source))
                    })
                    .collect()
            })
            .collect();
        for (pt, tile_type) in composition.fixed.iter() {
            if tile_type.is_door() || *pt == entrance || *pt == exit {
                log::warn!("fixed [{tile_type}] at {pt} conflicts with a door, skipping");
                continue;
            }
            set_tile_type(&mut grid, *pt, *tile_type);
        }
        set_tile_type(&mut grid, entrance, TileType::Entrance);
        set_tile_type(&mut grid, exit, TileType::Exit);

        let mut free: Vec<UVec2> = board_points(width, height)
            .filter(|pt| tile_type_at(&grid, *pt) == Some(TileType::Blank))
            .collect();
        free.shuffle(rng);
        let contents = std::iter::repeat(TileType::Enemy)
            .take(composition.enemy_count)
            .chain(std::iter::repeat(TileType::Gold).take(composition.gold_count))
            .chain(composition.key.then_some(TileType::Key));
        let mut placed = 0;
        for (pt, tile_type) in free.into_iter().zip(contents) {
            set_tile_type(&mut grid, pt, tile_type);
            placed += 1;
        }

        let placement = PlacementReport::new(1, random_count, placed);
        Ok(LevelData::from_grid(
            grid,
            BoardGeometry::default(),
            entrance,
            exit,
            placement,
        ))
    }

    /// Wraps a finished grid and computes wall reachability. The grid must be rectangular
    /// and hold both doors.
    pub(crate) fn from_grid(
        mut grid: LevelGrid,
        geometry: BoardGeometry,
        entrance: UVec2,
        exit: UVec2,
        placement: PlacementReport,
    ) -> Self {
        let height = grid.len() as u32;
        let width = grid.first().map_or(0, |row| row.len() as u32);
        compute_reachability(&mut grid, width, height);
        LevelData {
            width,
            height,
            grid,
            geometry,
            entrance,
            exit,
            placement,
        }
    }

    pub fn tile(&self, pt: UVec2) -> Option<&DataTile> {
        self.grid
            .get(pt.y as usize)
            .and_then(|row| row.get(pt.x as usize))
            .and_then(Option::as_ref)
    }

    pub fn tile_type(&self, pt: UVec2) -> Option<TileType> {
        self.tile(pt).map(DataTile::tile_type)
    }

    pub fn door(&self, kind: DoorKind) -> UVec2 {
        match kind {
            DoorKind::Entrance => self.entrance,
            DoorKind::Exit => self.exit,
        }
    }

    pub fn has_key(&self) -> bool {
        self.tiles().any(|(_, tile)| tile.tile_type() == TileType::Key)
    }

    /// Every present tile with its position, row by row.
    pub fn tiles(&self) -> impl Iterator<Item = (UVec2, &DataTile)> + '_ {
        self.grid.iter().enumerate().flat_map(|(y, row)| {
            row.iter().enumerate().filter_map(move |(x, tile)| {
                tile.as_ref()
                    .map(|tile| (UVec2::new(x as u32, y as u32), tile))
            })
        })
    }

    pub fn count_of(&self, tile_type: TileType) -> usize {
        self.tiles()
            .filter(|(_, tile)| tile.tile_type() == tile_type)
            .count()
    }
}

pub(crate) fn board_points(width: u32, height: u32) -> impl Iterator<Item = UVec2> {
    (0..height).flat_map(move |y| (0..width).map(move |x| UVec2::new(x, y)))
}

fn tile_type_at(grid: &LevelGrid, pt: UVec2) -> Option<TileType> {
    grid.get(pt.y as usize)?
        .get(pt.x as usize)?
        .as_ref()
        .map(DataTile::tile_type)
}

fn set_tile_type(grid: &mut LevelGrid, pt: UVec2, tile_type: TileType) {
    if let Some(tile) = grid
        .get_mut(pt.y as usize)
        .and_then(|row| row.get_mut(pt.x as usize))
        .and_then(Option::as_mut)
    {
        tile.set_tile_type(tile_type);
    }
}

/// Inclusive `(min, max)` map corners of the ground layer's bounding box, found by scanning
/// inward from each edge.
fn ground_footprint(ground: &TileLayer) -> BuildResult<(IVec2, IVec2)> {
    let width = ground.width as i32;
    let height = ground.height as i32;
    let row_filled = |y: i32| (0..width).any(|x| ground.gid_at(IVec2::new(x, y)).is_some());
    let column_filled = |x: i32| (0..height).any(|y| ground.gid_at(IVec2::new(x, y)).is_some());

    let top = (0..height)
        .find(|y| row_filled(*y))
        .ok_or(LevelBuildError::EmptyGround { edge: Edge::Top })?;
    let bottom = (0..height)
        .rev()
        .find(|y| row_filled(*y))
        .ok_or(LevelBuildError::EmptyGround { edge: Edge::Bottom })?;
    let left = (0..width)
        .find(|x| column_filled(*x))
        .ok_or(LevelBuildError::EmptyGround { edge: Edge::Left })?;
    let right = (0..width)
        .rev()
        .find(|x| column_filled(*x))
        .ok_or(LevelBuildError::EmptyGround { edge: Edge::Right })?;
    Ok((IVec2::new(left, top), IVec2::new(right, bottom)))
}

/// Ground makes a cell playable. A typed overlay tile replaces it; an overlay tile with a
/// missing or unknown type is skipped.
fn authored_cell(
    ground: &TileLayer,
    overlay: Option<&TileLayer>,
    catalog: &TileCatalog,
    map_point: IVec2,
) -> Option<DataTile> {
    let mut cell = ground.gid_at(map_point).map(|gid| {
        DataTile::new(
            TileType::Blank,
            TileSource {
                map_point,
                gid: Some(gid),
            },
        )
    });
    if let Some(gid) = overlay.and_then(|layer| layer.gid_at(map_point)) {
        if let Some(tile_type) = overlay_tile_type(catalog, gid, map_point) {
            cell = Some(DataTile::new(
                tile_type,
                TileSource {
                    map_point,
                    gid: Some(gid),
                },
            ));
        }
    }
    cell
}

fn overlay_tile_type(catalog: &TileCatalog, gid: u32, map_point: IVec2) -> Option<TileType> {
    let Some(type_name) = catalog
        .get(gid)
        .and_then(|properties| properties.tile_type.as_deref())
    else {
        log::warn!("overlay tile {gid} at {map_point} has no type property, skipping");
        return None;
    };
    match type_name.parse::<TileType>() {
        Ok(tile_type) if tile_type.is_door() => {
            log::warn!(
                "overlay tile at {map_point} is a [{tile_type}], doors come from decoration markers"
            );
            None
        },
        Ok(tile_type) => Some(tile_type),
        Err(err) => {
            log::warn!("{err} on overlay tile {gid} at {map_point}, skipping");
            None
        },
    }
}

/// Finds the first marker for `kind` in the decoration layer and turns its cell into the
/// door. The marker is the door's top row, so the door itself sits one row below it; exits
/// are authored one column to the right of their cell.
fn place_door(
    grid: &mut LevelGrid,
    decorations: &TileLayer,
    catalog: &TileCatalog,
    geometry: &BoardGeometry,
    kind: DoorKind,
) -> BuildResult<UVec2> {
    let is_marker = |gid: u32| {
        catalog.get(gid).is_some_and(|properties| match kind {
            DoorKind::Entrance => properties.door_entrance,
            DoorKind::Exit => properties.door_exit,
        })
    };
    let (marker, gid) = (0..decorations.height as i32)
        .flat_map(|y| (0..decorations.width as i32).map(move |x| IVec2::new(x, y)))
        .find_map(|pt| {
            decorations
                .gid_at(pt)
                .filter(|gid| is_marker(*gid))
                .map(|gid| (pt, gid))
        })
        .ok_or(LevelBuildError::MissingDoor(kind))?;

    let mut map_point = marker + IVec2::Y;
    if kind == DoorKind::Exit {
        map_point.x -= 1;
    }
    let board = geometry.map_to_board(map_point);
    let height = grid.len() as u32;
    let width = grid.first().map_or(0, |row| row.len() as u32);
    if board.x < 0 || board.y < 0 || board.x as u32 >= width || board.y as u32 >= height {
        return Err(LevelBuildError::DoorOutOfBounds {
            door: kind,
            map_point,
            width,
            height,
        });
    }
    let position = board.as_uvec2();
    let tile_type = match kind {
        DoorKind::Entrance => TileType::Entrance,
        DoorKind::Exit => TileType::Exit,
    };
    grid[position.y as usize][position.x as usize] = Some(DataTile::new(
        tile_type,
        TileSource {
            map_point,
            gid: Some(gid),
        },
    ));
    log::debug!("{kind:?} door at {position} (marker at map point {marker})");
    Ok(position)
}

/// A wall is reachable when at least one in-board neighbour is a non-wall tile.
fn compute_reachability(grid: &mut LevelGrid, width: u32, height: u32) {
    let unreachable: Vec<UVec2> = board_points(width, height)
        .filter(|pt| tile_type_at(grid, *pt) == Some(TileType::Wall))
        .filter(|pt| {
            pt.neighbors_within(width, height)
                .into_iter()
                .all(|neighbor| {
                    tile_type_at(grid, neighbor).map_or(true, |t| t == TileType::Wall)
                })
        })
        .collect();
    for pt in unreachable {
        if let Some(tile) = grid[pt.y as usize][pt.x as usize].as_mut() {
            tile.set_reachable(false);
        }
    }
}

#[cfg(test)]
mod test {
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use test_log::test;

    use super::*;

    #[test]
    fn composition_capacity_boundary() {
        let mut rng = StdRng::seed_from_u64(11);
        let exact = LevelComposition::new(3, 3, UVec2::new(0, 0), UVec2::new(2, 2))
            .with_enemies(4)
            .with_gold(3);
        let data = LevelData::compose(&exact, &mut rng).expect("exact fit should build");
        assert_eq!(data.count_of(TileType::Enemy), 4);
        assert_eq!(data.count_of(TileType::Gold), 3);
        assert_eq!(data.count_of(TileType::Blank), 0);
        assert!(data.placement().is_complete());

        let overflow = exact.clone().with_enemies(5);
        assert!(matches!(
            LevelData::compose(&overflow, &mut rng),
            Err(LevelBuildError::CompositionOverflow {
                required: 10,
                available: 9
            })
        ));
    }

    #[test]
    fn fixed_tiles_count_against_capacity() {
        let mut rng = StdRng::seed_from_u64(1);
        let composition = LevelComposition::new(2, 2, UVec2::new(0, 0), UVec2::new(1, 1))
            .with_tile(UVec2::new(1, 0), TileType::Wall)
            .with_gold(2);
        assert!(matches!(
            LevelData::compose(&composition, &mut rng),
            Err(LevelBuildError::CompositionOverflow { .. })
        ));
        let composition = composition.with_gold(1).with_key();
        assert!(matches!(
            LevelData::compose(&composition, &mut rng),
            Err(LevelBuildError::CompositionOverflow { .. })
        ));
        let data = LevelData::compose(&composition.with_gold(0), &mut rng)
            .expect("wall plus key should fit");
        assert_eq!(data.tile_type(UVec2::new(0, 1)), Some(TileType::Key));
        assert!(data.has_key());
    }

    #[test]
    fn composition_rejects_out_of_bounds_doors() {
        let mut rng = StdRng::seed_from_u64(1);
        let composition = LevelComposition::new(2, 2, UVec2::new(0, 0), UVec2::new(2, 0));
        assert!(matches!(
            LevelData::compose(&composition, &mut rng),
            Err(LevelBuildError::PointOutOfBounds(pt)) if pt == UVec2::new(2, 0)
        ));
    }

    #[test]
    fn boxed_in_walls_are_unreachable() {
        let data = LevelData::from_layout(
            "E . . . .
             . # # # .
             . # # # .
             . # # # .
             . . . . X",
        )
        .expect("layout should parse");
        let center = data.tile(UVec2::new(2, 2)).expect("center tile");
        assert!(center.is_wall());
        assert!(!center.is_reachable());
        for pt in UVec2::new(2, 2).neighbors_within(5, 5) {
            assert!(data.tile(pt).expect("ring tile").is_reachable(), "{pt}");
        }
        assert!(data.tile(UVec2::new(0, 1)).expect("blank").is_reachable());
    }

    // Ground covers map cells (1..=4, 1..=3), so board (x, y) is map (x + 1, y + 1) and
    // cell centres sit at ((x + 1.5) * 10, (y + 1.5) * 10).
    const AUTHORED_MAP: &str = r#"{
        "width": 6,
        "height": 5,
        "tilewidth": 10,
        "tileheight": 10,
        "layers": [
            { "type": "tilelayer", "name": "Tiles", "width": 6, "height": 5, "data": [
                0, 0, 0, 0, 0, 0,
                0, 1, 1, 1, 1, 0,
                0, 1, 1, 1, 1, 0,
                0, 1, 1, 1, 1, 0,
                0, 0, 0, 0, 0, 0
            ] },
            { "type": "tilelayer", "name": "Assets", "width": 6, "height": 5, "data": [
                0, 0, 0, 0, 0, 0,
                0, 0, 2, 0, 0, 0,
                0, 0, 0, 0, 3, 0,
                0, 0, 0, 0, 0, 0,
                0, 0, 0, 0, 0, 0
            ] },
            { "type": "tilelayer", "name": "Decorations", "width": 6, "height": 5, "data": [
                0, 4, 0, 0, 0, 0,
                0, 0, 0, 0, 0, 0,
                0, 0, 0, 0, 0, 5,
                0, 0, 0, 0, 0, 0,
                0, 0, 0, 0, 0, 0
            ] },
            { "type": "objectgroup", "name": "RandomEnemy", "objects": [
                { "id": 1, "x": 10, "y": 30, "width": 20, "height": 10 },
                { "id": 2, "gid": 6, "x": 10, "y": 40, "width": 10, "height": 10 },
                { "id": 3, "gid": 6, "x": 20, "y": 40, "width": 10, "height": 10 }
            ] },
            { "type": "objectgroup", "name": "RandomPickup", "objects": [
                { "id": 4, "x": 30, "y": 30, "width": 10, "height": 10 },
                { "id": 5, "gid": 6, "x": 30, "y": 40, "width": 10, "height": 10 }
            ] }
        ],
        "tilesets": [ { "firstgid": 1, "tiles": [
            { "id": 1, "properties": [ { "name": "type", "type": "string", "value": "WALL" } ] },
            { "id": 2, "properties": [ { "name": "type", "type": "string", "value": "DRAGON" } ] },
            { "id": 3, "properties": [ { "name": "doorEntrance", "type": "bool", "value": true } ] },
            { "id": 4, "properties": [ { "name": "doorExit", "type": "bool", "value": true } ] }
        ] } ]
    }"#;

    const EXIT_MARKER_ROW: &str = "0, 0, 0, 0, 0, 5";
    const ENTRANCE_MARKER_ROW: &str = "0, 4, 0, 0, 0, 0";
    const PICKUP_PLACEHOLDER: &str =
        r#"{ "id": 5, "gid": 6, "x": 30, "y": 40, "width": 10, "height": 10 }"#;

    fn build(json: &str, seed: u64) -> BuildResult<LevelData> {
        let map = AuthoredMap::from_json_str(json)?;
        let mut rotation = PickupRotation::from_queues([("1", vec![TileType::Emp])]);
        let mut rng = StdRng::seed_from_u64(seed);
        LevelData::from_authored(
            &map,
            "1",
            &mut rotation,
            &LevelConfiguration::default(),
            &mut rng,
        )
    }

    #[test]
    fn authored_map_builds() {
        let data = build(AUTHORED_MAP, 5).expect("authored map should build");
        assert_eq!((data.width(), data.height()), (4, 3));
        assert_eq!(data.geometry().map_offset(), IVec2::new(1, 1));
        assert_eq!(data.entrance(), UVec2::new(0, 0));
        assert_eq!(data.tile_type(data.entrance()), Some(TileType::Entrance));
        assert_eq!(data.exit(), UVec2::new(3, 2));
        assert_eq!(data.tile_type(data.exit()), Some(TileType::Exit));
        assert_eq!(data.tile_type(UVec2::new(1, 0)), Some(TileType::Wall));
        // DRAGON is not a tile type, so the ground result stays
        assert_eq!(data.tile_type(UVec2::new(3, 1)), Some(TileType::Blank));

        assert_eq!(data.tile_type(UVec2::new(0, 2)), Some(TileType::Enemy));
        assert_eq!(data.tile_type(UVec2::new(1, 2)), Some(TileType::Enemy));
        assert_eq!(data.tile_type(UVec2::new(2, 2)), Some(TileType::Emp));
        assert!(data.placement().is_complete());
        assert_eq!(data.placement().requested(), 3);
        assert_eq!(data.placement().attempts(), 1);
    }

    #[test]
    fn missing_exit_marker_is_fatal() {
        let json = AUTHORED_MAP.replace(EXIT_MARKER_ROW, "0, 0, 0, 0, 0, 0");
        assert!(matches!(
            build(&json, 0),
            Err(LevelBuildError::MissingDoor(DoorKind::Exit))
        ));
    }

    #[test]
    fn door_outside_footprint_is_fatal() {
        let json = AUTHORED_MAP.replace(ENTRANCE_MARKER_ROW, "4, 0, 0, 0, 0, 0");
        assert!(matches!(
            build(&json, 0),
            Err(LevelBuildError::DoorOutOfBounds {
                door: DoorKind::Entrance,
                ..
            })
        ));
    }

    #[test]
    fn crowded_region_is_accepted_partially() {
        let crowded = format!("{PICKUP_PLACEHOLDER}, {PICKUP_PLACEHOLDER}");
        let json = AUTHORED_MAP.replace(PICKUP_PLACEHOLDER, &crowded);
        let data = build(&json, 9).expect("partial placement is not fatal");
        let report = data.placement();
        assert_eq!(report.requested(), 4);
        assert_eq!(report.placed(), 3);
        assert_eq!(report.shortfall(), 1);
        assert_eq!(report.attempts(), LevelConfiguration::default().placement_attempts);
        assert_eq!(data.tile_type(UVec2::new(2, 2)), Some(TileType::Emp));
    }
}
