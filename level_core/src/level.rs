//! The playable level. Owns the runtime tiles and doors, drives the flip timeline, and runs
//! the rules that fire when tiles are revealed.

mod cascade;
mod scramble;

use std::time::Duration;

use bevy::prelude::{UVec2, Vec2};

use crate::common::GridPoints;
use crate::configuration::LevelConfiguration;
use crate::door::{Door, DoorKind};
use crate::event::{EventChannel, LevelEvent, ListenerId, SoundCue};
use crate::flip::{BatchId, FlipProgress, FlipTimeline};
use crate::geometry::BoardGeometry;
use crate::level_data::{board_points, LevelData};
use crate::pathfinder::Pathfinder;
use crate::store::GameStore;
use crate::tile::{Face, Tile};
use crate::tile_type::{TileContent, TileType};

#[derive(Debug)]
pub struct Level {
    width: u32,
    height: u32,
    geometry: BoardGeometry,
    tiles: Vec<Vec<Option<Tile>>>,
    entrance: Door,
    exit: Door,
    pathfinder: Pathfinder,
    timeline: FlipTimeline,
    config: LevelConfiguration,
    events: EventChannel<LevelEvent>,
    is_interactive: bool,
    /// Set by [`Level::teardown`]. Reveals after that are presentation only.
    is_tearing_down: bool,
    /// The entrance-cluster batch from [`Level::start`], until it completes.
    start_batch: Option<BatchId>,
}

impl Level {
    /// Sets up runtime state for `data`. Every tile starts hidden. Levels without a key
    /// open their exit right away.
    pub fn new(data: LevelData, config: LevelConfiguration) -> Self {
        let tiles = data
            .grid()
            .iter()
            .enumerate()
            .map(|(y, row)| {
                row.iter()
                    .enumerate()
                    .map(|(x, tile)| {
                        tile.as_ref()
                            .map(|tile| Tile::new(*tile, UVec2::new(x as u32, y as u32)))
                    })
                    .collect()
            })
            .collect();
        let mut level = Level {
            width: data.width(),
            height: data.height(),
            geometry: data.geometry(),
            tiles,
            entrance: Door::new(DoorKind::Entrance, data.entrance()),
            exit: Door::new(DoorKind::Exit, data.exit()),
            pathfinder: Pathfinder::new(data.width(), data.height()),
            timeline: FlipTimeline::new(config.flip_duration()),
            config,
            events: EventChannel::new(),
            is_interactive: false,
            is_tearing_down: false,
            start_batch: None,
        };
        level.refresh_all_scramble();
        if !data.has_key() {
            level.open_exit();
        }
        level
    }

    /// Opens the entrance and reveals the cluster around it. The level becomes interactive
    /// once the returned batch has finished flipping.
    pub fn start(&mut self) -> BatchId {
        self.open_door(DoorKind::Entrance);
        let entrance = self.entrance.position();
        let mut cluster = vec![entrance];
        cluster.extend(entrance.neighbors_within(self.width, self.height));
        let batch = self.flip_tiles(&cluster, Face::Front);
        self.start_batch = Some(batch);
        batch
    }

    /// Disables input and shows every tile ahead of the level being dropped. Contents
    /// revealed this way are not collected or encountered.
    pub fn teardown(&mut self) -> BatchId {
        self.set_interactive(false);
        self.is_tearing_down = true;
        self.start_batch = None;
        self.flip_all(Face::Front)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn geometry(&self) -> BoardGeometry {
        self.geometry
    }

    pub fn config(&self) -> &LevelConfiguration {
        &self.config
    }

    pub fn is_interactive(&self) -> bool {
        self.is_interactive
    }

    pub fn set_interactive(&mut self, interactive: bool) {
        if std::mem::replace(&mut self.is_interactive, interactive) != interactive {
            self.events.send(LevelEvent::InteractivityChanged { interactive });
        }
    }

    /// True while any flip is still playing.
    pub fn is_animating(&self) -> bool {
        !self.timeline.is_idle()
    }

    pub fn timeline(&self) -> &FlipTimeline {
        &self.timeline
    }

    pub fn tile(&self, pt: UVec2) -> Option<&Tile> {
        self.tiles
            .get(pt.y as usize)
            .and_then(|row| row.get(pt.x as usize))
            .and_then(Option::as_ref)
    }

    fn tile_mut(&mut self, pt: UVec2) -> Option<&mut Tile> {
        self.tiles
            .get_mut(pt.y as usize)
            .and_then(|row| row.get_mut(pt.x as usize))
            .and_then(Option::as_mut)
    }

    /// Every present tile, row by row.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> + '_ {
        self.tiles.iter().flatten().flatten()
    }

    fn positions(&self) -> Vec<UVec2> {
        self.tiles().map(Tile::position).collect()
    }

    pub fn tile_at_world(&self, world: Vec2) -> Option<&Tile> {
        self.geometry
            .world_to_board(world)
            .and_then(|pt| self.tile(pt))
    }

    pub fn world_position(&self, pt: UVec2) -> Vec2 {
        self.geometry.board_to_world(pt)
    }

    // Doors

    pub fn entrance(&self) -> &Door {
        &self.entrance
    }

    pub fn exit(&self) -> &Door {
        &self.exit
    }

    pub fn door(&self, kind: DoorKind) -> &Door {
        match kind {
            DoorKind::Entrance => &self.entrance,
            DoorKind::Exit => &self.exit,
        }
    }

    fn door_mut(&mut self, kind: DoorKind) -> &mut Door {
        match kind {
            DoorKind::Entrance => &mut self.entrance,
            DoorKind::Exit => &mut self.exit,
        }
    }

    pub fn open_door(&mut self, kind: DoorKind) -> bool {
        if !self.door_mut(kind).open() {
            return false;
        }
        log::debug!("{kind:?} door opened");
        self.events.send(LevelEvent::DoorOpened { door: kind });
        self.send_sound(SoundCue::DoorOpen);
        true
    }

    pub fn close_door(&mut self, kind: DoorKind) -> bool {
        if !self.door_mut(kind).close() {
            return false;
        }
        log::debug!("{kind:?} door closed");
        self.events.send(LevelEvent::DoorClosed { door: kind });
        self.send_sound(SoundCue::DoorClose);
        true
    }

    pub fn open_exit(&mut self) -> bool {
        self.open_door(DoorKind::Exit)
    }

    // Events

    pub fn events(&self) -> &EventChannel<LevelEvent> {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<LevelEvent> {
        self.events.drain()
    }

    pub fn subscribe<F: FnMut(&LevelEvent) + 'static>(&mut self, listener: F) -> ListenerId {
        self.events.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.events.unsubscribe(id)
    }

    fn send_sound(&mut self, sound: SoundCue) {
        self.events.send(LevelEvent::SoundRequested { sound });
    }

    // Flipping

    /// Starts revealing a single tile. Returns false if there is no tile there or it is
    /// already revealed; in that case nothing is scheduled.
    pub fn reveal_tile(&mut self, pt: UVec2) -> bool {
        if !self.begin_flip(pt, Face::Front) {
            return false;
        }
        self.timeline.schedule(pt, Face::Front, Duration::ZERO);
        true
    }

    /// Flips a set of tiles as one batch. Tiles already showing `face` are left out. Large
    /// batches go row by row so each row finishes together; small ones stagger tile by tile.
    pub fn flip_tiles(&mut self, positions: &[UVec2], face: Face) -> BatchId {
        let batch = self.timeline.begin_batch();
        let flipping: Vec<UVec2> = positions
            .iter()
            .copied()
            .filter(|pt| self.begin_flip(*pt, face))
            .collect();

        if flipping.len() > self.config.row_batch_threshold {
            let mut rows: Vec<u32> = flipping.iter().map(|pt| pt.y).collect();
            rows.sort_unstable();
            rows.dedup();
            for pt in flipping {
                let row = rows.partition_point(|y| *y < pt.y) as u32;
                let delay = self.config.row_stagger() * row;
                self.timeline.schedule_in_batch(batch, pt, face, delay);
            }
        } else {
            for (i, pt) in flipping.into_iter().enumerate() {
                let delay = self.config.flip_stagger() * i as u32;
                self.timeline.schedule_in_batch(batch, pt, face, delay);
            }
        }
        batch
    }

    pub fn flip_all(&mut self, face: Face) -> BatchId {
        let positions = self.positions();
        self.flip_tiles(&positions, face)
    }

    fn begin_flip(&mut self, pt: UVec2, face: Face) -> bool {
        self.tile_mut(pt).is_some_and(|tile| match face {
            Face::Front => tile.flip_to_front(),
            Face::Back => tile.flip_to_back(),
        })
    }

    /// Advances the flip animations by `dt` and runs whatever rules the finished flips
    /// trigger. Pickups collected along the way go into `store`.
    pub fn update(&mut self, dt: Duration, store: &mut GameStore) {
        let progress = self.timeline.advance(dt);
        self.apply_progress(progress, store);
    }

    /// Completes every running flip now, including any flips the completions themselves
    /// start.
    pub fn finish_animations(&mut self, store: &mut GameStore) {
        while !self.timeline.is_idle() {
            let progress = self.timeline.finish_all();
            self.apply_progress(progress, store);
        }
    }

    fn apply_progress(&mut self, progress: Vec<FlipProgress>, store: &mut GameStore) {
        for item in progress {
            match item {
                FlipProgress::Started { position, face } => {
                    self.events.send(LevelEvent::TileFlipStarted { position, face });
                    self.send_sound(SoundCue::TileFlip);
                },
                FlipProgress::Halfway {
                    position,
                    face: Face::Front,
                } => self.events.send(LevelEvent::TileContentsShown { position }),
                FlipProgress::Halfway { .. } => {},
                FlipProgress::Completed { position, face } => {
                    self.events.send(LevelEvent::TileFlipped { position, face });
                    if face == Face::Front {
                        self.after_reveal(position, store);
                    }
                },
                FlipProgress::BatchCompleted(batch) => {
                    self.events.send(LevelEvent::BatchFlipped { batch });
                    if self.start_batch == Some(batch) {
                        self.start_batch = None;
                        self.set_interactive(true);
                    }
                },
            }
        }
    }

    /// Fires the revealed tile's content. Guarded by `is_currently_blank`, so each effect
    /// happens at most once per tile.
    fn after_reveal(&mut self, pt: UVec2, store: &mut GameStore) {
        let Some(tile) = self.tile(pt).filter(|tile| tile.is_revealed()) else {
            return;
        };
        let is_blank = tile.is_currently_blank();
        let tile_type = tile.tile_type();

        match tile_type.content() {
            TileContent::Empty => {
                if tile_type == TileType::Wall {
                    self.cascade_from(pt);
                }
            },
            TileContent::Door(kind) => {
                if self.door(kind).position() == pt {
                    self.door_mut(kind).mark_flipped();
                }
            },
            TileContent::Pickup(pickup) if !is_blank && !self.is_tearing_down => {
                self.events.send(LevelEvent::ContentCollected {
                    position: pt,
                    pickup,
                });
                store.apply_pickup(pickup);
                self.consume_tile(pt);
                if pickup == TileType::Key {
                    self.send_sound(SoundCue::KeyCollected);
                    self.open_exit();
                } else {
                    self.send_sound(SoundCue::PickupCollected);
                }
            },
            TileContent::Hostile(enemy) if !is_blank && !self.is_tearing_down => {
                self.events.send(LevelEvent::EnemyEncountered {
                    position: pt,
                    enemy,
                });
                self.send_sound(SoundCue::EnemyRevealed);
            },
            TileContent::Shop if !self.is_tearing_down => {
                self.events.send(LevelEvent::ShopDiscovered { position: pt })
            },
            TileContent::Pickup(_) | TileContent::Hostile(_) | TileContent::Shop => {},
        }
    }

    /// Uses up a tile's one-time content. Returns false if it was already blank.
    pub fn consume_tile(&mut self, pt: UVec2) -> bool {
        let Some(tile) = self.tile_mut(pt) else {
            return false;
        };
        if !tile.consume() {
            return false;
        }
        let was_scrambler = tile.tile_type() == TileType::ScrambleEnemy;
        self.events.send(LevelEvent::TileConsumed { position: pt });
        if was_scrambler {
            self.refresh_scramble_lines(pt);
        }
        true
    }

    // Queries for the game flow

    pub fn is_tile_in_player_range(&self, player: UVec2, pt: UVec2) -> bool {
        player.is_adjacent_or_same(&pt)
    }

    fn rebuild_walkability(&mut self) {
        self.pathfinder.set_all_unwalkable();
        let walkable: Vec<UVec2> = self
            .tiles()
            .filter(|tile| tile.is_walkable())
            .map(Tile::position)
            .collect();
        for pt in walkable {
            self.pathfinder.set_walkable_at(pt);
        }
        for door in [&self.entrance, &self.exit] {
            if door.is_open() {
                self.pathfinder.set_walkable_at(door.position());
            }
        }
    }

    /// Shortest path for the player to `target`. The player's own tile always counts as
    /// walkable, so standing on a shop or an undefeated enemy does not trap them. With
    /// `allow_unrevealed_destination`, an unwalkable target tile is treated as walkable for
    /// this query only.
    pub fn find_path_between(
        &mut self,
        player: UVec2,
        target: UVec2,
        allow_unrevealed_destination: bool,
    ) -> Option<Vec<UVec2>> {
        self.rebuild_walkability();
        if self.tile(player).is_some() {
            self.pathfinder.set_walkable_at(player);
        }
        if allow_unrevealed_destination
            && self.tile(target).is_some()
            && !self.pathfinder.is_walkable_at(target)
        {
            self.pathfinder.set_walkable_at(target);
        }
        self.pathfinder.find_path(player, target)
    }

    /// Every cell the player could be sent to: the walkable region around them, plus any
    /// tile one step beyond its edge.
    pub fn movement_range(&mut self, player: UVec2) -> Vec<UVec2> {
        self.rebuild_walkability();
        if self.tile(player).is_some() {
            self.pathfinder.set_walkable_at(player);
        }
        let reached = self.pathfinder.reachable_from(player);
        let width = self.width as usize;
        let is_reached = |pt: UVec2| reached[pt.y as usize * width + pt.x as usize];

        board_points(self.width, self.height)
            .filter(|pt| self.tile(*pt).is_some())
            .filter(|pt| {
                is_reached(*pt)
                    || pt
                        .neighbors_within(self.width, self.height)
                        .into_iter()
                        .any(is_reached)
            })
            .collect()
    }

    /// Unconsumed enemies in the 8-neighbourhood of `(x, y)`.
    pub fn count_neighboring_enemies(&self, x: u32, y: u32) -> u32 {
        self.neighboring_tiles(UVec2::new(x, y))
            .into_iter()
            .filter(|tile| tile.tile_type().is_enemy() && !tile.is_currently_blank())
            .count() as u32
    }

    /// The number a revealed tile shows, or `None` while a scramble beam covers it.
    pub fn neighbor_hint(&self, pt: UVec2) -> Option<u32> {
        (!self.is_tile_scrambled(pt)).then(|| self.count_neighboring_enemies(pt.x, pt.y))
    }

    pub fn neighboring_tiles(&self, pt: UVec2) -> Vec<&Tile> {
        pt.neighbors_within(self.width, self.height)
            .into_iter()
            .filter_map(|neighbor| self.tile(neighbor))
            .collect()
    }

    /// Brightens revealed tiles and tiles within reach of the player, dims the rest. Doors
    /// use a looser radius.
    pub fn highlight_tiles(&mut self, player: UVec2) {
        for pt in self.positions() {
            let in_range = self.is_tile_in_player_range(player, pt);
            let Some(tile) = self.tile_mut(pt) else {
                continue;
            };
            let highlighted = tile.is_revealed() || in_range;
            if tile.set_highlighted(highlighted) {
                self.events.send(LevelEvent::HighlightChanged {
                    position: pt,
                    highlighted,
                });
            }
        }

        let radius = self.config.door_highlight_radius;
        for kind in [DoorKind::Entrance, DoorKind::Exit] {
            let door = self.door_mut(kind);
            let near = door.position().as_vec2().distance(player.as_vec2()) <= radius;
            let highlighted = door.is_tile_flipped() || near;
            if door.set_highlighted(highlighted) {
                self.events.send(LevelEvent::DoorHighlightChanged {
                    door: kind,
                    highlighted,
                });
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod test {
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use test_log::test;

    use super::*;
    use crate::level_data::LevelComposition;

    pub(crate) fn level_from_layout(layout: &str) -> Level {
        let data = LevelData::from_layout(layout).expect("test layout should parse");
        Level::new(data, LevelConfiguration::default())
    }

    fn count_events(level: &Level, predicate: impl Fn(&LevelEvent) -> bool) -> usize {
        level.events().iter().filter(|event| predicate(event)).count()
    }

    #[test]
    fn open_board_path_and_exit() {
        let mut rng = StdRng::seed_from_u64(4);
        let composition = LevelComposition::new(5, 5, UVec2::new(0, 0), UVec2::new(4, 4));
        let data = LevelData::compose(&composition, &mut rng).expect("empty board");
        let mut level = Level::new(data, LevelConfiguration::default());
        assert!(level.exit().is_open());
        assert!(!level.entrance().is_open());

        let mut store = GameStore::new();
        level.start();
        level.flip_all(Face::Front);
        level.finish_animations(&mut store);

        let path = level
            .find_path_between(UVec2::new(0, 0), UVec2::new(4, 4), true)
            .expect("open board should connect the doors");
        assert_eq!(path.len(), 5);
        assert_eq!(path.first(), Some(&UVec2::new(0, 0)));
        assert_eq!(path.last(), Some(&UVec2::new(4, 4)));
    }

    #[test]
    fn revealing_twice_completes_once() {
        let mut level = level_from_layout("E . . X");
        let mut store = GameStore::new();
        let pt = UVec2::new(1, 0);
        assert!(level.reveal_tile(pt));
        assert!(level.tile(pt).expect("tile").is_revealed());
        assert!(!level.reveal_tile(pt));
        level.finish_animations(&mut store);
        assert!(!level.reveal_tile(pt));
        level.finish_animations(&mut store);

        let completions = count_events(&level, |event| {
            *event
                == LevelEvent::TileFlipped {
                    position: pt,
                    face: Face::Front,
                }
        });
        assert_eq!(completions, 1);
        assert!(level.tile(pt).expect("tile").is_revealed());
    }

    #[test]
    fn gold_is_collected_once() {
        let mut level = level_from_layout("E g X");
        let mut store = GameStore::new();
        let gold = UVec2::new(1, 0);
        level.reveal_tile(gold);
        level.finish_animations(&mut store);
        assert!(level.tile(gold).expect("gold tile").is_currently_blank());
        assert_eq!(store.gold(), 1);

        assert!(!level.reveal_tile(gold));
        level.finish_animations(&mut store);
        assert_eq!(store.gold(), 1);
        let collected = count_events(&level, |event| {
            matches!(event, LevelEvent::ContentCollected { pickup: TileType::Gold, .. })
        });
        assert_eq!(collected, 1);
        assert_eq!(
            level.tile(gold).expect("gold tile").tile_type(),
            TileType::Gold
        );
    }

    #[test]
    fn key_opens_the_exit() {
        let mut level = level_from_layout("E k X");
        let mut store = GameStore::new();
        assert!(!level.exit().is_open());
        level.reveal_tile(UVec2::new(1, 0));
        level.finish_animations(&mut store);
        assert!(level.exit().is_open());
        assert_eq!(store.keys(), 1);
        assert_eq!(
            count_events(&level, |event| {
                *event
                    == LevelEvent::DoorOpened {
                        door: DoorKind::Exit,
                    }
            }),
            1
        );
    }

    #[test]
    fn enemies_wait_for_the_game_flow() {
        let mut level = level_from_layout(
            "E e .
             . . .
             . . X",
        );
        let mut store = GameStore::new();
        let enemy = UVec2::new(1, 0);
        assert_eq!(level.count_neighboring_enemies(1, 1), 1);
        level.reveal_tile(enemy);
        level.finish_animations(&mut store);
        assert_eq!(
            count_events(&level, |event| matches!(
                event,
                LevelEvent::EnemyEncountered { enemy: TileType::Enemy, .. }
            )),
            1
        );
        assert!(!level.tile(enemy).expect("enemy").is_currently_blank());

        assert!(level.consume_tile(enemy));
        assert!(!level.consume_tile(enemy));
        assert_eq!(level.count_neighboring_enemies(1, 1), 0);
        assert_eq!(level.neighbor_hint(UVec2::new(1, 1)), Some(0));
    }

    #[test]
    fn start_enables_interaction_after_the_entrance_cluster() {
        let mut level = level_from_layout(
            ". . . .
             . E . .
             . . . .
             . . . X",
        );
        let mut store = GameStore::new();
        level.start();
        assert!(level.entrance().is_open());
        assert!(!level.is_interactive());
        for pt in UVec2::new(1, 1).neighbors_within(4, 4) {
            assert!(level.tile(pt).expect("cluster tile").is_revealed());
        }
        assert!(!level.tile(UVec2::new(3, 3)).expect("far tile").is_revealed());

        level.update(Duration::from_millis(100), &mut store);
        assert!(!level.is_interactive());
        level.finish_animations(&mut store);
        assert!(level.is_interactive());
        assert!(level.entrance().is_tile_flipped());

        level.teardown();
        assert!(!level.is_interactive());
        assert!(level.tiles().all(Tile::is_revealed));
    }

    #[test]
    fn large_batches_flip_row_by_row() {
        let mut level = level_from_layout(
            "E . . . .
             . . . . .
             . . . . X",
        );
        let mut store = GameStore::new();
        level.flip_all(Face::Front);
        level.drain_events();
        level.update(Duration::ZERO, &mut store);
        let started: Vec<UVec2> = level
            .drain_events()
            .into_iter()
            .filter_map(|event| match event {
                LevelEvent::TileFlipStarted { position, .. } => Some(position),
                _ => None,
            })
            .collect();
        assert_eq!(started.len(), 5);
        assert!(started.iter().all(|pt| pt.y == 0));
    }

    #[test]
    fn hidden_tiles_block_paths_unless_they_are_the_destination() {
        let mut level = level_from_layout("E . . X");
        let mut store = GameStore::new();
        level.start();
        level.finish_animations(&mut store);
        let entrance = UVec2::new(0, 0);

        // (1, 0) is revealed by the entrance cluster, (2, 0) is not
        assert_eq!(level.find_path_between(entrance, UVec2::new(2, 0), false), None);
        let path = level
            .find_path_between(entrance, UVec2::new(2, 0), true)
            .expect("stepping into the unknown is allowed");
        assert_eq!(path.len(), 3);
        assert_eq!(level.find_path_between(entrance, UVec2::new(2, 0), false), None);

        let mut range = level.movement_range(entrance);
        range.sort_by_key(|pt| (pt.y, pt.x));
        assert_eq!(
            range,
            vec![UVec2::new(0, 0), UVec2::new(1, 0), UVec2::new(2, 0)]
        );
    }

    #[test]
    fn highlights_follow_the_player() {
        let mut level = level_from_layout(
            "E . . .
             . . . X",
        );
        level.highlight_tiles(UVec2::new(0, 0));
        assert!(level.tile(UVec2::new(1, 1)).expect("tile").is_highlighted());
        assert!(!level.tile(UVec2::new(2, 0)).expect("tile").is_highlighted());
        assert!(level.entrance().is_highlighted());
        assert!(!level.exit().is_highlighted());

        level.highlight_tiles(UVec2::new(2, 0));
        assert!(!level.tile(UVec2::new(0, 0)).expect("tile").is_highlighted());
        // Exit at (3, 1) is sqrt(2) away
        assert!(level.exit().is_highlighted());
        assert!(!level.entrance().is_highlighted());
    }

    #[test]
    fn teardown_reveals_without_collecting() {
        let mut level = level_from_layout("E g k X");
        let mut store = GameStore::new();
        level.start();
        level.finish_animations(&mut store);
        assert_eq!(store.gold(), 1);
        assert!(!level.exit().is_open());
        level.drain_events();

        level.teardown();
        level.finish_animations(&mut store);
        assert!(level.tile(UVec2::new(2, 0)).expect("key").is_revealed());
        assert_eq!(store.gold(), 1);
        assert_eq!(store.keys(), 0);
        assert!(!level.exit().is_open());
        assert!(!level.tile(UVec2::new(2, 0)).expect("key").is_currently_blank());
        assert_eq!(
            count_events(&level, |event| matches!(
                event,
                LevelEvent::ContentCollected { .. } | LevelEvent::DoorOpened { .. }
            )),
            0
        );
    }

    #[test]
    fn teardown_leaves_enemies_alone() {
        let mut level = level_from_layout("E . . e $ X");
        let mut store = GameStore::new();
        level.start();
        level.finish_animations(&mut store);
        level.teardown();
        level.finish_animations(&mut store);
        assert_eq!(
            count_events(&level, |event| matches!(
                event,
                LevelEvent::EnemyEncountered { .. } | LevelEvent::ShopDiscovered { .. }
            )),
            0
        );
        assert!(level.exit().is_tile_flipped());
    }

    #[test]
    fn player_can_leave_a_shop() {
        let mut level = level_from_layout("E $ . . X");
        let mut store = GameStore::new();
        let shop = UVec2::new(1, 0);
        level.start();
        level.reveal_tile(UVec2::new(2, 0));
        level.finish_animations(&mut store);
        assert!(!level.tile(shop).expect("shop").is_walkable());

        let range = level.movement_range(shop);
        assert!(range.contains(&UVec2::new(2, 0)));
        let path = level
            .find_path_between(shop, UVec2::new(2, 0), false)
            .expect("a revealed neighbour is reachable from the shop");
        assert_eq!(path, vec![shop, UVec2::new(2, 0)]);
        let path = level
            .find_path_between(shop, UVec2::new(3, 0), true)
            .expect("one step into the unknown");
        assert_eq!(path.len(), 3);
    }

    #[test]
    fn closed_exit_blocks_paths_until_the_key_is_found() {
        let mut level = level_from_layout(
            "E . . . X
             . . . . k",
        );
        let mut store = GameStore::new();
        let (entrance, exit) = (UVec2::new(0, 0), UVec2::new(4, 0));
        level.start();
        level.flip_tiles(
            &[
                UVec2::new(2, 0),
                UVec2::new(3, 0),
                UVec2::new(2, 1),
                UVec2::new(3, 1),
                exit,
            ],
            Face::Front,
        );
        level.finish_animations(&mut store);
        assert!(level.tile(exit).expect("exit").is_revealed());
        assert!(!level.exit().is_open());
        assert_eq!(level.find_path_between(entrance, exit, false), None);

        level.reveal_tile(UVec2::new(4, 1));
        level.finish_animations(&mut store);
        assert!(level.exit().is_open());
        let path = level
            .find_path_between(entrance, exit, false)
            .expect("an open exit is walkable");
        assert_eq!(path.len(), 5);
        assert_eq!(path.last(), Some(&exit));
    }
}
