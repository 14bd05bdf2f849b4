use bevy::prelude::UVec2;

use super::Level;
use crate::common::GridPoints;

impl Level {
    /// Runs after a wall at `pt` finishes revealing. Boxed-in walls next to it can never be
    /// clicked, so each one flips on its own once every reachable tile around it is showing.
    pub(super) fn cascade_from(&mut self, pt: UVec2) {
        let boxed_in: Vec<UVec2> = pt
            .neighbors_within(self.width, self.height)
            .into_iter()
            .filter(|neighbor| {
                self.tile(*neighbor)
                    .is_some_and(|tile| !tile.is_reachable() && !tile.is_revealed())
            })
            .filter(|neighbor| self.reachable_neighbors_revealed(*neighbor))
            .collect();
        for neighbor in boxed_in {
            log::debug!("revealing boxed-in wall at {neighbor} after {pt}");
            self.reveal_tile(neighbor);
        }
    }

    fn reachable_neighbors_revealed(&self, pt: UVec2) -> bool {
        pt.neighbors_within(self.width, self.height)
            .into_iter()
            .filter_map(|neighbor| self.tile(neighbor))
            .filter(|tile| tile.is_reachable())
            .all(|tile| tile.is_revealed())
    }
}

#[cfg(test)]
mod test {
    use test_log::test;

    use crate::common::GridPoints;
    use crate::event::LevelEvent;
    use crate::level::test::level_from_layout;
    use crate::store::GameStore;
    use crate::tile::Face;

    use super::*;

    const WALL_BLOCK: &str = "
        E . . . .
        . # # # .
        . # # # .
        . # # # .
        . . . . X
    ";

    #[test]
    fn boxed_in_wall_waits_for_its_whole_ring() {
        let mut level = level_from_layout(WALL_BLOCK);
        let mut store = GameStore::new();
        let center = UVec2::new(2, 2);
        let ring = center.neighbors_within(5, 5);

        for pt in &ring[..7] {
            level.reveal_tile(*pt);
        }
        level.finish_animations(&mut store);
        assert!(!level.tile(center).expect("center").is_revealed());

        level.reveal_tile(ring[7]);
        level.finish_animations(&mut store);
        assert!(level.tile(center).expect("center").is_revealed());
        assert!(level.drain_events().contains(&LevelEvent::TileFlipped {
            position: center,
            face: Face::Front,
        }));
    }

    #[test]
    fn nested_walls_cascade_inward() {
        let mut level = level_from_layout(
            "E . . . . . .
             . # # # # # .
             . # # # # # .
             . # # # # # .
             . # # # # # .
             . # # # # # .
             . . . . . . X",
        );
        let mut store = GameStore::new();
        let outer_ring: Vec<UVec2> = crate::level_data::board_points(7, 7)
            .filter(|pt| {
                let inner = (1..=5).contains(&pt.x) && (1..=5).contains(&pt.y);
                let core = (2..=4).contains(&pt.x) && (2..=4).contains(&pt.y);
                inner && !core
            })
            .collect();
        assert_eq!(outer_ring.len(), 16);
        for pt in outer_ring {
            level.reveal_tile(pt);
        }
        level.finish_animations(&mut store);
        assert!(level.tiles().all(|tile| !tile.is_wall() || tile.is_revealed()));
    }
}
