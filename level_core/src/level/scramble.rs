//! Scramble beams: a live SCRAMBLE_ENEMY jams every tile along its row and column until a
//! wall blocks the line.

use bevy::prelude::UVec2;

use super::Level;
use crate::common::{Compass, GridPoints};
use crate::event::LevelEvent;

impl Level {
    /// Casts a ray in each compass direction from `pt`. A live scrambler ends the ray and
    /// scrambles the tile; a wall or the board edge ends it harmlessly. Gaps in the board
    /// do not block.
    pub fn is_tile_scrambled(&self, pt: UVec2) -> bool {
        Compass::ALL_DIRECTIONS
            .into_iter()
            .any(|dir| self.ray_hits_scrambler(pt, dir))
    }

    fn ray_hits_scrambler(&self, pt: UVec2, dir: Compass) -> bool {
        for next in pt.ray_within(dir, self.width, self.height) {
            match self.tile(next) {
                Some(tile) if tile.is_wall() => return false,
                Some(tile) if tile.emits_scramble() => return true,
                _ => {},
            }
        }
        false
    }

    fn refresh_scramble_at(&mut self, pt: UVec2) {
        let scrambled = self.is_tile_scrambled(pt);
        let changed = self
            .tile_mut(pt)
            .is_some_and(|tile| tile.set_scrambled(scrambled));
        if changed {
            self.events.send(LevelEvent::ScrambleChanged {
                position: pt,
                scrambled,
            });
        }
    }

    /// Re-checks the whole row and column through `pt`, after the scrambler there is gone.
    pub(super) fn refresh_scramble_lines(&mut self, pt: UVec2) {
        let line: Vec<UVec2> = Compass::ALL_DIRECTIONS
            .into_iter()
            .flat_map(|dir| pt.ray_within(dir, self.width, self.height))
            .chain([pt])
            .collect();
        for next in line {
            self.refresh_scramble_at(next);
        }
    }

    pub(super) fn refresh_all_scramble(&mut self) {
        for pt in self.positions() {
            self.refresh_scramble_at(pt);
        }
    }
}
