//! 8-directional shortest paths over a walkability mask.

use std::collections::VecDeque;

use bevy::prelude::UVec2;
use bitvec::vec::BitVec;

use crate::common::{GridPoints, NEIGHBOR_OFFSETS};

/// Walkability mask plus the searches that run over it. Every step costs the same, diagonal
/// or not.
///
/// The mask is not kept in sync with anything. Whoever owns the pathfinder rebuilds it
/// before each query.
#[derive(Clone, Debug)]
pub struct Pathfinder {
    width: u32,
    height: u32,
    walkable: BitVec<u8>,
}

impl Pathfinder {
    pub fn new(width: u32, height: u32) -> Self {
        Pathfinder {
            width,
            height,
            walkable: BitVec::repeat(false, width as usize * height as usize),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    fn index(&self, pt: UVec2) -> Option<usize> {
        (pt.x < self.width && pt.y < self.height)
            .then(|| pt.y as usize * self.width as usize + pt.x as usize)
    }

    fn point(&self, index: usize) -> UVec2 {
        let width = self.width as usize;
        UVec2::new((index % width) as u32, (index / width) as u32)
    }

    pub fn set_all_unwalkable(&mut self) {
        self.walkable.fill(false);
    }

    pub fn set_walkable_at(&mut self, pt: UVec2) {
        self.set_at(pt, true)
    }

    pub fn set_unwalkable_at(&mut self, pt: UVec2) {
        self.set_at(pt, false)
    }

    fn set_at(&mut self, pt: UVec2, walkable: bool) {
        match self.index(pt) {
            Some(index) => self.walkable.set(index, walkable),
            None => log::warn!(
                "ignoring walkability change at {pt}, outside {}x{}",
                self.width,
                self.height
            ),
        }
    }

    pub fn is_walkable_at(&self, pt: UVec2) -> bool {
        self.index(pt)
            .and_then(|index| self.walkable.get(index).map(|bit| *bit))
            .unwrap_or(false)
    }

    /// Shortest path from `start` to `end`, both included. `None` if either end is
    /// unwalkable or nothing connects them.
    pub fn find_path(&self, start: UVec2, end: UVec2) -> Option<Vec<UVec2>> {
        if !self.is_walkable_at(start) || !self.is_walkable_at(end) {
            log::trace!("no path {start} -> {end}: endpoint unwalkable");
            return None;
        }
        let start_index = self.index(start)?;
        let end_index = self.index(end)?;

        let mut came_from: Vec<Option<usize>> = vec![None; self.walkable.len()];
        let mut visited: BitVec<u8> = BitVec::repeat(false, self.walkable.len());
        let mut frontier = VecDeque::from([start_index]);
        visited.set(start_index, true);

        while let Some(current) = frontier.pop_front() {
            if current == end_index {
                let mut path = vec![self.point(current)];
                let mut cursor = current;
                while let Some(previous) = came_from[cursor] {
                    path.push(self.point(previous));
                    cursor = previous;
                }
                path.reverse();
                log::trace!("path {start} -> {end} in {} steps", path.len() - 1);
                return Some(path);
            }
            for next in self.walkable_neighbors(current) {
                if !visited[next] {
                    visited.set(next, true);
                    came_from[next] = Some(current);
                    frontier.push_back(next);
                }
            }
        }
        log::trace!("no path {start} -> {end}: disconnected");
        None
    }

    /// Every cell 8-connected to `start` through walkable cells, `start` included. Empty if
    /// `start` itself is unwalkable.
    pub fn reachable_from(&self, start: UVec2) -> BitVec<u8> {
        let mut reached: BitVec<u8> = BitVec::repeat(false, self.walkable.len());
        let Some(start_index) = self.index(start).filter(|_| self.is_walkable_at(start)) else {
            return reached;
        };
        reached.set(start_index, true);
        let mut frontier = VecDeque::from([start_index]);
        while let Some(current) = frontier.pop_front() {
            for next in self.walkable_neighbors(current) {
                if !reached[next] {
                    reached.set(next, true);
                    frontier.push_back(next);
                }
            }
        }
        reached
    }

    fn walkable_neighbors(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        let pt = self.point(index);
        NEIGHBOR_OFFSETS.iter().filter_map(move |offset| {
            let next = pt.offset_within(*offset, self.width, self.height)?;
            let next_index = self.index(next)?;
            self.walkable[next_index].then_some(next_index)
        })
    }
}
