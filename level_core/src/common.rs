use bevy::prelude::{IVec2, UVec2};

/// Offsets of the 8-neighbourhood, in the order path searches visit them.
pub const NEIGHBOR_OFFSETS: [IVec2; 8] = [
    IVec2::new(0, -1),
    IVec2::new(1, 0),
    IVec2::new(0, 1),
    IVec2::new(-1, 0),
    IVec2::new(1, -1),
    IVec2::new(1, 1),
    IVec2::new(-1, 1),
    IVec2::new(-1, -1),
];

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Compass {
    North = 1,
    East = 2,
    South = 4,
    West = 8,
}

impl Compass {
    pub const ALL_DIRECTIONS: [Compass; 4] =
        [Compass::North, Compass::East, Compass::South, Compass::West];

    pub fn offset(&self) -> IVec2 {
        match self {
            Compass::North => IVec2::new(0, -1),
            Compass::East => IVec2::new(1, 0),
            Compass::South => IVec2::new(0, 1),
            Compass::West => IVec2::new(-1, 0),
        }
    }
}

pub trait GridPoints: Sized {
    /// Largest of the two axis deltas. Equal to the step count of an 8-directional path
    /// on an open board.
    fn chebyshev_distance(&self, rhs: &Self) -> u32;

    /// True when both axis deltas are within `[-1, 1]`.
    fn is_adjacent_or_same(&self, rhs: &Self) -> bool {
        self.chebyshev_distance(rhs) <= 1
    }

    /// Applies an offset, returning `None` if the result leaves `0..width` x `0..height`.
    fn offset_within(&self, offset: IVec2, width: u32, height: u32) -> Option<Self>;

    /// The in-bounds 8-neighbours, in [`NEIGHBOR_OFFSETS`] order.
    fn neighbors_within(&self, width: u32, height: u32) -> Vec<Self> {
        NEIGHBOR_OFFSETS
            .iter()
            .filter_map(|offset| self.offset_within(*offset, width, height))
            .collect()
    }

    /// Walks from this point (exclusive) in `dir` until leaving the bounds.
    fn ray_within(&self, dir: Compass, width: u32, height: u32) -> Ray<Self>
    where
        Self: Copy,
    {
        Ray {
            current: *self,
            dir,
            width,
            height,
        }
    }
}

impl GridPoints for UVec2 {
    fn chebyshev_distance(&self, rhs: &UVec2) -> u32 {
        self.x.abs_diff(rhs.x).max(self.y.abs_diff(rhs.y))
    }

    fn offset_within(&self, offset: IVec2, width: u32, height: u32) -> Option<UVec2> {
        let moved = self.as_ivec2() + offset;
        (moved.x >= 0 && moved.y >= 0 && (moved.x as u32) < width && (moved.y as u32) < height)
            .then(|| moved.as_uvec2())
    }
}

/// Iterator over the cells in a straight compass line, see [`GridPoints::ray_within`].
#[derive(Clone, Debug)]
pub struct Ray<P> {
    current: P,
    dir: Compass,
    width: u32,
    height: u32,
}

impl<P: GridPoints + Copy> Iterator for Ray<P> {
    type Item = P;

    fn next(&mut self) -> Option<P> {
        let next = self
            .current
            .offset_within(self.dir.offset(), self.width, self.height)?;
        self.current = next;
        Some(next)
    }
}
