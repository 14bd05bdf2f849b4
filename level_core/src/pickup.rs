//! Session-wide rotation of random pickups across levels.

use std::collections::VecDeque;

use bevy::utils::HashMap;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::configuration::PickupConfiguration;
use crate::error::{BuildResult, LevelBuildError};
use crate::tile_type::TileType;

/// Pickup types handed out by the rotation. Each appears exactly twice per block.
pub const ROTATED_PICKUPS: [TileType; 4] = [
    TileType::Compass,
    TileType::Sniper,
    TileType::Emp,
    TileType::Ammo,
];

/// Levels on the fixed interval get these in place of one rotated pickup.
pub const FIXED_PICKUPS: [TileType; 2] = [TileType::Upgrade, TileType::Alert];

const BLOCK_LEN: usize = ROTATED_PICKUPS.len() * 2;
const SHUFFLE_ATTEMPTS: usize = 64;

/// Per-level pickup queues, generated once per game session.
#[derive(Clone, Debug, Default)]
pub struct PickupRotation {
    queues: HashMap<String, VecDeque<TileType>>,
}

impl PickupRotation {
    /// Builds queues for levels `"1"..=level_count`.
    pub fn generate<R: Rng + ?Sized>(config: &PickupConfiguration, rng: &mut R) -> Self {
        let fixed_interval = config.fixed_interval.max(1);
        let needed: usize = (1..=config.level_count)
            .map(|level| if level % fixed_interval == 0 { 1 } else { 2 })
            .sum();
        let mut sequence = pickup_sequence(needed, rng).into_iter();

        let mut queues = HashMap::new();
        for level in 1..=config.level_count {
            let mut queue = VecDeque::new();
            if level % fixed_interval == 0 {
                queue.extend(FIXED_PICKUPS);
                queue.extend(sequence.next());
            } else {
                queue.extend(sequence.by_ref().take(2));
            }
            queues.insert(level.to_string(), queue);
        }
        PickupRotation { queues }
    }

    /// Rotation with an explicit queue per level key.
    pub fn from_queues<K: Into<String>, I: IntoIterator<Item = (K, Vec<TileType>)>>(
        queues: I,
    ) -> Self {
        PickupRotation {
            queues: queues
                .into_iter()
                .map(|(key, queue)| (key.into(), queue.into()))
                .collect(),
        }
    }

    /// Takes the next pickup for a level and moves it to the back of that level's queue.
    pub fn next_for(&mut self, level_key: &str) -> BuildResult<TileType> {
        let queue = self
            .queues
            .get_mut(level_key)
            .filter(|queue| !queue.is_empty())
            .ok_or_else(|| LevelBuildError::UnknownLevelKey(level_key.to_owned()))?;
        queue.rotate_left(1);
        Ok(queue[queue.len() - 1])
    }

    pub fn queue(&self, level_key: &str) -> Option<&VecDeque<TileType>> {
        self.queues.get(level_key)
    }

    pub fn len(&self) -> usize {
        self.queues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queues.is_empty()
    }
}

/// Generates `len` rotated pickups. Every aligned block of 8 holds each type exactly twice,
/// and no two neighbouring entries are the same type.
pub fn pickup_sequence<R: Rng + ?Sized>(len: usize, rng: &mut R) -> Vec<TileType> {
    let mut sequence: Vec<TileType> = Vec::with_capacity(len + BLOCK_LEN);
    while sequence.len() < len {
        let block = shuffled_block(sequence.last().copied(), rng);
        sequence.extend(block);
    }
    sequence.truncate(len);
    sequence
}

fn shuffled_block<R: Rng + ?Sized>(
    previous: Option<TileType>,
    rng: &mut R,
) -> [TileType; BLOCK_LEN] {
    let mut block = repeated(ROTATED_PICKUPS);
    for _ in 0..SHUFFLE_ATTEMPTS {
        block.shuffle(rng);
        if block_is_valid(&block, previous) {
            return block;
        }
    }
    log::debug!("pickup shuffle did not settle, using interleaved block");
    interleaved_block(previous, rng)
}

fn block_is_valid(block: &[TileType], previous: Option<TileType>) -> bool {
    previous != block.first().copied() && block.windows(2).all(|pair| pair[0] != pair[1])
}

/// A shuffled order of the 4 types repeated twice. It starts with something other than
/// `previous`, and the repeat cannot touch itself because all 4 types differ.
fn interleaved_block<R: Rng + ?Sized>(
    previous: Option<TileType>,
    rng: &mut R,
) -> [TileType; BLOCK_LEN] {
    let mut order = ROTATED_PICKUPS;
    order.shuffle(rng);
    if Some(order[0]) == previous {
        order.rotate_left(1);
    }
    repeated(order)
}

fn repeated(order: [TileType; 4]) -> [TileType; BLOCK_LEN] {
    let mut block = [order[0]; BLOCK_LEN];
    for (i, slot) in block.iter_mut().enumerate() {
        *slot = order[i % order.len()];
    }
    block
}
