use bevy::utils::HashMap;
use serde::{Deserialize, Serialize};

use crate::event::{EventChannel, ListenerId};
use crate::tile_type::TileType;

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum StoreChange {
    /// Inventory count for a pickup type changed to `count`.
    Inventory { item: TileType, count: u32 },
    LevelKey(Option<String>),
}

/// Session state shared by the levels of a run: collected pickups and the current level key.
///
/// Owned by the game-flow layer and handed to the level by reference when pickups need to
/// be applied.
#[derive(Debug, Default)]
pub struct GameStore {
    inventory: HashMap<TileType, u32>,
    level_key: Option<String>,
    changes: EventChannel<StoreChange>,
}

impl GameStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, item: TileType) -> u32 {
        self.inventory.get(&item).copied().unwrap_or(0)
    }

    pub fn gold(&self) -> u32 {
        self.count(TileType::Gold)
    }

    pub fn ammo(&self) -> u32 {
        self.count(TileType::Ammo)
    }

    pub fn keys(&self) -> u32 {
        self.count(TileType::Key)
    }

    pub fn level_key(&self) -> Option<&str> {
        self.level_key.as_deref()
    }

    pub fn set_level_key<S: Into<String>>(&mut self, level_key: Option<S>) {
        let level_key = level_key.map(Into::into);
        if self.level_key != level_key {
            self.level_key = level_key.clone();
            self.changes.send(StoreChange::LevelKey(level_key));
        }
    }

    /// Adds one of `pickup` to the inventory. Returns false for types that are not pickups.
    pub fn apply_pickup(&mut self, pickup: TileType) -> bool {
        if !pickup.is_pickup() {
            log::warn!("[{pickup}] is not a pickup, store unchanged");
            return false;
        }
        let count = self.inventory.entry(pickup).or_insert(0);
        *count += 1;
        let count = *count;
        log::debug!("collected [{pickup}], now holding {count}");
        self.changes.send(StoreChange::Inventory {
            item: pickup,
            count,
        });
        true
    }

    /// Uses up one of `item`. Returns false if there was none to spend.
    pub fn spend(&mut self, item: TileType) -> bool {
        let Some(count) = self.inventory.get_mut(&item).filter(|count| **count > 0) else {
            return false;
        };
        *count -= 1;
        let count = *count;
        self.changes.send(StoreChange::Inventory { item, count });
        true
    }

    pub fn subscribe<F: FnMut(&StoreChange) + 'static>(&mut self, listener: F) -> ListenerId {
        self.changes.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.changes.unsubscribe(id)
    }

    pub fn drain_changes(&mut self) -> Vec<StoreChange> {
        self.changes.drain()
    }
}
