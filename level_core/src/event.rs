use std::fmt;

use bevy::prelude::UVec2;
use serde::{Deserialize, Serialize};

use crate::door::DoorKind;
use crate::flip::BatchId;
use crate::tile::Face;
use crate::tile_type::TileType;

/// Everything the level tells the outside world. Presentation and game flow react to these;
/// the level never calls into them directly.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum LevelEvent {
    TileFlipStarted { position: UVec2, face: Face },
    /// Halfway through a front flip, when the contents become visible.
    TileContentsShown { position: UVec2 },
    TileFlipped { position: UVec2, face: Face },
    BatchFlipped { batch: BatchId },
    ContentCollected { position: UVec2, pickup: TileType },
    EnemyEncountered { position: UVec2, enemy: TileType },
    ShopDiscovered { position: UVec2 },
    TileConsumed { position: UVec2 },
    ScrambleChanged { position: UVec2, scrambled: bool },
    HighlightChanged { position: UVec2, highlighted: bool },
    DoorHighlightChanged { door: DoorKind, highlighted: bool },
    DoorOpened { door: DoorKind },
    DoorClosed { door: DoorKind },
    InteractivityChanged { interactive: bool },
    SoundRequested { sound: SoundCue },
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum SoundCue {
    TileFlip,
    DoorOpen,
    DoorClose,
    PickupCollected,
    KeyCollected,
    EnemyRevealed,
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct ListenerId(usize);

type Listener<E> = Box<dyn FnMut(&E)>;

/// Per-component event stream. Events are handed to every subscribed listener as they are
/// sent, then queued until someone drains them.
pub struct EventChannel<E> {
    queue: Vec<E>,
    listeners: Vec<(ListenerId, Listener<E>)>,
    next_listener: usize,
}

impl<E> EventChannel<E> {
    pub fn new() -> Self {
        EventChannel {
            queue: Vec::new(),
            listeners: Vec::new(),
            next_listener: 0,
        }
    }

    pub fn send(&mut self, event: E) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(&event);
        }
        self.queue.push(event);
    }

    /// Takes every queued event, oldest first.
    pub fn drain(&mut self) -> Vec<E> {
        std::mem::take(&mut self.queue)
    }

    pub fn iter(&self) -> impl Iterator<Item = &E> {
        self.queue.iter()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn subscribe<F: FnMut(&E) + 'static>(&mut self, listener: F) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        before != self.listeners.len()
    }
}

impl<E> Default for EventChannel<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: fmt::Debug> fmt::Debug for EventChannel<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventChannel")
            .field("queue", &self.queue)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
