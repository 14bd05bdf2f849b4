use bevy::prelude::{IVec2, UVec2};
use getset::CopyGetters;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum DoorKind {
    Entrance,
    Exit,
}

/// ENTRANCE or EXIT. Occupies one board cell; the door's second visual row sits directly
/// above it.
#[derive(Clone, CopyGetters, Debug, PartialEq)]
#[getset(get_copy = "pub")]
pub struct Door {
    kind: DoorKind,
    position: UVec2,
    is_open: bool,
    is_tile_flipped: bool,
    is_highlighted: bool,
    /// Entrances open once and stay open.
    has_opened: bool,
}

impl Door {
    pub fn new(kind: DoorKind, position: UVec2) -> Self {
        Door {
            kind,
            position,
            is_open: false,
            is_tile_flipped: false,
            is_highlighted: false,
            has_opened: false,
        }
    }

    /// Opens the door. Returns false if it was already open.
    pub fn open(&mut self) -> bool {
        if self.is_open {
            return false;
        }
        self.is_open = true;
        self.has_opened = true;
        true
    }

    /// Closes the door. Returns false if it was already closed, or if this is an entrance
    /// that has been opened before.
    pub fn close(&mut self) -> bool {
        if !self.is_open {
            return false;
        }
        if self.kind == DoorKind::Entrance && self.has_opened {
            log::warn!("entrance at {} cannot be closed once opened", self.position);
            return false;
        }
        self.is_open = false;
        true
    }

    pub(crate) fn mark_flipped(&mut self) -> bool {
        !std::mem::replace(&mut self.is_tile_flipped, true)
    }

    pub(crate) fn set_highlighted(&mut self, highlighted: bool) -> bool {
        std::mem::replace(&mut self.is_highlighted, highlighted) != highlighted
    }

    /// Board-relative position of the door's upper visual row. May be above the board.
    pub fn upper_row(&self) -> IVec2 {
        self.position.as_ivec2() - IVec2::Y
    }
}
