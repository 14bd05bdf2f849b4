pub use bevy::prelude::{IVec2, UVec2, Vec2};
pub use bevy::utils::HashMap;

pub use crate::common::*;
pub use crate::configuration::{LevelConfiguration, PickupConfiguration};
pub use crate::door::{Door, DoorKind};
pub use crate::event::{EventChannel, LevelEvent, ListenerId, SoundCue};
pub use crate::flip::{BatchId, FlipProgress, FlipTimeline};
pub use crate::level::Level;
pub use crate::level_data::{LevelComposition, LevelData};
pub use crate::pickup::PickupRotation;
pub use crate::store::{GameStore, StoreChange};
pub use crate::tile::{DataTile, Face, Tile};
pub use crate::tile_type::{TileContent, TileType};
