pub mod authored;
mod common;
pub mod configuration;
pub mod door;
pub mod error;
pub mod event;
pub mod flip;
pub mod geometry;
pub mod level;
pub mod level_data;
pub mod pathfinder;
pub mod pickup;
pub mod prelude;
pub mod store;
pub mod tile;
pub mod tile_type;

pub use common::{Compass, GridPoints, NEIGHBOR_OFFSETS};
pub use configuration::LevelConfiguration;
pub use door::{Door, DoorKind};
pub use error::{BuildResult, ConfigError, LevelBuildError};
pub use level::Level;
pub use level_data::{LevelComposition, LevelData};
pub use store::GameStore;
pub use tile::{Face, Tile};
pub use tile_type::TileType;
