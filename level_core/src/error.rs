use std::sync::Arc;

use bevy::prelude::{IVec2, UVec2};
use thiserror::Error;

use crate::door::DoorKind;

/// Which edge scan of the ground layer came up empty.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Edge {
    Top,
    Bottom,
    Left,
    Right,
}

/// Fatal level construction errors. There is no recovery from these: the level cannot be
/// built from the data it was given.
#[derive(Clone, Debug, Error)]
pub enum LevelBuildError {
    #[error("authored map could not be parsed: {0}")]
    InvalidMap(#[from] Arc<serde_json::Error>),
    #[error("authored map has no [{0}] layer")]
    MissingLayer(&'static str),
    #[error("layer [{layer}] has {actual} cells, expected {expected}")]
    LayerSizeMismatch {
        layer: String,
        expected: usize,
        actual: usize,
    },
    #[error("ground layer scan from the {edge:?} edge found no tiles")]
    EmptyGround { edge: Edge },
    #[error("no {0:?} door marker found")]
    MissingDoor(DoorKind),
    #[error("more than one {0:?} door found")]
    DuplicateDoor(DoorKind),
    #[error("{door:?} door at map point {map_point} lies outside the {width}x{height} board")]
    DoorOutOfBounds {
        door: DoorKind,
        map_point: IVec2,
        width: u32,
        height: u32,
    },
    #[error(
        "composition needs {required} cells (including both doors) but the board only has {available}"
    )]
    CompositionOverflow { required: usize, available: usize },
    #[error("{0} lies outside the board")]
    PointOutOfBounds(UVec2),
    #[error("unknown layout glyph [{glyph}] at row {row}, column {column}")]
    UnknownGlyph {
        glyph: String,
        row: usize,
        column: usize,
    },
    #[error("layout row {row} has {actual} cells, expected {expected}")]
    RaggedLayout {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[error("no pickup rotation registered for level [{0}]")]
    UnknownLevelKey(String),
}

impl From<serde_json::Error> for LevelBuildError {
    fn from(value: serde_json::Error) -> Self {
        Self::InvalidMap(Arc::new(value))
    }
}

#[derive(Clone, Debug, Error)]
pub enum ConfigError {
    #[error("error reading level configuration: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type BuildResult<T> = std::result::Result<T, LevelBuildError>;
