use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::door::DoorKind;

/// Everything a board cell can hold. Parsed from the `type` property of authored tiles.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TileType {
    Blank,
    Entrance,
    Exit,
    Wall,
    Enemy,
    ScrambleEnemy,
    SuperEnemy,
    Boss,
    Gold,
    Key,
    Compass,
    Sniper,
    Emp,
    Ammo,
    Alert,
    Upgrade,
    Weapon,
    Shop,
}

/// What revealing a tile of a given type does. See [`TileType::content`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TileContent {
    Empty,
    Door(DoorKind),
    /// Collected as soon as the reveal finishes.
    Pickup(TileType),
    /// Stays on the board until the game flow consumes it.
    Hostile(TileType),
    Shop,
}

#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("unrecognized tile type [{0}]")]
pub struct UnknownTileType(pub String);

impl TileType {
    pub const ALL: [TileType; 18] = [
        TileType::Blank,
        TileType::Entrance,
        TileType::Exit,
        TileType::Wall,
        TileType::Enemy,
        TileType::ScrambleEnemy,
        TileType::SuperEnemy,
        TileType::Boss,
        TileType::Gold,
        TileType::Key,
        TileType::Compass,
        TileType::Sniper,
        TileType::Emp,
        TileType::Ammo,
        TileType::Alert,
        TileType::Upgrade,
        TileType::Weapon,
        TileType::Shop,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TileType::Blank => "BLANK",
            TileType::Entrance => "ENTRANCE",
            TileType::Exit => "EXIT",
            TileType::Wall => "WALL",
            TileType::Enemy => "ENEMY",
            TileType::ScrambleEnemy => "SCRAMBLE_ENEMY",
            TileType::SuperEnemy => "SUPER_ENEMY",
            TileType::Boss => "BOSS",
            TileType::Gold => "GOLD",
            TileType::Key => "KEY",
            TileType::Compass => "COMPASS",
            TileType::Sniper => "SNIPER",
            TileType::Emp => "EMP",
            TileType::Ammo => "AMMO",
            TileType::Alert => "ALERT",
            TileType::Upgrade => "UPGRADE",
            TileType::Weapon => "WEAPON",
            TileType::Shop => "SHOP",
        }
    }

    pub fn is_enemy(&self) -> bool {
        matches!(
            self,
            TileType::Enemy
                | TileType::ScrambleEnemy
                | TileType::SuperEnemy
                | TileType::Boss
        )
    }

    pub fn is_pickup(&self) -> bool {
        matches!(
            self,
            TileType::Gold
                | TileType::Key
                | TileType::Compass
                | TileType::Sniper
                | TileType::Emp
                | TileType::Ammo
                | TileType::Alert
                | TileType::Upgrade
                | TileType::Weapon
        )
    }

    pub fn is_door(&self) -> bool {
        matches!(self, TileType::Entrance | TileType::Exit)
    }

    pub fn content(&self) -> TileContent {
        match self {
            TileType::Blank | TileType::Wall => TileContent::Empty,
            TileType::Entrance => TileContent::Door(DoorKind::Entrance),
            TileType::Exit => TileContent::Door(DoorKind::Exit),
            TileType::Shop => TileContent::Shop,
            enemy if enemy.is_enemy() => TileContent::Hostile(*enemy),
            pickup => TileContent::Pickup(*pickup),
        }
    }
}

impl fmt::Display for TileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TileType {
    type Err = UnknownTileType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TileType::ALL
            .iter()
            .find(|tile_type| tile_type.as_str() == s)
            .copied()
            .ok_or_else(|| UnknownTileType(s.to_owned()))
    }
}
