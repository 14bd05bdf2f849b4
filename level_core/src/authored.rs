//! Read-only model of the authored map format: a Tiled-style JSON document with tile
//! layers, object layers and tileset metadata.

use bevy::prelude::{IVec2, Vec2};
use bevy::utils::HashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{BuildResult, LevelBuildError};

pub const GROUND_LAYER: &str = "Tiles";
pub const OVERLAY_LAYER: &str = "Assets";
pub const DECORATION_LAYER: &str = "Decorations";

/// Tiled keeps flip and rotation flags in the top three bits of a gid.
const GID_MASK: u32 = 0x1FFF_FFFF;

const TYPE_PROPERTY: &str = "type";
const FRAME_PROPERTY: &str = "frameName";
const DOOR_EXIT_PROPERTY: &str = "doorExit";
const DOOR_ENTRANCE_PROPERTY: &str = "doorEntrance";

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct AuthoredMap {
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub tilewidth: Option<u32>,
    #[serde(default)]
    pub tileheight: Option<u32>,
    pub layers: Vec<Layer>,
    #[serde(default)]
    pub tilesets: Vec<Tileset>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Layer {
    #[serde(rename = "tilelayer")]
    Tiles(TileLayer),
    #[serde(rename = "objectgroup")]
    Objects(ObjectLayer),
    /// Image and group layers carry nothing the level reads.
    #[serde(other)]
    Other,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct TileLayer {
    pub name: String,
    pub width: u32,
    pub height: u32,
    /// Row-major global tile ids, 0 for an empty cell.
    pub data: Vec<u32>,
    #[serde(default)]
    pub offsetx: f32,
    #[serde(default)]
    pub offsety: f32,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ObjectLayer {
    pub name: String,
    #[serde(default)]
    pub objects: Vec<MapObject>,
    #[serde(default)]
    pub offsetx: f32,
    #[serde(default)]
    pub offsety: f32,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct MapObject {
    #[serde(default)]
    pub id: u32,
    #[serde(default)]
    pub gid: Option<u32>,
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub width: f32,
    #[serde(default)]
    pub height: f32,
    #[serde(default)]
    pub polygon: Option<Vec<PolygonPoint>>,
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct PolygonPoint {
    pub x: f32,
    pub y: f32,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Tileset {
    pub firstgid: u32,
    #[serde(default)]
    pub tiles: Vec<TilesetTile>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct TilesetTile {
    pub id: u32,
    #[serde(default)]
    pub properties: Vec<Property>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Property {
    pub name: String,
    #[serde(rename = "type", default)]
    pub property_type: Option<String>,
    pub value: Value,
}

/// Authored properties of a single tile id, flattened from tileset metadata.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TileProperties {
    pub tile_type: Option<String>,
    pub frame_name: Option<String>,
    pub door_exit: bool,
    pub door_entrance: bool,
}

/// Lookup table from global tile id to its authored properties.
#[derive(Clone, Debug, Default)]
pub struct TileCatalog {
    tiles: HashMap<u32, TileProperties>,
}

impl AuthoredMap {
    pub fn from_json_str(json: &str) -> BuildResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn tile_layer(&self, name: &str) -> Option<&TileLayer> {
        self.layers.iter().find_map(|layer| match layer {
            Layer::Tiles(tiles) if tiles.name == name => Some(tiles),
            _ => None,
        })
    }

    pub fn required_tile_layer(&self, name: &'static str) -> BuildResult<&TileLayer> {
        let layer = self
            .tile_layer(name)
            .ok_or(LevelBuildError::MissingLayer(name))?;
        layer.validate()?;
        Ok(layer)
    }

    pub fn object_layer(&self, name: &str) -> Option<&ObjectLayer> {
        self.layers.iter().find_map(|layer| match layer {
            Layer::Objects(objects) if objects.name == name => Some(objects),
            _ => None,
        })
    }

    pub fn tile_size(&self, fallback: Vec2) -> Vec2 {
        Vec2::new(
            self.tilewidth.map(|w| w as f32).unwrap_or(fallback.x),
            self.tileheight.map(|h| h as f32).unwrap_or(fallback.y),
        )
    }

    pub fn catalog(&self) -> TileCatalog {
        TileCatalog::from_tilesets(&self.tilesets)
    }
}

impl TileLayer {
    /// The gid at a map point, `None` for empty or out-of-range cells. Flip and rotation
    /// flags are stripped.
    pub fn gid_at(&self, pt: IVec2) -> Option<u32> {
        if pt.x < 0 || pt.y < 0 || pt.x as u32 >= self.width || pt.y as u32 >= self.height {
            return None;
        }
        let index = pt.y as usize * self.width as usize + pt.x as usize;
        self.data
            .get(index)
            .map(|gid| gid & GID_MASK)
            .filter(|gid| *gid != 0)
    }

    pub fn offset(&self) -> Vec2 {
        Vec2::new(self.offsetx, self.offsety)
    }

    fn validate(&self) -> BuildResult<()> {
        let expected = self.width as usize * self.height as usize;
        if self.data.len() != expected {
            return Err(LevelBuildError::LayerSizeMismatch {
                layer: self.name.clone(),
                expected,
                actual: self.data.len(),
            });
        }
        Ok(())
    }
}

impl ObjectLayer {
    pub fn offset(&self) -> Vec2 {
        Vec2::new(self.offsetx, self.offsety)
    }
}

impl MapObject {
    pub fn is_placeholder(&self) -> bool {
        self.gid.is_some()
    }

    /// Outline of a region object in pixels, relative to the layer.
    pub fn outline(&self) -> Vec<Vec2> {
        let anchor = Vec2::new(self.x, self.y);
        match &self.polygon {
            Some(points) => points
                .iter()
                .map(|pt| anchor + Vec2::new(pt.x, pt.y))
                .collect(),
            None => vec![
                anchor,
                anchor + Vec2::new(self.width, 0.0),
                anchor + Vec2::new(self.width, self.height),
                anchor + Vec2::new(0.0, self.height),
            ],
        }
    }

    /// Visual centre of a placeholder tile object. Tile objects are anchored at their
    /// bottom-left corner.
    pub fn placeholder_center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y - self.height / 2.0)
    }
}

impl TileCatalog {
    pub fn from_tilesets(tilesets: &[Tileset]) -> Self {
        let tiles = tilesets
            .iter()
            .flat_map(|tileset| {
                tileset.tiles.iter().map(move |tile| {
                    (
                        tileset.firstgid + tile.id,
                        TileProperties::from_properties(&tile.properties),
                    )
                })
            })
            .collect();
        TileCatalog { tiles }
    }

    pub fn get(&self, gid: u32) -> Option<&TileProperties> {
        self.tiles.get(&gid)
    }

    pub fn insert(&mut self, gid: u32, properties: TileProperties) {
        self.tiles.insert(gid, properties);
    }
}

impl TileProperties {
    fn from_properties(properties: &[Property]) -> Self {
        let mut result = TileProperties::default();
        for property in properties {
            match property.name.as_str() {
                TYPE_PROPERTY => result.tile_type = property.value.as_str().map(str::to_owned),
                FRAME_PROPERTY => result.frame_name = property.value.as_str().map(str::to_owned),
                DOOR_EXIT_PROPERTY => result.door_exit = property.value.as_bool().unwrap_or(false),
                DOOR_ENTRANCE_PROPERTY => {
                    result.door_entrance = property.value.as_bool().unwrap_or(false)
                },
                other => log::trace!("ignoring tile property [{other}]"),
            }
        }
        result
    }
}

#[cfg(test)]
mod test {
    use test_log::test;

    use super::*;

    const SMALL_MAP: &str = r#"{
        "width": 2,
        "height": 2,
        "tilewidth": 16,
        "layers": [
            { "type": "tilelayer", "name": "Tiles", "width": 2, "height": 2, "data": [1, 1, 0, 1] },
            { "type": "objectgroup", "name": "RandomEnemy", "objects": [
                { "id": 3, "x": 0, "y": 0, "width": 32, "height": 16 },
                { "id": 4, "gid": 2, "x": 0, "y": 16, "width": 16, "height": 16 }
            ] }
        ],
        "tilesets": [ { "firstgid": 1, "tiles": [
            { "id": 1, "properties": [
                { "name": "type", "type": "string", "value": "ENEMY" },
                { "name": "frameName", "type": "string", "value": "enemy_01" }
            ] },
            { "id": 2, "properties": [ { "name": "doorExit", "type": "bool", "value": true } ] }
        ] } ]
    }"#;

    #[test]
    fn parses_layers_and_tilesets() {
        let map = AuthoredMap::from_json_str(SMALL_MAP).expect("map should parse");
        let ground = map.required_tile_layer(GROUND_LAYER).expect("ground layer");
        assert_eq!(ground.gid_at(IVec2::new(0, 0)), Some(1));
        assert_eq!(ground.gid_at(IVec2::new(0, 1)), None);
        assert_eq!(ground.gid_at(IVec2::new(-1, 0)), None);
        assert!(map.object_layer("RandomEnemy").is_some());
        assert!(map.object_layer("RandomKey").is_none());
        assert_eq!(map.tile_size(Vec2::splat(32.0)), Vec2::new(16.0, 32.0));

        let catalog = map.catalog();
        let enemy = catalog.get(2).expect("gid 2 should be cataloged");
        assert_eq!(enemy.tile_type.as_deref(), Some("ENEMY"));
        assert_eq!(enemy.frame_name.as_deref(), Some("enemy_01"));
        assert!(catalog.get(3).expect("gid 3").door_exit);
    }

    #[test]
    fn flipped_tiles_and_extra_layers() {
        let map = AuthoredMap::from_json_str(
            r#"{
            "width": 2,
            "height": 1,
            "layers": [
                { "type": "imagelayer", "name": "Backdrop", "image": "sky.png" },
                { "type": "group", "name": "Props", "layers": [] },
                { "type": "tilelayer", "name": "Tiles", "width": 2, "height": 1,
                  "data": [2147483649, 3221225473] }
            ]
        }"#,
        )
        .expect("unread layer types should be skipped");
        let ground = map.required_tile_layer(GROUND_LAYER).expect("ground layer");
        assert_eq!(ground.gid_at(IVec2::new(0, 0)), Some(1));
        assert_eq!(ground.gid_at(IVec2::new(1, 0)), Some(1));
        assert_eq!(map.layers.len(), 3);
    }

    #[test]
    fn missing_layer_is_fatal() {
        let map = AuthoredMap::from_json_str(SMALL_MAP).expect("map should parse");
        assert!(matches!(
            map.required_tile_layer(OVERLAY_LAYER),
            Err(LevelBuildError::MissingLayer(OVERLAY_LAYER))
        ));
    }

    #[test]
    fn region_outlines() {
        let rect = MapObject {
            id: 1,
            gid: None,
            x: 10.0,
            y: 20.0,
            width: 30.0,
            height: 40.0,
            polygon: None,
        };
        assert_eq!(rect.outline()[2], Vec2::new(40.0, 60.0));
        let placeholder = MapObject {
            gid: Some(5),
            ..rect.clone()
        };
        assert!(placeholder.is_placeholder());
        assert_eq!(placeholder.placeholder_center(), Vec2::new(25.0, 0.0));
    }
}
