use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Integer grid coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl Position {
    pub fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }
}

/// Primitive metadata value (string, number, or bool)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl From<bool> for MetadataValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for MetadataValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Open string-keyed metadata map; ordered so serialization is stable
pub type Metadata = BTreeMap<String, MetadataValue>;

/// A solved tile placed at a grid coordinate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileInstance {
    pub tile_id: String,
    pub x: u32,
    pub y: u32,
    pub z: u32,
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
}

impl TileInstance {
    pub fn new(tile_id: impl Into<String>, pos: Position) -> Self {
        Self {
            tile_id: tile_id.into(),
            x: pos.x,
            y: pos.y,
            z: pos.z,
            metadata: Metadata::new(),
        }
    }

    pub fn position(&self) -> Position {
        Position::new(self.x, self.y, self.z)
    }

    /// Stable instance key `x_y_z`, used by sectors to list their tiles
    pub fn key(&self) -> String {
        format!("{}_{}_{}", self.x, self.y, self.z)
    }
}
