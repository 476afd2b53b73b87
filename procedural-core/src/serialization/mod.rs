//! Generated map envelope: `{id, seed, dimensions, sectors, tiles, metadata}`.
//!
//! Maps are stored as JSON. Serialization is stable: every map inside the
//! envelope is ordered, so serializing the same value twice gives identical
//! bytes. Envelopes carry a `format_version`; documents written by a newer
//! version are rejected rather than misread.

use serde::{Deserialize, Serialize};

use crate::config::MapDimensions;
use crate::constants::{ENGINE_VERSION, MAP_FORMAT_VERSION};
use crate::error::{ContradictionError, MapFormatError};
use crate::generation::wfc::GenerationStatus;
use crate::model::{Metadata, Sector, TileInstance};

fn default_format_version() -> u32 {
    MAP_FORMAT_VERSION
}

fn default_engine_version() -> String {
    ENGINE_VERSION.to_string()
}

/// Counters describing one generated map
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MapStats {
    pub sector_count: usize,
    pub tile_count: usize,
    /// Placed tiles per grid cell, 0..=1
    pub density: f64,
    pub attempts: u32,
    pub solver_steps: usize,
    pub adjacency_violations: usize,
    pub elapsed_ms: f64,
}

/// Envelope metadata. `status` must always be present: a document that does
/// not record how its generation ended is rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapMetadata {
    #[serde(default = "default_format_version")]
    pub format_version: u32,
    #[serde(default = "default_engine_version")]
    pub engine_version: String,
    /// SHA3-256 over the seed, sectors and tiles (hex)
    #[serde(default)]
    pub generation_hash: String,
    pub status: GenerationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contradiction: Option<ContradictionError>,
    #[serde(default)]
    pub stats: MapStats,
    /// Free-form keys added by callers
    #[serde(flatten)]
    pub extra: Metadata,
}

impl Default for MapMetadata {
    fn default() -> Self {
        Self {
            format_version: default_format_version(),
            engine_version: default_engine_version(),
            generation_hash: String::new(),
            status: GenerationStatus::Complete,
            contradiction: None,
            stats: MapStats::default(),
            extra: Metadata::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedMap {
    pub id: String,
    pub seed: String,
    pub dimensions: MapDimensions,
    #[serde(default)]
    pub sectors: Vec<Sector>,
    #[serde(default)]
    pub tiles: Vec<TileInstance>,
    pub metadata: MapMetadata,
}

impl GeneratedMap {
    pub fn status(&self) -> GenerationStatus {
        self.metadata.status
    }

    pub fn is_complete(&self) -> bool {
        self.metadata.status == GenerationStatus::Complete
    }

    pub fn sector(&self, id: &str) -> Option<&Sector> {
        self.sectors.iter().find(|s| s.id == id)
    }
}

/// Pretty-printed JSON envelope
pub fn serialize_map(map: &GeneratedMap) -> Result<String, MapFormatError> {
    Ok(serde_json::to_string_pretty(map)?)
}

/// Parse an envelope. Missing `sectors`/`tiles` read as empty lists;
/// `metadata.status` is required.
pub fn deserialize_map(json: &str) -> Result<GeneratedMap, MapFormatError> {
    Ok(serde_json::from_str(json)?)
}

/// Size in bytes of the serialized envelope
pub fn serialized_size(map: &GeneratedMap) -> Result<usize, MapFormatError> {
    Ok(serialize_map(map)?.len())
}

/// Check envelope integrity: identity fields, positive dimensions, and that
/// every tile and sector lies inside the map.
pub fn validate_map(map: &GeneratedMap) -> Result<(), MapFormatError> {
    if map.id.is_empty() {
        return Err(MapFormatError::Invalid("empty map id".into()));
    }
    if map.seed.is_empty() {
        return Err(MapFormatError::Invalid("empty seed".into()));
    }
    if map.metadata.format_version > MAP_FORMAT_VERSION {
        return Err(MapFormatError::Invalid(format!(
            "format version {} is newer than supported {}",
            map.metadata.format_version, MAP_FORMAT_VERSION
        )));
    }

    let dims = map.dimensions;
    if dims.width == 0 || dims.height == 0 || dims.depth == 0 {
        return Err(MapFormatError::Invalid(format!(
            "non-positive dimensions {}x{}x{}",
            dims.width, dims.height, dims.depth
        )));
    }

    if let Some(tile) = map
        .tiles
        .iter()
        .find(|t| t.x >= dims.width || t.y >= dims.height || t.z >= dims.depth)
    {
        return Err(MapFormatError::Invalid(format!(
            "tile '{}' at ({}, {}, {}) lies outside the map",
            tile.tile_id, tile.x, tile.y, tile.z
        )));
    }

    if let Some(sector) = map.sectors.iter().find(|s| {
        let b = &s.bounds;
        b.x as u64 + b.width as u64 > dims.width as u64
            || b.y as u64 + b.height as u64 > dims.height as u64
            || b.z as u64 + b.depth as u64 > dims.depth as u64
    }) {
        return Err(MapFormatError::Invalid(format!(
            "sector '{}' extends outside the map",
            sector.id
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Bounds, Position, SectorRole};

    fn sample_map() -> GeneratedMap {
        let mut sector = Sector::new("sector_bsp_0", Bounds::new(2, 2, 1), SectorRole::Hub);
        sector.tile_ids = Some(vec!["0_0_0".into(), "1_1_0".into()]);
        let mut tile = TileInstance::new("floor", Position::new(0, 0, 0));
        tile.metadata.insert("sector".into(), "sector_bsp_0".into());

        let mut metadata = MapMetadata::default();
        metadata.generation_hash = "ab".repeat(32);
        metadata.stats.tile_count = 2;
        metadata.stats.density = 0.5;
        metadata.extra.insert("theme".into(), "crypt".into());

        GeneratedMap {
            id: "map_abababababababab".into(),
            seed: "test-1".into(),
            dimensions: MapDimensions {
                width: 2,
                height: 2,
                depth: 1,
            },
            sectors: vec![sector],
            tiles: vec![tile, TileInstance::new("wall", Position::new(1, 1, 0))],
            metadata,
        }
    }

    #[test]
    fn test_roundtrip_and_stable_bytes() {
        let map = sample_map();
        let first = serialize_map(&map).unwrap();
        let second = serialize_map(&map).unwrap();
        assert_eq!(first, second);

        let back = deserialize_map(&first).unwrap();
        assert_eq!(back, map);
        assert_eq!(serialize_map(&back).unwrap(), first);
        assert_eq!(serialized_size(&map).unwrap(), first.len());
    }

    #[test]
    fn test_extra_metadata_is_flattened() {
        let json = serialize_map(&sample_map()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["metadata"]["theme"], "crypt");
        assert_eq!(value["metadata"]["status"], "complete");
        assert!(value["metadata"].get("contradiction").is_none());
    }

    #[test]
    fn test_missing_lists_default_to_empty() {
        let json = r#"{"id": "m", "seed": "s",
            "dimensions": {"width": 1, "height": 1, "depth": 1},
            "metadata": {"status": "contradiction"}}"#;
        let map = deserialize_map(json).unwrap();
        assert!(map.sectors.is_empty());
        assert!(map.tiles.is_empty());
        assert_eq!(map.metadata.format_version, MAP_FORMAT_VERSION);
        assert_eq!(map.status(), GenerationStatus::Contradiction);
        assert!(validate_map(&map).is_ok());
    }

    #[test]
    fn test_unrecorded_status_is_rejected() {
        let no_metadata = r#"{"id": "m", "seed": "s",
            "dimensions": {"width": 1, "height": 1, "depth": 1}}"#;
        assert!(matches!(deserialize_map(no_metadata), Err(MapFormatError::Json(_))));

        let no_status = r#"{"id": "m", "seed": "s",
            "dimensions": {"width": 1, "height": 1, "depth": 1},
            "metadata": {"generation_hash": "ab"}}"#;
        let err = deserialize_map(no_status).unwrap_err();
        assert!(err.to_string().contains("status"));
    }

    #[test]
    fn test_malformed_json_is_format_error() {
        assert!(matches!(deserialize_map("{\"id\": 3"), Err(MapFormatError::Json(_))));
    }

    #[test]
    fn test_validate_rejects_bad_envelopes() {
        let mut map = sample_map();
        map.id.clear();
        assert!(validate_map(&map).is_err());

        let mut map = sample_map();
        map.seed.clear();
        assert!(validate_map(&map).is_err());

        let mut map = sample_map();
        map.dimensions.depth = 0;
        assert!(validate_map(&map).is_err());

        let mut map = sample_map();
        map.tiles.push(TileInstance::new("floor", Position::new(0, 0, 1)));
        let err = validate_map(&map).unwrap_err();
        assert!(err.to_string().contains("outside"));

        let mut map = sample_map();
        map.sectors[0].bounds.width = 3;
        assert!(validate_map(&map).is_err());

        let mut map = sample_map();
        map.metadata.format_version = MAP_FORMAT_VERSION + 1;
        assert!(validate_map(&map).is_err());

        assert!(validate_map(&sample_map()).is_ok());
    }
}
