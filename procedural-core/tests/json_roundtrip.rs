/// Integration tests: JSON round-trip of generated maps and config documents.
///
/// Simulates the consumer pattern:
///   1. Generate a map from a seed
///   2. Serialize the envelope to JSON
///   3. Parse it back (client-side validation)
///   4. Verify tiles, sectors and metadata survive unchanged
use mapgen_core::serialization::{deserialize_map, serialize_map, serialized_size, validate_map};
use mapgen_core::{
    Direction, GeneratedMap, GenerationStatus, MapDimensions, MapGenConfig, MapGenerator,
    TileCatalog, TileDefinition, WfcConfig,
};

// ============================================================
// Helpers
// ============================================================

fn meadow_catalog() -> TileCatalog {
    TileCatalog::new(vec![
        TileDefinition::new("grass", "ground")
            .with_weight(3.0)
            .with_tags(&["soft", "green"])
            .allow_all(&["grass", "path"]),
        TileDefinition::new("path", "ground").allow_all(&["grass", "path"]),
    ])
    .unwrap()
}

fn generate(seed: &str) -> GeneratedMap {
    let config = MapGenConfig {
        dimensions: MapDimensions {
            width: 16,
            height: 12,
            depth: 2,
        },
        ..MapGenConfig::default()
    };
    MapGenerator::new(config, meadow_catalog())
        .unwrap()
        .generate(seed)
}

// ============================================================
// Map envelope round-trip
// ============================================================

#[test]
fn test_generated_map_roundtrip() {
    let map = generate("harbor");
    assert!(validate_map(&map).is_ok());

    let json = serialize_map(&map).unwrap();
    let back = deserialize_map(&json).unwrap();
    assert_eq!(back.sectors, map.sectors);
    assert_eq!(back.tiles, map.tiles);
    assert_eq!(back.metadata.generation_hash, map.metadata.generation_hash);
    assert_eq!(back.metadata.stats.tile_count, map.tiles.len());
}

#[test]
fn test_repeated_serialization_is_byte_identical() {
    let map = generate("lighthouse");
    let a = serialize_map(&map).unwrap();
    let b = serialize_map(&map).unwrap();
    assert_eq!(a, b);
    assert_eq!(serialized_size(&map).unwrap(), a.len());
}

#[test]
fn test_envelope_shape() {
    let map = generate("pier");
    let value: serde_json::Value = serde_json::from_str(&serialize_map(&map).unwrap()).unwrap();

    for key in ["id", "seed", "dimensions", "sectors", "tiles", "metadata"] {
        assert!(value.get(key).is_some(), "missing envelope key {key}");
    }
    assert_eq!(value["seed"], "pier");
    assert_eq!(value["dimensions"]["width"], 16);
    assert_eq!(value["metadata"]["status"], "complete");

    let first_tile = &value["tiles"][0];
    assert!(first_tile["tile_id"].is_string());
    assert!(first_tile["metadata"]["sector"].is_string());

    let first_sector = &value["sectors"][0];
    assert!(first_sector["bounds"]["width"].is_u64());
    assert!(first_sector["tile_ids"].is_array());
}

#[test]
fn test_contradiction_metadata_survives_roundtrip() {
    // a → b → c → a: the first collapse is always rejected by its neighbour
    let catalog = TileCatalog::new(vec![
        TileDefinition::new("a", "cycle").allow_planar(&["b"]),
        TileDefinition::new("b", "cycle").allow_planar(&["c"]),
        TileDefinition::new("c", "cycle").allow_planar(&["a"]),
    ])
    .unwrap();
    let config = MapGenConfig {
        dimensions: MapDimensions {
            width: 3,
            height: 3,
            depth: 1,
        },
        ..MapGenConfig::default()
    };
    let map = MapGenerator::new(config, catalog).unwrap().generate("cycle");
    assert_eq!(map.metadata.status, GenerationStatus::Contradiction);
    let contradiction = map.metadata.contradiction.clone().unwrap();
    assert_eq!(contradiction.position.x, 0);
    assert_eq!(contradiction.position.y, 0);
    assert_eq!(contradiction.exhausted.len(), 1);

    let json = serialize_map(&map).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["metadata"]["status"], "contradiction");

    let back = deserialize_map(&json).unwrap();
    assert_eq!(back.metadata.status, GenerationStatus::Contradiction);
    assert_eq!(back.metadata.contradiction, Some(contradiction));
    assert_eq!(back.tiles, map.tiles);
}

// ============================================================
// Config documents
// ============================================================

#[test]
fn test_wfc_config_json_roundtrip() {
    let config = WfcConfig::new(
        4,
        4,
        1,
        meadow_catalog(),
        mapgen_core::Distribution::Uniform,
    )
    .unwrap()
    .with_max_attempts(5);

    let json = serde_json::to_string(&config).unwrap();
    let back: WfcConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, config);
    assert_eq!(back.tiles().get(0).unwrap().tags, vec!["soft", "green"]);
}

#[test]
fn test_catalog_json_uses_domain_vocabulary() {
    let json = r#"[
        {"id": "floor", "category": "ground", "weight": 2.0,
         "adjacency": [{"direction": "north", "compatible": ["floor", "door"]}]},
        {"id": "door", "category": "structure", "weight": 0.5}
    ]"#;
    let catalog: TileCatalog = serde_json::from_str(json).unwrap();
    assert_eq!(catalog.len(), 2);
    let floor = catalog.index_of("floor").unwrap();
    let door = catalog.index_of("door").unwrap();
    assert!(catalog.allows(floor, Direction::North, door));
    // No rule declared → unconstrained
    assert!(catalog.allows(floor, Direction::South, door));
    assert!(catalog.allows(door, Direction::Up, floor));
}

#[test]
fn test_map_config_ron_and_json_agree() {
    let json = r#"{"dimensions": {"width": 20, "height": 20, "depth": 1},
                   "partition": {"max_depth": 3, "min_edge_length": 4},
                   "solver": {"distribution": "uniform", "max_attempts": 10}}"#;
    let from_json = MapGenConfig::from_json(json).unwrap();
    let from_ron = MapGenConfig::from_ron(&from_json.to_ron_pretty().unwrap()).unwrap();
    assert_eq!(from_json, from_ron);
}
