//! Map Generation - Procedural Core Library
//!
//! Deterministic generation of volumetric tile maps:
//! - Spatial partitioning of a 3D volume into sectors (BSP)
//! - Tile placement by Wave Function Collapse over directional adjacency rules
//! - Seeded random sources (xoshiro via SHA3 seed hashing, reference LCG)
//! - Map assembly, retries, and parallel batches
//! - JSON map envelope with integrity checks
//!
//! Same seed + same config + same tile catalog = identical map.

pub mod config;
pub mod constants;
pub mod error;
pub mod generation;
pub mod logging;
pub mod model;
pub mod serialization;

pub use config::{MapDimensions, MapGenConfig};
pub use error::{ConfigurationError, ContradictionError, GenerationError, MapFormatError};
pub use generation::bsp::{BspNode, NodeKind, PartitionConfig};
pub use generation::pipeline::MapGenerator;
pub use generation::sector_graph::SectorGraph;
pub use generation::wfc::{Distribution, GenerationResult, GenerationStatus, WfcConfig};
pub use generation::{LcgRng, MapSeed, RandomSource, SeededRng};
pub use model::{
    AdjacencyRule, Axis, Bounds, Direction, Metadata, MetadataValue, Position, Sector,
    SectorRole, TileCatalog, TileDefinition, TileInstance,
};
pub use serialization::GeneratedMap;
