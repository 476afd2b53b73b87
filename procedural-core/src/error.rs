//! Error taxonomy for map generation.
//!
//! - `ConfigurationError`: fatal, raised before any generation starts
//! - `ContradictionError`: a solver run emptied a cell; the caller decides
//!   whether to re-seed, accept a partial map, or give up
//! - `MapFormatError`: envelope parsing / integrity
//! - `GenerationError`: orchestrator-level failure

use serde::{Deserialize, Serialize};

use crate::model::{Axis, Direction, Position};

/// Invalid input detected while building a config or tile catalog
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Dimension {axis:?} must be positive, got {value}")]
    NonPositiveDimension { axis: Axis, value: u32 },
    #[error("Minimum sector edge length must be positive")]
    ZeroMinEdge,
    #[error("Tile catalog is empty")]
    EmptyCatalog,
    #[error("Duplicate tile id: {0}")]
    DuplicateTile(String),
    #[error("Tile '{tile}' references unknown tile '{reference}' towards {direction:?}")]
    UnknownTileReference {
        tile: String,
        direction: Direction,
        reference: String,
    },
    #[error("Tile '{tile}' has invalid weight {weight} (must be positive and finite)")]
    InvalidWeight { tile: String, weight: f64 },
    #[error("Tile weights sum to {total}, which is not a finite number")]
    WeightOverflow { total: f64 },
    #[error("Config document could not be parsed: {0}")]
    Parse(String),
    #[error("Config file could not be read: {0}")]
    Read(String),
    #[error("Config could not be serialized: {0}")]
    Serialize(String),
}

/// A cell's possibility set became empty during propagation.
///
/// `exhausted` holds the tile ids that were still possible at `position`
/// right before the failing intersection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[error("WFC contradiction at ({}, {}, {}): no valid tile", .position.x, .position.y, .position.z)]
pub struct ContradictionError {
    pub position: Position,
    pub exhausted: Vec<String>,
}

/// Failure reading a serialized map envelope
#[derive(Debug, thiserror::Error)]
pub enum MapFormatError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid map: {0}")]
    Invalid(String),
}

/// Failure of the map generation orchestrator
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
    #[error("No complete map after {attempts} attempts: {last}")]
    AttemptsExhausted {
        attempts: u32,
        last: ContradictionError,
    },
}
