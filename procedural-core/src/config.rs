//! Map generation config document.
//!
//! Every field has a default, so a partial JSON or RON document only needs
//! the values it overrides. Validation happens when the document is turned
//! into solver/partitioner configs.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::constants::*;
use crate::error::ConfigurationError;
use crate::generation::bsp::PartitionConfig;
use crate::generation::wfc::{Distribution, WfcConfig};
use crate::logging::TracingConfig;
use crate::model::TileCatalog;

/// Map extent in grid cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapDimensions {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
}

impl Default for MapDimensions {
    fn default() -> Self {
        Self {
            width: DEFAULT_MAP_WIDTH,
            height: DEFAULT_MAP_HEIGHT,
            depth: DEFAULT_MAP_DEPTH,
        }
    }
}

impl MapDimensions {
    pub fn cell_count(&self) -> u64 {
        self.width as u64 * self.height as u64 * self.depth as u64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartitionSettings {
    pub max_depth: u32,
    pub min_edge_length: u32,
}

impl Default for PartitionSettings {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_BSP_MAX_DEPTH,
            min_edge_length: DEFAULT_MIN_EDGE_LENGTH,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverSettings {
    pub distribution: Distribution,
    /// Bound for `MapGenerator::generate_until_complete`
    pub max_attempts: u32,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            distribution: Distribution::Weighted,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MapGenConfig {
    pub dimensions: MapDimensions,
    pub partition: PartitionSettings,
    pub solver: SolverSettings,
    pub logging: TracingConfig,
}

impl MapGenConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigurationError> {
        serde_json::from_str(json).map_err(|e| ConfigurationError::Parse(e.to_string()))
    }

    pub fn from_ron(text: &str) -> Result<Self, ConfigurationError> {
        ron::from_str(text).map_err(|e| ConfigurationError::Parse(e.to_string()))
    }

    pub fn to_ron_pretty(&self) -> Result<String, ConfigurationError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigurationError::Serialize(e.to_string()))
    }

    /// Read a config file; `.ron` files are parsed as RON, anything else as JSON
    pub fn load(path: &Path) -> Result<Self, ConfigurationError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigurationError::Read(format!("{}: {}", path.display(), e)))?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("ron") => Self::from_ron(&content),
            _ => Self::from_json(&content),
        }
    }

    pub fn partition_config(&self) -> Result<PartitionConfig, ConfigurationError> {
        PartitionConfig::new(
            self.dimensions.width,
            self.dimensions.height,
            self.dimensions.depth,
            self.partition.max_depth,
            self.partition.min_edge_length,
        )
    }

    pub fn wfc_config(&self, catalog: TileCatalog) -> Result<WfcConfig, ConfigurationError> {
        Ok(WfcConfig::new(
            self.dimensions.width,
            self.dimensions.height,
            self.dimensions.depth,
            catalog,
            self.solver.distribution,
        )?
        .with_max_attempts(self.solver.max_attempts))
    }
}
