//! Tile catalog: definitions, directional adjacency rules, and the validated
//! catalog the solver reads from.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::constants::DEFAULT_TILE_WEIGHT;
use crate::error::ConfigurationError;

/// Neighbour direction on the grid.
///
/// North/south run along Y (north = y - 1), east/west along X
/// (east = x + 1), up/down along Z (up = z + 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    North,
    South,
    East,
    West,
    Up,
    Down,
}

impl Direction {
    /// All six directions of the volumetric grid
    pub const ALL: [Direction; 6] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
        Direction::Up,
        Direction::Down,
    ];

    /// The four directions of a single floor
    pub const PLANAR: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    pub fn index(self) -> usize {
        match self {
            Self::North => 0,
            Self::South => 1,
            Self::East => 2,
            Self::West => 3,
            Self::Up => 4,
            Self::Down => 5,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::South => Self::North,
            Self::East => Self::West,
            Self::West => Self::East,
            Self::Up => Self::Down,
            Self::Down => Self::Up,
        }
    }

    /// Grid offset (dx, dy, dz) one step in this direction
    pub fn offset(self) -> (i64, i64, i64) {
        match self {
            Self::North => (0, -1, 0),
            Self::South => (0, 1, 0),
            Self::East => (1, 0, 0),
            Self::West => (-1, 0, 0),
            Self::Up => (0, 0, 1),
            Self::Down => (0, 0, -1),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::North => "north",
            Self::South => "south",
            Self::East => "east",
            Self::West => "west",
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

/// Tiles allowed next to the owning tile in one direction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjacencyRule {
    pub direction: Direction,
    pub compatible: Vec<String>,
}

fn default_weight() -> f64 {
    DEFAULT_TILE_WEIGHT
}

/// Catalog entry describing one kind of placeable tile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileDefinition {
    pub id: String,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(default)]
    pub adjacency: Vec<AdjacencyRule>,
}

impl TileDefinition {
    pub fn new(id: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            category: category.into(),
            tags: Vec::new(),
            weight: DEFAULT_TILE_WEIGHT,
            adjacency: Vec::new(),
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    /// Add a rule allowing `ids` towards `direction`
    pub fn allow(mut self, direction: Direction, ids: &[&str]) -> Self {
        self.adjacency.push(AdjacencyRule {
            direction,
            compatible: ids.iter().map(|id| id.to_string()).collect(),
        });
        self
    }

    /// Same rule for north/south/east/west
    pub fn allow_planar(self, ids: &[&str]) -> Self {
        Direction::PLANAR
            .iter()
            .fold(self, |tile, &dir| tile.allow(dir, ids))
    }

    /// Same rule for all six directions
    pub fn allow_all(self, ids: &[&str]) -> Self {
        Direction::ALL
            .iter()
            .fold(self, |tile, &dir| tile.allow(dir, ids))
    }
}

/// Per-direction compatibility mask, indexed by catalog position.
/// `None` means the tile declares no rule for that direction (anything goes).
type CompatibilityRow = [Option<Vec<bool>>; 6];

/// Validated, immutable tile catalog.
///
/// Tiles are addressed by their position in the catalog; that order is the
/// iteration order of every possibility set during solving.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<TileDefinition>", into = "Vec<TileDefinition>")]
pub struct TileCatalog {
    tiles: Vec<TileDefinition>,
    lookup: HashMap<String, usize>,
    compatibility: Vec<CompatibilityRow>,
}

impl TileCatalog {
    /// Build a catalog, rejecting duplicates, bad weights, and rules that
    /// reference tiles missing from the catalog.
    pub fn new(tiles: Vec<TileDefinition>) -> Result<Self, ConfigurationError> {
        if tiles.is_empty() {
            return Err(ConfigurationError::EmptyCatalog);
        }

        let mut lookup = HashMap::with_capacity(tiles.len());
        for (index, tile) in tiles.iter().enumerate() {
            if !(tile.weight.is_finite() && tile.weight > 0.0) {
                return Err(ConfigurationError::InvalidWeight {
                    tile: tile.id.clone(),
                    weight: tile.weight,
                });
            }
            if lookup.insert(tile.id.clone(), index).is_some() {
                return Err(ConfigurationError::DuplicateTile(tile.id.clone()));
            }
        }
        // Entropy and the collapse draw both divide by the summed weight
        let total: f64 = tiles.iter().map(|t| t.weight).sum();
        if !total.is_finite() {
            return Err(ConfigurationError::WeightOverflow { total });
        }

        let mut compatibility = Vec::with_capacity(tiles.len());
        for tile in &tiles {
            let mut row: CompatibilityRow = Default::default();
            for rule in &tile.adjacency {
                let mask = row[rule.direction.index()]
                    .get_or_insert_with(|| vec![false; tiles.len()]);
                for reference in &rule.compatible {
                    let Some(&other) = lookup.get(reference) else {
                        return Err(ConfigurationError::UnknownTileReference {
                            tile: tile.id.clone(),
                            direction: rule.direction,
                            reference: reference.clone(),
                        });
                    };
                    mask[other] = true;
                }
            }
            compatibility.push(row);
        }

        Ok(Self {
            tiles,
            lookup,
            compatibility,
        })
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn definitions(&self) -> &[TileDefinition] {
        &self.tiles
    }

    pub fn get(&self, index: usize) -> Option<&TileDefinition> {
        self.tiles.get(index)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.lookup.get(id).copied()
    }

    /// Tile id at a catalog index. Panics on an out-of-range index.
    pub fn id(&self, index: usize) -> &str {
        &self.tiles[index].id
    }

    pub fn weight(&self, index: usize) -> f64 {
        self.tiles[index].weight
    }

    /// Mask of tiles `tile` accepts towards `direction`, or `None` when the
    /// tile has no rule for that direction.
    pub fn compatible_mask(&self, tile: usize, direction: Direction) -> Option<&[bool]> {
        self.compatibility[tile][direction.index()].as_deref()
    }

    /// Whether `other` may sit next to `tile` in `direction`
    pub fn allows(&self, tile: usize, direction: Direction, other: usize) -> bool {
        self.compatible_mask(tile, direction)
            .map_or(true, |mask| mask[other])
    }
}

impl TryFrom<Vec<TileDefinition>> for TileCatalog {
    type Error = ConfigurationError;

    fn try_from(tiles: Vec<TileDefinition>) -> Result<Self, Self::Error> {
        Self::new(tiles)
    }
}

impl From<TileCatalog> for Vec<TileDefinition> {
    fn from(catalog: TileCatalog) -> Self {
        catalog.tiles
    }
}
