//! Wave Function Collapse tile solver.
//!
//! Fills a 3D grid with catalog tiles so every pair of neighbours satisfies
//! the catalog's directional adjacency rules.
//!
//! ## Loop
//! ```text
//! initialize_grid
//!   → step: pick min-entropy cell → weighted draw → collapse → propagate
//!   → repeat until no cell has positive entropy, or a cell empties
//! ```
//!
//! There is no backtracking: a contradiction ends the run and the caller
//! gets the partial result plus the failing position.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::grid::Grid;
use super::propagation::propagate;
use super::RandomSource;
use crate::error::{ConfigurationError, ContradictionError};
use crate::model::{Bounds, Direction, Position, TileCatalog, TileInstance};

/// How tile weights feed entropy and the collapse draw
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Distribution {
    /// Every tile counts as weight 1
    Uniform,
    /// Catalog weights
    #[default]
    Weighted,
}

#[derive(Deserialize)]
struct RawWfcConfig {
    width: u32,
    height: u32,
    depth: u32,
    tiles: TileCatalog,
    #[serde(default)]
    distribution: Distribution,
    #[serde(default)]
    max_attempts: Option<u32>,
}

/// Validated solver input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawWfcConfig")]
pub struct WfcConfig {
    width: u32,
    height: u32,
    depth: u32,
    tiles: TileCatalog,
    distribution: Distribution,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_attempts: Option<u32>,
}

impl WfcConfig {
    pub fn new(
        width: u32,
        height: u32,
        depth: u32,
        tiles: TileCatalog,
        distribution: Distribution,
    ) -> Result<Self, ConfigurationError> {
        Bounds::volume_of(width, height, depth)?;
        Ok(Self {
            width,
            height,
            depth,
            tiles,
            distribution,
            max_attempts: None,
        })
    }

    /// Advisory bound for an outer retry loop; the solver itself never retries
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn tiles(&self) -> &TileCatalog {
        &self.tiles
    }

    pub fn distribution(&self) -> Distribution {
        self.distribution
    }

    pub fn max_attempts(&self) -> Option<u32> {
        self.max_attempts
    }

    /// Effective per-tile weights for this distribution, in catalog order
    pub fn weights(&self) -> Vec<f64> {
        (0..self.tiles.len())
            .map(|t| match self.distribution {
                Distribution::Uniform => 1.0,
                Distribution::Weighted => self.tiles.weight(t),
            })
            .collect()
    }
}

impl TryFrom<RawWfcConfig> for WfcConfig {
    type Error = ConfigurationError;

    fn try_from(raw: RawWfcConfig) -> Result<Self, Self::Error> {
        let config = Self::new(raw.width, raw.height, raw.depth, raw.tiles, raw.distribution)?;
        Ok(match raw.max_attempts {
            Some(n) => config.with_max_attempts(n),
            None => config,
        })
    }
}

/// Fresh grid with every tile possible in every cell
pub fn initialize_grid(config: &WfcConfig) -> Grid {
    Grid::new(config.width, config.height, config.depth, config.weights())
}

/// Outcome of one successful `step`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// A cell was collapsed and its constraints propagated
    Collapsed(Position),
    /// No uncollapsed cell has positive entropy left
    Complete,
}

/// Uncollapsed cell with the smallest positive entropy; the first in scan
/// order wins ties.
fn select_cell(grid: &Grid) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, cell) in grid.cells().iter().enumerate() {
        if cell.is_collapsed() || cell.entropy() <= 0.0 {
            continue;
        }
        match best {
            Some((_, entropy)) if cell.entropy() >= entropy => {}
            _ => best = Some((index, cell.entropy())),
        }
    }
    best.map(|(index, _)| index)
}

/// Cumulative-weight draw over `possible`, in its stored order
fn draw_tile<R: RandomSource + ?Sized>(possible: &[usize], weights: &[f64], rng: &mut R) -> usize {
    let total: f64 = possible.iter().map(|&t| weights[t]).sum();
    let mut remaining = rng.next_f64() * total;
    for &tile in possible {
        remaining -= weights[tile];
        if remaining <= 0.0 {
            return tile;
        }
    }
    // Rounding left a sliver; take the first candidate
    possible[0]
}

/// Select, collapse, and propagate one cell.
///
/// On `Err` the grid holds every shrink applied before the failure and the
/// collapsed cell stays collapsed.
pub fn step<R: RandomSource + ?Sized>(
    grid: &mut Grid,
    catalog: &TileCatalog,
    rng: &mut R,
) -> Result<StepOutcome, ContradictionError> {
    let Some(index) = select_cell(grid) else {
        return Ok(StepOutcome::Complete);
    };

    let cell = grid.cell_at(index);
    let position = cell.position;
    let tile = draw_tile(cell.possible(), grid.weights(), rng);
    grid.collapse(index, tile);

    tracing::trace!(
        x = position.x,
        y = position.y,
        z = position.z,
        tile = catalog.id(tile),
        "collapsed cell"
    );

    propagate(grid, catalog, [position])?;
    Ok(StepOutcome::Collapsed(position))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationStatus {
    #[default]
    Complete,
    Contradiction,
}

/// Solver output. A contradiction run still carries the cells that had been
/// collapsed before it failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub status: GenerationStatus,
    pub tiles: Vec<TileInstance>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contradiction: Option<ContradictionError>,
    /// Successful collapse steps
    pub steps: usize,
}

impl GenerationResult {
    pub fn is_complete(&self) -> bool {
        self.status == GenerationStatus::Complete
    }

    /// Complete tile list, or the contradiction that stopped the run
    pub fn into_result(self) -> Result<Vec<TileInstance>, ContradictionError> {
        match self.contradiction {
            Some(err) => Err(err),
            None => Ok(self.tiles),
        }
    }
}

fn solve<R: RandomSource + ?Sized>(
    grid: &mut Grid,
    catalog: &TileCatalog,
    rng: &mut R,
    steps: &mut usize,
) -> Result<(), ContradictionError> {
    while let StepOutcome::Collapsed(_) = step(grid, catalog, rng)? {
        *steps += 1;
    }
    Ok(())
}

/// Run the solver on a fresh grid until it completes or contradicts
pub fn run_to_completion<R: RandomSource + ?Sized>(
    config: &WfcConfig,
    rng: &mut R,
) -> GenerationResult {
    let catalog = config.tiles();
    let mut grid = initialize_grid(config);
    let mut steps = 0;

    match solve(&mut grid, catalog, rng, &mut steps) {
        Ok(()) => {
            let tiles = grid.decided_instances(catalog);
            tracing::debug!(
                width = config.width,
                height = config.height,
                depth = config.depth,
                steps,
                tiles = tiles.len(),
                "WFC run complete"
            );
            GenerationResult {
                status: GenerationStatus::Complete,
                tiles,
                contradiction: None,
                steps,
            }
        }
        Err(err) => {
            let tiles = grid.collapsed_instances(catalog);
            tracing::debug!(
                x = err.position.x,
                y = err.position.y,
                z = err.position.z,
                steps,
                partial = tiles.len(),
                "WFC run hit a contradiction"
            );
            GenerationResult {
                status: GenerationStatus::Contradiction,
                tiles,
                contradiction: Some(err),
                steps,
            }
        }
    }
}

/// A neighbour pair that breaks the catalog's rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjacencyViolation {
    pub position: Position,
    pub direction: Direction,
    pub tile: String,
    pub neighbor: String,
}

/// Check a placed tile list against the catalog.
///
/// Every ordered neighbour pair is checked from both sides. Tiles whose id
/// is not in the catalog are ignored.
pub fn adjacency_violations(tiles: &[TileInstance], catalog: &TileCatalog) -> Vec<AdjacencyViolation> {
    let placed: HashMap<Position, usize> = tiles
        .iter()
        .filter_map(|t| catalog.index_of(&t.tile_id).map(|i| (t.position(), i)))
        .collect();

    let mut violations = Vec::new();
    for instance in tiles {
        let Some(tile) = catalog.index_of(&instance.tile_id) else {
            continue;
        };
        let pos = instance.position();
        for direction in Direction::ALL {
            let (dx, dy, dz) = direction.offset();
            let (x, y, z) = (pos.x as i64 + dx, pos.y as i64 + dy, pos.z as i64 + dz);
            if x < 0 || y < 0 || z < 0 {
                continue;
            }
            let Some(&other) = placed.get(&Position::new(x as u32, y as u32, z as u32)) else {
                continue;
            };
            if !catalog.allows(tile, direction, other) {
                violations.push(AdjacencyViolation {
                    position: pos,
                    direction,
                    tile: instance.tile_id.clone(),
                    neighbor: catalog.id(other).to_string(),
                });
            }
        }
    }
    violations
}
