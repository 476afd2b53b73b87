//! Solver grid: one `Cell` per coordinate, each holding the tiles still
//! possible there.
//!
//! Cells are stored in scan order (x outermost, then y, then z), which is
//! also the tie-break order of cell selection.

use crate::model::{Direction, Position, TileCatalog, TileInstance};

/// Shannon entropy of a weighted possibility set: `H = -Σ p·log2(p)`.
///
/// Zero exactly for zero or one possibilities. Two or more always give a
/// positive value, even when one weight dwarfs the rest and the sum rounds
/// to zero.
pub fn shannon_entropy(possible: &[usize], weights: &[f64]) -> f64 {
    if possible.len() <= 1 {
        return 0.0;
    }

    let total: f64 = possible.iter().map(|&t| weights[t]).sum();
    let entropy: f64 = possible
        .iter()
        .map(|&t| weights[t] / total)
        .filter(|&p| p > 0.0 && p.is_finite())
        .map(|p| -p * p.log2())
        .sum();
    if entropy > 0.0 {
        entropy
    } else {
        f64::MIN_POSITIVE
    }
}

/// One grid position during solving
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub position: Position,
    possible: Vec<usize>,
    entropy: f64,
    collapsed: bool,
}

impl Cell {
    fn new(position: Position, possible: Vec<usize>, weights: &[f64]) -> Self {
        let entropy = shannon_entropy(&possible, weights);
        Self {
            position,
            possible,
            entropy,
            collapsed: false,
        }
    }

    /// Catalog indices still possible here, in catalog order
    pub fn possible(&self) -> &[usize] {
        &self.possible
    }

    pub fn entropy(&self) -> f64 {
        self.entropy
    }

    /// Committed by a collapse (not merely narrowed to one tile by propagation)
    pub fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    /// Exactly one possibility left
    pub fn is_decided(&self) -> bool {
        self.possible.len() == 1
    }

    pub(crate) fn collapse_to(&mut self, tile: usize) {
        self.possible.clear();
        self.possible.push(tile);
        self.entropy = 0.0;
        self.collapsed = true;
    }
}

/// Result of intersecting a cell with an allowed-tile mask
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Restriction {
    Unchanged,
    Shrunk,
    /// Nothing would survive; the cell is left untouched and its previous
    /// possibilities are returned
    Emptied(Vec<usize>),
}

/// Grid extent, copyable so neighbour walks don't borrow the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridDims {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
}

impl GridDims {
    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize * self.depth as usize
    }

    pub fn index(&self, pos: Position) -> usize {
        (pos.x as usize * self.height as usize + pos.y as usize) * self.depth as usize
            + pos.z as usize
    }

    pub fn contains(&self, x: i64, y: i64, z: i64) -> bool {
        x >= 0
            && y >= 0
            && z >= 0
            && x < self.width as i64
            && y < self.height as i64
            && z < self.depth as i64
    }

    /// Existing neighbours of `pos` (up to 6, fewer at the boundary)
    pub fn neighbors(self, pos: Position) -> impl Iterator<Item = (Direction, Position)> {
        Direction::ALL.into_iter().filter_map(move |dir| {
            let (dx, dy, dz) = dir.offset();
            let (x, y, z) = (pos.x as i64 + dx, pos.y as i64 + dy, pos.z as i64 + dz);
            self.contains(x, y, z)
                .then_some((dir, Position::new(x as u32, y as u32, z as u32)))
        })
    }
}

/// 3D grid of cells plus the effective tile weights of this run
#[derive(Debug, Clone)]
pub struct Grid {
    dims: GridDims,
    cells: Vec<Cell>,
    weights: Vec<f64>,
}

impl Grid {
    /// Every cell starts with every catalog tile possible
    pub fn new(width: u32, height: u32, depth: u32, weights: Vec<f64>) -> Self {
        let dims = GridDims {
            width,
            height,
            depth,
        };
        let all: Vec<usize> = (0..weights.len()).collect();
        let mut cells = Vec::with_capacity(dims.cell_count());
        for x in 0..width {
            for y in 0..height {
                for z in 0..depth {
                    cells.push(Cell::new(Position::new(x, y, z), all.clone(), &weights));
                }
            }
        }
        Self {
            dims,
            cells,
            weights,
        }
    }

    pub fn dims(&self) -> GridDims {
        self.dims
    }

    pub fn width(&self) -> u32 {
        self.dims.width
    }

    pub fn height(&self) -> u32 {
        self.dims.height
    }

    pub fn depth(&self) -> u32 {
        self.dims.depth
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// All cells in scan order
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, pos: Position) -> Option<&Cell> {
        if self.dims.contains(pos.x as i64, pos.y as i64, pos.z as i64) {
            self.cells.get(self.dims.index(pos))
        } else {
            None
        }
    }

    pub(crate) fn cell_at(&self, index: usize) -> &Cell {
        &self.cells[index]
    }

    pub(crate) fn collapse(&mut self, index: usize, tile: usize) {
        self.cells[index].collapse_to(tile);
    }

    /// Keep only tiles with `allowed[tile] == true`, refreshing the entropy
    pub(crate) fn restrict(&mut self, index: usize, allowed: &[bool]) -> Restriction {
        let cell = &mut self.cells[index];
        let before = cell.possible.len();
        if !cell.possible.iter().any(|&t| allowed[t]) {
            return Restriction::Emptied(cell.possible.clone());
        }
        cell.possible.retain(|&t| allowed[t]);
        if cell.possible.len() == before {
            return Restriction::Unchanged;
        }
        cell.entropy = shannon_entropy(&cell.possible, &self.weights);
        Restriction::Shrunk
    }

    /// Possibility-set size of every cell, in scan order
    pub fn possibility_counts(&self) -> Vec<usize> {
        self.cells.iter().map(|c| c.possible.len()).collect()
    }

    /// Instances for cells committed by a collapse
    pub fn collapsed_instances(&self, catalog: &TileCatalog) -> Vec<TileInstance> {
        self.cells
            .iter()
            .filter(|c| c.collapsed && c.is_decided())
            .map(|c| TileInstance::new(catalog.id(c.possible[0]), c.position))
            .collect()
    }

    /// Instances for every cell holding exactly one possibility
    pub fn decided_instances(&self, catalog: &TileCatalog) -> Vec<TileInstance> {
        self.cells
            .iter()
            .filter(|c| c.is_decided())
            .map(|c| TileInstance::new(catalog.id(c.possible[0]), c.position))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entropy_zero_for_trivial_sets() {
        let w = [1.0, 2.0];
        assert_eq!(shannon_entropy(&[], &w), 0.0);
        assert_eq!(shannon_entropy(&[1], &w), 0.0);
    }

    #[test]
    fn test_entropy_uniform_is_log2_n() {
        let w = [1.0; 8];
        let all: Vec<usize> = (0..8).collect();
        assert!((shannon_entropy(&all, &w) - 3.0).abs() < 1e-12);
        assert!((shannon_entropy(&[0, 1], &w) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_entropy_weighted_below_uniform() {
        let skewed = [2.0, 1.0, 0.5];
        let uniform = [1.0, 1.0, 1.0];
        let all = [0, 1, 2];
        let h = shannon_entropy(&all, &skewed);
        assert!(h > 0.0);
        assert!(h < shannon_entropy(&all, &uniform));
    }

    #[test]
    fn test_entropy_positive_for_extreme_weight_ratios() {
        let w = [1e300, 1e-300];
        let h = shannon_entropy(&[0, 1], &w);
        assert!(h > 0.0);
        assert!(shannon_entropy(&[0, 1], &[f64::MAX, f64::MAX]) > 0.0);
    }

    #[test]
    fn test_grid_scan_order() {
        let grid = Grid::new(2, 3, 2, vec![1.0, 1.0]);
        let positions: Vec<Position> = grid.cells().iter().map(|c| c.position).collect();
        assert_eq!(positions.len(), 12);
        assert_eq!(positions[0], Position::new(0, 0, 0));
        assert_eq!(positions[1], Position::new(0, 0, 1));
        assert_eq!(positions[2], Position::new(0, 1, 0));
        assert_eq!(positions[6], Position::new(1, 0, 0));
        for (i, pos) in positions.iter().enumerate() {
            assert_eq!(grid.dims().index(*pos), i);
        }
    }

    #[test]
    fn test_neighbors_at_boundaries() {
        let dims = GridDims {
            width: 3,
            height: 3,
            depth: 1,
        };
        assert_eq!(dims.neighbors(Position::new(0, 0, 0)).count(), 2);
        assert_eq!(dims.neighbors(Position::new(1, 0, 0)).count(), 3);
        assert_eq!(dims.neighbors(Position::new(1, 1, 0)).count(), 4);

        let cube = GridDims {
            width: 3,
            height: 3,
            depth: 3,
        };
        assert_eq!(cube.neighbors(Position::new(1, 1, 1)).count(), 6);
        let up: Vec<_> = cube
            .neighbors(Position::new(1, 1, 1))
            .filter(|(d, _)| *d == Direction::Up)
            .collect();
        assert_eq!(up, vec![(Direction::Up, Position::new(1, 1, 2))]);
    }

    #[test]
    fn test_restrict_shrinks_and_reports_empty() {
        let mut grid = Grid::new(1, 1, 1, vec![1.0, 1.0, 1.0]);
        assert_eq!(grid.restrict(0, &[true, true, true]), Restriction::Unchanged);
        assert_eq!(grid.restrict(0, &[true, false, true]), Restriction::Shrunk);
        assert_eq!(grid.cell_at(0).possible(), &[0, 2]);
        assert!((grid.cell_at(0).entropy() - 1.0).abs() < 1e-12);

        let emptied = grid.restrict(0, &[false, true, false]);
        assert_eq!(emptied, Restriction::Emptied(vec![0, 2]));
        // Untouched after a failed restriction
        assert_eq!(grid.cell_at(0).possible(), &[0, 2]);
    }

    #[test]
    fn test_collapse_sets_flag_and_zero_entropy() {
        let mut grid = Grid::new(1, 1, 1, vec![1.0, 1.0]);
        grid.collapse(0, 1);
        let cell = grid.cell_at(0);
        assert!(cell.is_collapsed());
        assert!(cell.is_decided());
        assert_eq!(cell.entropy(), 0.0);
        assert_eq!(cell.possible(), &[1]);
    }
}
