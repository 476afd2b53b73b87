//! Breadth-first constraint propagation.
//!
//! Each visited cell narrows its neighbours to the union of what its
//! remaining tiles accept in that direction. A neighbour that shrinks is
//! queued again (at most once at a time), so the queue drains at an
//! arc-consistent fixpoint. A neighbour that would become empty aborts the
//! walk with a `ContradictionError` at that neighbour's position.

use std::collections::VecDeque;

use super::grid::{Grid, Restriction};
use crate::error::ContradictionError;
use crate::model::{Direction, Position, TileCatalog};

/// Fill `allowed` with the union of tiles accepted towards `direction` by
/// any tile in `possible`. Returns `false` when some tile has no rule for
/// that direction, i.e. the neighbour is unconstrained.
fn union_compatible(
    allowed: &mut [bool],
    possible: &[usize],
    direction: Direction,
    catalog: &TileCatalog,
) -> bool {
    allowed.fill(false);
    for &tile in possible {
        let Some(mask) = catalog.compatible_mask(tile, direction) else {
            return false;
        };
        for (slot, &ok) in allowed.iter_mut().zip(mask) {
            *slot |= ok;
        }
    }
    true
}

/// Propagate from `origins` until nothing changes.
///
/// Returns the number of cells that shrank. On contradiction the grid keeps
/// every shrink applied so far; the emptied cell itself is left unchanged.
pub fn propagate(
    grid: &mut Grid,
    catalog: &TileCatalog,
    origins: impl IntoIterator<Item = Position>,
) -> Result<usize, ContradictionError> {
    let dims = grid.dims();
    let mut queue = VecDeque::new();
    let mut queued = vec![false; dims.cell_count()];

    for pos in origins {
        let index = dims.index(pos);
        if !queued[index] {
            queued[index] = true;
            queue.push_back(pos);
        }
    }

    let mut allowed = vec![false; catalog.len()];
    let mut shrunk = 0;

    while let Some(pos) = queue.pop_front() {
        let index = dims.index(pos);
        queued[index] = false;

        for (direction, neighbor) in dims.neighbors(pos) {
            if !union_compatible(&mut allowed, grid.cell_at(index).possible(), direction, catalog) {
                continue;
            }

            let neighbor_index = dims.index(neighbor);
            match grid.restrict(neighbor_index, &allowed) {
                Restriction::Unchanged => {}
                Restriction::Shrunk => {
                    shrunk += 1;
                    if !queued[neighbor_index] {
                        queued[neighbor_index] = true;
                        queue.push_back(neighbor);
                    }
                }
                Restriction::Emptied(previous) => {
                    tracing::debug!(
                        x = neighbor.x,
                        y = neighbor.y,
                        z = neighbor.z,
                        from_x = pos.x,
                        from_y = pos.y,
                        from_z = pos.z,
                        "propagation emptied a cell"
                    );
                    return Err(ContradictionError {
                        position: neighbor,
                        exhausted: previous
                            .into_iter()
                            .map(|t| catalog.id(t).to_string())
                            .collect(),
                    });
                }
            }
        }
    }

    Ok(shrunk)
}
