//! Nearest-usable-cell resolver used to repair spawn and collision states.

use std::collections::VecDeque;

use stealth_pursuit_core::{CellCoord, Direction, Hitbox};

use crate::GridMap;

/// Cell returned when no usable cell exists anywhere on the map.
pub const FALLBACK_CELL: CellCoord = CellCoord::new(1, 1);

/// Result of resolving a possibly invalid position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// The requested cell was already usable.
    Unchanged(CellCoord),
    /// The requested cell was unusable and the nearest usable cell was found.
    Relocated {
        /// Cell that was requested.
        from: CellCoord,
        /// Usable cell the search settled on.
        to: CellCoord,
    },
    /// The whole map is blocked; [`FALLBACK_CELL`] was returned.
    Fallback(CellCoord),
}

impl Resolution {
    /// Cell the caller should use.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        match *self {
            Self::Unchanged(cell) | Self::Fallback(cell) => cell,
            Self::Relocated { to, .. } => to,
        }
    }
}

/// Finds the nearest cell where an actor with `hitbox` may stand.
///
/// Returns `start` when it is already usable. Otherwise a breadth-first
/// search expands through every in-bounds cell in [`Direction::NEIGHBOR_ORDER`]
/// and returns the first neighbour that is usable. Cells are marked visited on
/// enqueue. An exhausted frontier yields [`Resolution::Fallback`].
#[must_use]
pub fn resolve_nearest_free(grid: &GridMap, start: CellCoord, hitbox: Hitbox) -> Resolution {
    if grid.is_cell_usable(start, hitbox) {
        return Resolution::Unchanged(start);
    }

    let cell_count = usize::try_from(u64::from(grid.rows()) * u64::from(grid.columns()))
        .unwrap_or(0);
    let mut visited = vec![false; cell_count];
    let mut queue = VecDeque::new();

    if let Some(index) = grid.index(start) {
        visited[index] = true;
    }
    queue.push_back(start);

    while let Some(cell) = queue.pop_front() {
        for direction in Direction::NEIGHBOR_ORDER {
            let Some(neighbor) = cell.step(direction, grid.rows(), grid.columns()) else {
                continue;
            };
            let Some(index) = grid.index(neighbor) else {
                continue;
            };

            if visited[index] {
                continue;
            }

            if grid.is_cell_usable(neighbor, hitbox) {
                return Resolution::Relocated {
                    from: start,
                    to: neighbor,
                };
            }

            visited[index] = true;
            queue.push_back(neighbor);
        }
    }

    log::warn!(
        "no free position reachable from ({}, {}); falling back to ({}, {})",
        start.row(),
        start.column(),
        FALLBACK_CELL.row(),
        FALLBACK_CELL.column()
    );
    Resolution::Fallback(FALLBACK_CELL)
}
