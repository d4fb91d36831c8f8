//! Static occupancy grid and continuous furniture rectangles.

use glam::Vec2;
use stealth_pursuit_core::{CellCoord, Hitbox, ObstacleRect};

use crate::LayoutError;

/// Immutable wall/free grid paired with the furniture that was not rasterised
/// into it.
///
/// Cell `(r, c)` spans the world square `[c·L, (c+1)·L) × [r·L, (r+1)·L)`
/// where `L` is the cell length. Hitboxes are squares centred on the cell
/// centre, so a hitbox wider than `L` reaches into neighbouring cells.
#[derive(Clone, Debug, PartialEq)]
pub struct GridMap {
    rows: u32,
    columns: u32,
    cell_length: f32,
    walls: Vec<bool>,
    obstacles: Vec<ObstacleRect>,
}

impl GridMap {
    /// Builds a grid from a row-major wall mask and a furniture list.
    pub fn new(
        rows: u32,
        columns: u32,
        cell_length: f32,
        walls: Vec<bool>,
        obstacles: Vec<ObstacleRect>,
    ) -> Result<Self, LayoutError> {
        if rows == 0 || columns == 0 {
            return Err(LayoutError::EmptyGrid { rows, columns });
        }

        if !(cell_length.is_finite() && cell_length > 0.0) {
            return Err(LayoutError::InvalidCellLength(cell_length));
        }

        let expected = u64::from(rows) * u64::from(columns);
        if walls.len() as u64 != expected {
            return Err(LayoutError::DimensionMismatch {
                rows,
                columns,
                actual: walls.len(),
            });
        }

        Ok(Self {
            rows,
            columns,
            cell_length,
            walls,
            obstacles,
        })
    }

    /// Builds a grid without walls or furniture.
    pub fn open(rows: u32, columns: u32, cell_length: f32) -> Result<Self, LayoutError> {
        let cells = usize::try_from(u64::from(rows) * u64::from(columns)).unwrap_or(0);
        Self::new(rows, columns, cell_length, vec![false; cells], Vec::new())
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Side length of one cell in world units.
    #[must_use]
    pub const fn cell_length(&self) -> f32 {
        self.cell_length
    }

    /// Furniture rectangles kept in continuous coordinates.
    #[must_use]
    pub fn obstacles(&self) -> &[ObstacleRect] {
        &self.obstacles
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub fn is_in_bounds(&self, cell: CellCoord) -> bool {
        cell.row() < self.rows && cell.column() < self.columns
    }

    /// Reports whether the cell is inside the grid and not a wall.
    #[must_use]
    pub fn is_grid_free(&self, cell: CellCoord) -> bool {
        self.index(cell)
            .and_then(|index| self.walls.get(index))
            .map_or(false, |wall| !*wall)
    }

    /// Reports whether a hitbox placed on the cell overlaps no furniture.
    #[must_use]
    pub fn is_rect_free(&self, cell: CellCoord, hitbox: Hitbox) -> bool {
        let footprint = self.hitbox_rect(cell, hitbox);
        !self
            .obstacles
            .iter()
            .any(|obstacle| obstacle.overlaps(&footprint))
    }

    /// Reports whether an actor with the given hitbox may stand on the cell.
    #[must_use]
    pub fn is_cell_usable(&self, cell: CellCoord, hitbox: Hitbox) -> bool {
        self.is_grid_free(cell) && self.is_rect_free(cell, hitbox)
    }

    /// World-space centre of the cell.
    #[must_use]
    pub fn cell_center(&self, cell: CellCoord) -> Vec2 {
        Vec2::new(
            (cell.column() as f32 + 0.5) * self.cell_length,
            (cell.row() as f32 + 0.5) * self.cell_length,
        )
    }

    /// World-space square covered by a hitbox standing on the cell.
    #[must_use]
    pub fn hitbox_rect(&self, cell: CellCoord, hitbox: Hitbox) -> ObstacleRect {
        ObstacleRect::centered(self.cell_center(cell), hitbox.side())
    }

    /// Reports whether any non-border cell is grid-free.
    #[must_use]
    pub fn has_free_interior(&self) -> bool {
        if self.rows < 3 || self.columns < 3 {
            return false;
        }

        (1..self.rows - 1).any(|row| {
            (1..self.columns - 1).any(|column| self.is_grid_free(CellCoord::new(row, column)))
        })
    }

    pub(crate) fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.is_in_bounds(cell) {
            return None;
        }

        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.columns).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }
}
