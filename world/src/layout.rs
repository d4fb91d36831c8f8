//! Map source handed over by the external loader.

use stealth_pursuit_core::{CellCoord, MapObject, ObstacleRect};
use thiserror::Error;

use crate::GridMap;

/// Evader spawn used when the map names none.
pub const DEFAULT_EVADER_CELL: CellCoord = CellCoord::new(1, 1);
/// Pursuer spawn used when the map names none.
pub const DEFAULT_PURSUER_CELL: CellCoord = CellCoord::new(5, 5);
/// Exit used when the map names none.
pub const DEFAULT_EXIT_CELL: CellCoord = CellCoord::new(10, 10);
/// Single item placed when the map names none.
pub const DEFAULT_ITEM_CELL: CellCoord = CellCoord::new(3, 3);

/// Errors raised while turning a map source into a playable layout.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum LayoutError {
    /// The grid has no cells at all.
    #[error("grid must have at least one row and one column, got {rows}x{columns}")]
    EmptyGrid {
        /// Requested row count.
        rows: u32,
        /// Requested column count.
        columns: u32,
    },
    /// The occupancy mask does not match the declared dimensions.
    #[error("occupancy holds {actual} cells but the grid is {rows}x{columns}")]
    DimensionMismatch {
        /// Declared row count.
        rows: u32,
        /// Declared column count.
        columns: u32,
        /// Number of cells actually supplied.
        actual: usize,
    },
    /// The cell length cannot map cells onto world space.
    #[error("cell length must be positive and finite, got {0}")]
    InvalidCellLength(f32),
    /// A map object sits outside the grid.
    #[error("{object:?} cell ({}, {}) lies outside the {rows}x{columns} grid", cell.row(), cell.column())]
    OutOfBounds {
        /// Object that was misplaced.
        object: MapObject,
        /// Offending cell.
        cell: CellCoord,
        /// Grid row count.
        rows: u32,
        /// Grid column count.
        columns: u32,
    },
}

/// Occupancy, furniture and object placements read from a map source.
///
/// Object cells are optional; [`MapLayout::resolve`] substitutes the documented
/// defaults for anything the source left out.
#[derive(Clone, Debug, PartialEq)]
pub struct MapLayout {
    rows: u32,
    columns: u32,
    cell_length: f32,
    walls: Vec<bool>,
    obstacles: Vec<ObstacleRect>,
    evader: Option<CellCoord>,
    pursuer: Option<CellCoord>,
    exit: Option<CellCoord>,
    items: Vec<CellCoord>,
}

impl MapLayout {
    /// Creates a wall-free layout with no objects placed.
    #[must_use]
    pub fn new(rows: u32, columns: u32, cell_length: f32) -> Self {
        let cells = usize::try_from(u64::from(rows) * u64::from(columns)).unwrap_or(0);
        Self {
            rows,
            columns,
            cell_length,
            walls: vec![false; cells],
            obstacles: Vec::new(),
            evader: None,
            pursuer: None,
            exit: None,
            items: Vec::new(),
        }
    }

    /// Number of rows in the layout.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of columns in the layout.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Marks a cell as wall, reporting whether it lies inside the layout.
    pub fn set_wall(&mut self, cell: CellCoord) -> bool {
        if cell.row() >= self.rows || cell.column() >= self.columns {
            return false;
        }

        let width = self.columns as usize;
        let index = cell.row() as usize * width + cell.column() as usize;
        match self.walls.get_mut(index) {
            Some(slot) => {
                *slot = true;
                true
            }
            None => false,
        }
    }

    /// Keeps a furniture rectangle in continuous coordinates.
    pub fn add_obstacle(&mut self, rect: ObstacleRect) {
        self.obstacles.push(rect);
    }

    /// Burns a furniture rectangle into the wall mask instead of keeping it
    /// continuous.
    ///
    /// The covered cells start at the cell containing the rectangle's top-left
    /// corner and span its size in whole cells, rounded down. Returns the
    /// number of cells marked.
    pub fn rasterize_obstacle(&mut self, rect: ObstacleRect) -> usize {
        let length = self.cell_length;
        if !(length.is_finite() && length > 0.0) {
            return 0;
        }

        let start_column = (rect.min().x / length).floor().max(0.0) as u32;
        let start_row = (rect.min().y / length).floor().max(0.0) as u32;
        let span_columns = (rect.width() / length).floor() as u32;
        let span_rows = (rect.height() / length).floor() as u32;
        let end_row = start_row.saturating_add(span_rows).min(self.rows);
        let end_column = start_column.saturating_add(span_columns).min(self.columns);

        let mut marked = 0;
        for row in start_row..end_row {
            for column in start_column..end_column {
                if self.set_wall(CellCoord::new(row, column)) {
                    marked += 1;
                }
            }
        }
        marked
    }

    /// Places the evader's spawn cell.
    pub fn set_evader(&mut self, cell: CellCoord) {
        self.evader = Some(cell);
    }

    /// Places the pursuer's spawn cell.
    pub fn set_pursuer(&mut self, cell: CellCoord) {
        self.pursuer = Some(cell);
    }

    /// Places the exit cell.
    pub fn set_exit(&mut self, cell: CellCoord) {
        self.exit = Some(cell);
    }

    /// Appends an item; items are collected in insertion order.
    pub fn add_item(&mut self, cell: CellCoord) {
        self.items.push(cell);
    }

    /// Substitutes defaults for missing objects, validates placements and
    /// builds the immutable grid.
    pub fn resolve(self) -> Result<ResolvedLayout, LayoutError> {
        let mut substituted = Vec::new();

        let evader = self.evader.unwrap_or_else(|| {
            substituted.push(MapObject::Evader);
            DEFAULT_EVADER_CELL
        });
        let pursuer = self.pursuer.unwrap_or_else(|| {
            substituted.push(MapObject::Pursuer);
            DEFAULT_PURSUER_CELL
        });
        let exit = self.exit.unwrap_or_else(|| {
            substituted.push(MapObject::Exit);
            DEFAULT_EXIT_CELL
        });
        let items = if self.items.is_empty() {
            substituted.push(MapObject::Items);
            vec![DEFAULT_ITEM_CELL]
        } else {
            self.items
        };

        for object in &substituted {
            log::warn!("map source has no {object:?}; using the default placement");
        }

        let grid = GridMap::new(
            self.rows,
            self.columns,
            self.cell_length,
            self.walls,
            self.obstacles,
        )?;

        let placements = [
            (MapObject::Evader, evader),
            (MapObject::Pursuer, pursuer),
            (MapObject::Exit, exit),
        ]
        .into_iter()
        .chain(items.iter().map(|item| (MapObject::Items, *item)));

        for (object, cell) in placements {
            if !grid.is_in_bounds(cell) {
                return Err(LayoutError::OutOfBounds {
                    object,
                    cell,
                    rows: grid.rows(),
                    columns: grid.columns(),
                });
            }
        }

        Ok(ResolvedLayout {
            grid,
            evader,
            pursuer,
            exit,
            items,
            substituted,
        })
    }
}

/// Layout with every object placed and the grid validated.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedLayout {
    /// Immutable occupancy and furniture.
    pub grid: GridMap,
    /// Evader spawn cell, before collision repair.
    pub evader: CellCoord,
    /// Pursuer spawn cell, before collision repair.
    pub pursuer: CellCoord,
    /// Exit cell.
    pub exit: CellCoord,
    /// Items in collection order.
    pub items: Vec<CellCoord>,
    /// Objects that were missing from the source and received defaults.
    pub substituted: Vec<MapObject>,
}
