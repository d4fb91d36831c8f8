#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Visibility zones for the evader and the pursuer.
//!
//! Zones are pure Manhattan geometry clipped to the grid bounds. Walls and
//! furniture never occlude anything.

use stealth_pursuit_core::{CellCoord, Direction, VisionZone};
use stealth_pursuit_world::{query, World};

/// Cells the evader perceives: its radius-1 neighbourhood plus a wedge of
/// `range` cells in the facing direction that narrows to a point.
#[must_use]
pub fn evader_zone(
    rows: u32,
    columns: u32,
    position: CellCoord,
    facing: Direction,
    range: u32,
) -> VisionZone {
    let mut zone = manhattan_ball(rows, columns, position, 1);

    let (forward_row, forward_column) = unit_offset(facing);
    let (side_row, side_column) = (forward_column, forward_row);
    let range = i64::from(range);

    for axial in 0..=range {
        let width = range - axial;
        for offset in -width..=width {
            let row = i64::from(position.row()) + axial * forward_row + offset * side_row;
            let column =
                i64::from(position.column()) + axial * forward_column + offset * side_column;
            insert_clipped(&mut zone, rows, columns, row, column);
        }
    }

    zone
}

/// Cells the pursuer perceives: every cell within Manhattan distance `range`.
#[must_use]
pub fn pursuer_zone(rows: u32, columns: u32, position: CellCoord, range: u32) -> VisionZone {
    manhattan_ball(rows, columns, position, range)
}

/// Reports whether `target` lies in the omnidirectional zone of an observer
/// standing on `observer`.
#[must_use]
pub fn is_visible(
    rows: u32,
    columns: u32,
    observer: CellCoord,
    range: u32,
    target: CellCoord,
) -> bool {
    pursuer_zone(rows, columns, observer, range).contains(target)
}

/// Both zones recomputed from the current world state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VisionSnapshot {
    /// Direction-biased zone of the evader.
    pub evader: VisionZone,
    /// Omnidirectional zone of the pursuer.
    pub pursuer: VisionZone,
}

/// Recomputes both vision zones from scratch.
#[must_use]
pub fn observe(world: &World) -> VisionSnapshot {
    let grid = query::grid_map(world);
    let evader = query::evader(world);
    let pursuer = query::pursuer(world);

    VisionSnapshot {
        evader: evader_zone(
            grid.rows(),
            grid.columns(),
            evader.cell,
            evader.facing,
            evader.profile.vision_range,
        ),
        pursuer: pursuer_zone(
            grid.rows(),
            grid.columns(),
            pursuer.cell,
            pursuer.profile.vision_range,
        ),
    }
}

fn manhattan_ball(rows: u32, columns: u32, center: CellCoord, range: u32) -> VisionZone {
    let mut zone = VisionZone::new();
    let range = i64::from(range);

    for row_offset in -range..=range {
        let width = range - row_offset.abs();
        for column_offset in -width..=width {
            insert_clipped(
                &mut zone,
                rows,
                columns,
                i64::from(center.row()) + row_offset,
                i64::from(center.column()) + column_offset,
            );
        }
    }

    zone
}

fn unit_offset(direction: Direction) -> (i64, i64) {
    match direction {
        Direction::Up => (-1, 0),
        Direction::Down => (1, 0),
        Direction::Left => (0, -1),
        Direction::Right => (0, 1),
    }
}

fn insert_clipped(zone: &mut VisionZone, rows: u32, columns: u32, row: i64, column: i64) {
    if row < 0 || column < 0 || row >= i64::from(rows) || column >= i64::from(columns) {
        return;
    }

    let (Ok(row), Ok(column)) = (u32::try_from(row), u32::try_from(column)) else {
        return;
    };
    let _ = zone.insert(CellCoord::new(row, column));
}
