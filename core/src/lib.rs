#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the stealth pursuit engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Systems read immutable snapshots of
//! the world and submit [`Command`] values describing desired moves; the world
//! executes those commands via its `apply` entry point and broadcasts
//! [`Event`] values describing what actually happened. Nothing in this crate
//! owns mutable simulation state.

use std::collections::{btree_set, BTreeSet, VecDeque};

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// The two participants of a pursuit run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Actor {
    /// The thief that collects items and heads for the exit.
    Evader,
    /// The master that patrols the map and chases the evader on sight.
    Pursuer,
}

/// Behaviour mode the pursuer acts under during a single tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PursuitMode {
    /// The evader is out of sight; the pursuer walks between random waypoints.
    Patrol,
    /// The evader is inside the pursuer's vision zone.
    Chase,
}

/// Terminal result of a pursuit run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// The evader reached the exit holding every item.
    Escaped,
    /// The pursuer stepped onto the evader's cell.
    Captured,
}

/// Cardinal facing and step directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    /// Toward decreasing row indices.
    Up,
    /// Toward increasing row indices.
    Down,
    /// Toward decreasing column indices.
    Left,
    /// Toward increasing column indices.
    Right,
}

impl Direction {
    /// Fixed order in which every grid search visits the neighbours of a cell.
    pub const NEIGHBOR_ORDER: [Direction; 4] = [
        Direction::Right,
        Direction::Down,
        Direction::Left,
        Direction::Up,
    ];

    /// Direction of the unit step leading from `from` to `to`.
    ///
    /// Returns `None` when the two cells are not adjacent.
    #[must_use]
    pub fn between(from: CellCoord, to: CellCoord) -> Option<Self> {
        if !from.is_adjacent(to) {
            return None;
        }

        if to.row() < from.row() {
            Some(Self::Up)
        } else if to.row() > from.row() {
            Some(Self::Down)
        } else if to.column() < from.column() {
            Some(Self::Left)
        } else {
            Some(Self::Right)
        }
    }
}

/// Location of a single grid cell expressed as row and column indices.
///
/// Ordering is row-major, which keeps every set of cells iterating in the
/// same order across runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    row: u32,
    column: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.row.abs_diff(other.row) + self.column.abs_diff(other.column)
    }

    /// Reports whether the two cells share an edge.
    #[must_use]
    pub fn is_adjacent(self, other: CellCoord) -> bool {
        self.manhattan_distance(other) == 1
    }

    /// Neighbour reached by a unit step, if it stays within `rows` × `columns`.
    #[must_use]
    pub fn step(self, direction: Direction, rows: u32, columns: u32) -> Option<CellCoord> {
        let (row, column) = match direction {
            Direction::Up => (self.row.checked_sub(1)?, self.column),
            Direction::Down => (self.row.checked_add(1)?, self.column),
            Direction::Left => (self.row, self.column.checked_sub(1)?),
            Direction::Right => (self.row, self.column.checked_add(1)?),
        };

        if row < rows && column < columns {
            Some(CellCoord::new(row, column))
        } else {
            None
        }
    }
}

/// Side length of the square hitbox an actor occupies, in world units.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Hitbox(f32);

impl Hitbox {
    /// Creates a hitbox with the provided side length.
    ///
    /// Negative and NaN lengths collapse to zero.
    #[must_use]
    pub fn new(side: f32) -> Self {
        Self(side.max(0.0))
    }

    /// Side length of the square in world units.
    #[must_use]
    pub const fn side(&self) -> f32 {
        self.0
    }
}

/// Static per-actor parameters supplied by configuration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActorProfile {
    /// Square hitbox tested against furniture rectangles.
    pub hitbox: Hitbox,
    /// Reach of the actor's vision zone measured in cells.
    pub vision_range: u32,
}

impl ActorProfile {
    /// Creates a profile from a hitbox and vision range.
    #[must_use]
    pub const fn new(hitbox: Hitbox, vision_range: u32) -> Self {
        Self {
            hitbox,
            vision_range,
        }
    }
}

/// Axis-aligned rectangle expressed in continuous world coordinates.
///
/// Furniture rectangles do not need to line up with grid cells.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObstacleRect {
    origin: Vec2,
    size: Vec2,
}

impl ObstacleRect {
    /// Creates a rectangle from its top-left corner and dimensions.
    #[must_use]
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(width.max(0.0), height.max(0.0)),
        }
    }

    /// Creates a square of the provided side centred on `center`.
    #[must_use]
    pub fn centered(center: Vec2, side: f32) -> Self {
        let half = side.max(0.0) / 2.0;
        Self::new(center.x - half, center.y - half, half * 2.0, half * 2.0)
    }

    /// Top-left corner of the rectangle.
    #[must_use]
    pub const fn min(&self) -> Vec2 {
        self.origin
    }

    /// Bottom-right corner of the rectangle.
    #[must_use]
    pub fn max(&self) -> Vec2 {
        self.origin + self.size
    }

    /// Horizontal extent in world units.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.size.x
    }

    /// Vertical extent in world units.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.size.y
    }

    /// Reports whether the interiors of the two rectangles intersect.
    ///
    /// Rectangles that merely touch along an edge do not overlap.
    #[must_use]
    pub fn overlaps(&self, other: &ObstacleRect) -> bool {
        let (a_min, a_max) = (self.min(), self.max());
        let (b_min, b_max) = (other.min(), other.max());
        a_min.x < b_max.x && b_min.x < a_max.x && a_min.y < b_max.y && b_min.y < a_max.y
    }
}

/// Ordered cell sequence leading from a start cell to a goal cell.
///
/// The front of the path is always the cell the owner currently stands on;
/// advancing pops that cell once the owner has stepped onto the next one.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Path {
    cells: VecDeque<CellCoord>,
}

impl Path {
    /// Builds a path from an ordered list of cells.
    #[must_use]
    pub fn from_cells(cells: Vec<CellCoord>) -> Self {
        Self {
            cells: cells.into(),
        }
    }

    /// Number of cells remaining on the path, including the current one.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Reports whether the path has no cells left.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cell the path starts from.
    #[must_use]
    pub fn start(&self) -> Option<CellCoord> {
        self.cells.front().copied()
    }

    /// Cell the path leads to.
    #[must_use]
    pub fn target(&self) -> Option<CellCoord> {
        self.cells.back().copied()
    }

    /// Cell the owner should step onto next.
    #[must_use]
    pub fn next_hop(&self) -> Option<CellCoord> {
        self.cells.get(1).copied()
    }

    /// Consumes the front cell after the owner moved onto the next hop.
    pub fn advance(&mut self) -> Option<CellCoord> {
        self.cells.pop_front()
    }

    /// Iterator over the remaining cells in travel order.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.cells.iter().copied()
    }

    /// Reports whether every consecutive pair of cells is adjacent.
    #[must_use]
    pub fn is_contiguous(&self) -> bool {
        self.cells
            .iter()
            .zip(self.cells.iter().skip(1))
            .all(|(from, to)| from.is_adjacent(*to))
    }
}

/// Set of cells an actor perceives during the current tick.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VisionZone {
    cells: BTreeSet<CellCoord>,
}

impl VisionZone {
    /// Creates an empty vision zone.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a cell to the zone, reporting whether it was newly inserted.
    pub fn insert(&mut self, cell: CellCoord) -> bool {
        self.cells.insert(cell)
    }

    /// Reports whether the zone contains the provided cell.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        self.cells.contains(&cell)
    }

    /// Number of cells in the zone.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Reports whether the zone is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Iterator over the zone in row-major order.
    pub fn iter(&self) -> btree_set::Iter<'_, CellCoord> {
        self.cells.iter()
    }
}

/// Map objects the loader may fail to provide.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MapObject {
    /// Spawn cell of the evader.
    Evader,
    /// Spawn cell of the pursuer.
    Pursuer,
    /// The exit cell.
    Exit,
    /// The collectible item list.
    Items,
}

/// Reasons the world refuses a requested step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StepError {
    /// The destination lies outside the grid.
    OutOfBounds,
    /// The destination is a wall cell.
    Wall,
    /// The actor's hitbox would overlap a furniture rectangle at the destination.
    BlockedStep,
    /// The run already reached a terminal outcome.
    RunConcluded,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Opens a new simulation tick.
    Tick,
    /// Requests that an actor advance a single cell.
    Step {
        /// Actor attempting to move.
        actor: Actor,
        /// Direction of travel for the attempted step.
        direction: Direction,
    },
    /// Closes the current tick, resolving capture.
    ConcludeTick,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that a new tick started.
    TimeAdvanced {
        /// One-based index of the tick that started.
        tick: u64,
    },
    /// Confirms that an actor moved between two adjacent cells.
    ActorMoved {
        /// Actor that moved.
        actor: Actor,
        /// Cell the actor occupied before moving.
        from: CellCoord,
        /// Cell the actor occupies after moving.
        to: CellCoord,
        /// Direction of the step.
        direction: Direction,
    },
    /// Reports that a requested step was refused.
    StepRejected {
        /// Actor whose step was refused.
        actor: Actor,
        /// Specific reason the step failed.
        reason: StepError,
    },
    /// Confirms that the evader picked up an item.
    ItemCollected {
        /// Cell the item was lying on.
        cell: CellCoord,
        /// Number of items collected so far, including this one.
        collected: u32,
    },
    /// Announces that the run reached a terminal outcome.
    RunConcluded {
        /// How the run ended.
        outcome: Outcome,
    },
}

/// Immutable representation of the evader used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EvaderSnapshot {
    /// Cell currently occupied by the evader.
    pub cell: CellCoord,
    /// Direction of the evader's most recent step.
    pub facing: Direction,
    /// Hitbox and vision parameters.
    pub profile: ActorProfile,
}

/// Immutable representation of the pursuer used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PursuerSnapshot {
    /// Cell currently occupied by the pursuer.
    pub cell: CellCoord,
    /// Hitbox and vision parameters.
    pub profile: ActorProfile,
}
