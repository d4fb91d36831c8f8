#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Collision-aware A* search over the occupancy grid.

use std::{
    cmp::Ordering,
    collections::{BinaryHeap, HashMap},
};

use stealth_pursuit_core::{CellCoord, Direction, Hitbox, Path};
use stealth_pursuit_world::{
    navigation::{resolve_nearest_free, Resolution},
    GridMap,
};

/// Frontier entry carrying the whole route walked so far.
#[derive(Debug)]
struct FrontierEntry {
    estimated_total: u32,
    sequence: u64,
    cost: u32,
    path: Vec<CellCoord>,
}

impl PartialEq for FrontierEntry {
    fn eq(&self, other: &Self) -> bool {
        self.estimated_total == other.estimated_total && self.sequence == other.sequence
    }
}

impl Eq for FrontierEntry {}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so the max-heap pops the lowest estimate, oldest first.
        other
            .estimated_total
            .cmp(&self.estimated_total)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

/// Finds a shortest 4-connected path from `start` to `goal` for an actor with
/// the provided hitbox.
///
/// A start cell the hitbox does not fit on is first moved to the nearest usable
/// cell, so the returned path may begin elsewhere than `start`. Candidate cells
/// must be grid-free and clear of furniture. Among routes of equal length the
/// one whose frontier entries were enqueued first wins, with neighbours visited
/// in [`Direction::NEIGHBOR_ORDER`]. Returns `None` when the goal cannot be
/// reached.
#[must_use]
pub fn find_path(
    grid: &GridMap,
    start: CellCoord,
    goal: CellCoord,
    hitbox: Hitbox,
) -> Option<Path> {
    let start = match resolve_nearest_free(grid, start, hitbox) {
        Resolution::Unchanged(cell) => cell,
        Resolution::Relocated { from, to } => {
            log::trace!(
                "search start ({}, {}) is blocked; searching from ({}, {})",
                from.row(),
                from.column(),
                to.row(),
                to.column()
            );
            to
        }
        Resolution::Fallback(cell) => cell,
    };

    let mut frontier = BinaryHeap::new();
    let mut best_cost: HashMap<CellCoord, u32> = HashMap::new();
    let mut sequence: u64 = 0;

    let _ = best_cost.insert(start, 0);
    frontier.push(FrontierEntry {
        estimated_total: start.manhattan_distance(goal),
        sequence,
        cost: 0,
        path: vec![start],
    });

    while let Some(entry) = frontier.pop() {
        let Some(current) = entry.path.last().copied() else {
            continue;
        };

        if current == goal {
            return Some(Path::from_cells(entry.path));
        }

        if best_cost
            .get(&current)
            .is_some_and(|best| *best < entry.cost)
        {
            continue;
        }

        for direction in Direction::NEIGHBOR_ORDER {
            let Some(neighbor) = current.step(direction, grid.rows(), grid.columns()) else {
                continue;
            };

            if !grid.is_grid_free(neighbor) || !grid.is_rect_free(neighbor, hitbox) {
                continue;
            }

            let cost = entry.cost + 1;
            if best_cost.get(&neighbor).is_some_and(|best| *best <= cost) {
                continue;
            }

            let _ = best_cost.insert(neighbor, cost);
            sequence += 1;

            let mut path = entry.path.clone();
            path.push(neighbor);
            frontier.push(FrontierEntry {
                estimated_total: cost + neighbor.manhattan_distance(goal),
                sequence,
                cost,
                path,
            });
        }
    }

    None
}
