#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Two-state pursuer controller.
//!
//! The mode is derived afresh on every tick: the pursuer chases when the
//! evader stands inside its vision zone and patrols otherwise. Chasing replans
//! toward the evader's live cell on every tick. Patrolling walks between
//! randomly sampled interior waypoints and keeps its route until it is spent.

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use stealth_pursuit_core::{
    Actor, CellCoord, Command, Direction, Event, Hitbox, Path, PursuitMode,
};
use stealth_pursuit_system_pathfinding::find_path;
use stealth_pursuit_system_vision::is_visible;
use stealth_pursuit_world::{query, GridMap, World};

/// Pure system that selects the pursuer's goal and proposes its next step.
#[derive(Debug)]
pub struct Pursuit {
    rng: ChaCha8Rng,
    waypoints: VecDeque<CellCoord>,
    path: Option<Path>,
    mode: PursuitMode,
}

impl Pursuit {
    /// Creates a controller whose waypoint sampling is driven by `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            waypoints: VecDeque::new(),
            path: None,
            mode: PursuitMode::Patrol,
        }
    }

    /// Consumes world events; a refused pursuer step discards the route.
    pub fn observe(&mut self, events: &[Event]) {
        for event in events {
            if let Event::StepRejected {
                actor: Actor::Pursuer,
                reason,
            } = event
            {
                log::debug!("pursuer step rejected ({reason:?}); dropping route");
                self.path = None;
            }
        }
    }

    /// Decides this tick's mode, updates the route and emits at most one
    /// pursuer step.
    pub fn handle(&mut self, world: &World, out: &mut Vec<Command>) -> PursuitMode {
        if query::outcome(world).is_some() {
            return self.mode;
        }

        let grid = query::grid_map(world);
        let pursuer = query::pursuer(world);
        let evader = query::evader(world);
        let hitbox = pursuer.profile.hitbox;

        let mode = if is_visible(
            grid.rows(),
            grid.columns(),
            pursuer.cell,
            pursuer.profile.vision_range,
            evader.cell,
        ) {
            PursuitMode::Chase
        } else {
            PursuitMode::Patrol
        };

        if mode != self.mode {
            log::debug!("pursuer switches from {:?} to {mode:?}", self.mode);
        }
        log::trace!("pursuer acts in {mode:?} mode");
        self.mode = mode;

        match mode {
            PursuitMode::Chase => {
                self.path = find_path(grid, pursuer.cell, evader.cell, hitbox);
                if self.path.is_none() {
                    log::debug!(
                        "evader at ({}, {}) is visible but unreachable",
                        evader.cell.row(),
                        evader.cell.column()
                    );
                }
            }
            PursuitMode::Patrol => self.patrol(grid, pursuer.cell, hitbox),
        }

        self.advance(grid, pursuer.cell, hitbox, out);
        mode
    }

    fn patrol(&mut self, grid: &GridMap, position: CellCoord, hitbox: Hitbox) {
        if self.waypoints.is_empty() {
            if let Some(waypoint) = self.sample_waypoint(grid) {
                self.waypoints.push_back(waypoint);
            }
        }

        let spent = self.path.as_ref().map_or(true, |path| path.len() <= 1);
        if spent {
            if let Some(waypoint) = self.waypoints.front().copied() {
                self.path = find_path(grid, position, waypoint, hitbox);
                if self.path.is_none() {
                    log::debug!(
                        "waypoint ({}, {}) is unreachable; discarding it",
                        waypoint.row(),
                        waypoint.column()
                    );
                    let _ = self.waypoints.pop_front();
                }
            }
        }

        if self.path.is_some() && self.waypoints.front() == Some(&position) {
            let _ = self.waypoints.pop_front();
        }
    }

    fn advance(
        &mut self,
        grid: &GridMap,
        position: CellCoord,
        hitbox: Hitbox,
        out: &mut Vec<Command>,
    ) {
        let Some(path) = self.path.as_mut() else {
            return;
        };
        let Some(next) = path.next_hop() else {
            return;
        };

        if !grid.is_rect_free(next, hitbox) {
            log::debug!(
                "pursuer step onto ({}, {}) is blocked by furniture",
                next.row(),
                next.column()
            );
            self.path = None;
            return;
        }

        let Some(direction) = Direction::between(position, next) else {
            self.path = None;
            return;
        };

        out.push(Command::Step {
            actor: Actor::Pursuer,
            direction,
        });
        let _ = path.advance();
    }

    fn sample_waypoint(&mut self, grid: &GridMap) -> Option<CellCoord> {
        if !grid.has_free_interior() {
            return None;
        }

        loop {
            let row = self.rng.gen_range(1..=grid.rows() - 2);
            let column = self.rng.gen_range(1..=grid.columns() - 2);
            let cell = CellCoord::new(row, column);
            if grid.is_grid_free(cell) {
                return Some(cell);
            }
        }
    }

    /// Mode the pursuer acted under on the most recent tick.
    #[must_use]
    pub const fn mode(&self) -> PursuitMode {
        self.mode
    }

    /// Current route, with the proposed step already consumed.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_ref()
    }

    /// Pending patrol waypoints, front first.
    pub fn waypoints(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.waypoints.iter().copied()
    }
}
