#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Evader controller that walks toward the next item, then the exit.

use stealth_pursuit_core::{Actor, Command, Direction, Path};
use stealth_pursuit_system_pathfinding::find_path;
use stealth_pursuit_world::{query, World};

/// Pure system that plans the evader's route and proposes its next step.
#[derive(Debug, Default)]
pub struct Evasion {
    path: Option<Path>,
}

impl Evasion {
    /// Replans toward the active target and emits at most one evader step.
    ///
    /// The route is searched from scratch on every call. When the next cell of
    /// the route is covered by furniture the route is dropped and no step is
    /// emitted.
    pub fn handle(&mut self, world: &World, out: &mut Vec<Command>) {
        if query::outcome(world).is_some() {
            return;
        }

        let grid = query::grid_map(world);
        let evader = query::evader(world);
        let target = query::active_target(world);

        self.path = find_path(grid, evader.cell, target, evader.profile.hitbox);
        let Some(path) = self.path.as_mut() else {
            log::debug!(
                "evader target ({}, {}) is unreachable from ({}, {})",
                target.row(),
                target.column(),
                evader.cell.row(),
                evader.cell.column()
            );
            return;
        };

        let Some(next) = path.next_hop() else {
            return;
        };

        if !grid.is_rect_free(next, evader.profile.hitbox) {
            log::debug!(
                "evader step onto ({}, {}) is blocked by furniture",
                next.row(),
                next.column()
            );
            self.path = None;
            return;
        }

        let Some(direction) = Direction::between(evader.cell, next) else {
            self.path = None;
            return;
        };

        out.push(Command::Step {
            actor: Actor::Evader,
            direction,
        });
        let _ = path.advance();
    }

    /// Route computed on the most recent call, with the proposed step consumed.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_ref()
    }
}
