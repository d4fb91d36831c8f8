#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for the stealth pursuit engine.
//!
//! The world owns the immutable [`GridMap`] together with everything that
//! changes during a run: actor cells, the evader's facing, the remaining
//! items and the terminal outcome. Systems never mutate it directly; they
//! submit [`Command`] values through [`apply`] and read it back through the
//! [`query`] module.

mod grid;
mod layout;
pub mod navigation;

pub use grid::GridMap;
pub use layout::{
    LayoutError, MapLayout, ResolvedLayout, DEFAULT_EVADER_CELL, DEFAULT_EXIT_CELL,
    DEFAULT_ITEM_CELL, DEFAULT_PURSUER_CELL,
};

use stealth_pursuit_core::{
    Actor, ActorProfile, CellCoord, Command, Direction, Event, Outcome, StepError,
};

use crate::navigation::{resolve_nearest_free, Resolution};

const INITIAL_FACING: Direction = Direction::Right;

#[derive(Clone, Debug)]
struct Evader {
    cell: CellCoord,
    facing: Direction,
    profile: ActorProfile,
}

#[derive(Clone, Debug)]
struct Pursuer {
    cell: CellCoord,
    profile: ActorProfile,
}

/// Represents the authoritative stealth pursuit world state.
#[derive(Clone, Debug)]
pub struct World {
    grid: GridMap,
    evader: Evader,
    pursuer: Pursuer,
    exit: CellCoord,
    items: Vec<CellCoord>,
    collected: u32,
    outcome: Option<Outcome>,
    tick_index: u64,
}

impl World {
    /// Builds a world from a map source and the two actor profiles.
    ///
    /// Missing map objects receive their defaults and both spawn cells are
    /// moved to the nearest cell their hitbox fits on.
    pub fn from_layout(
        layout: MapLayout,
        evader_profile: ActorProfile,
        pursuer_profile: ActorProfile,
    ) -> Result<Self, LayoutError> {
        let resolved = layout.resolve()?;
        let grid = resolved.grid;

        let evader_cell = repair_spawn(&grid, Actor::Evader, resolved.evader, evader_profile);
        let pursuer_cell = repair_spawn(&grid, Actor::Pursuer, resolved.pursuer, pursuer_profile);

        // The evader never steps onto its own spawn, so items there count as taken.
        let mut items = resolved.items;
        let placed = items.len();
        items.retain(|item| *item != evader_cell);
        let collected = u32::try_from(placed - items.len()).unwrap_or(u32::MAX);

        Ok(Self {
            grid,
            evader: Evader {
                cell: evader_cell,
                facing: INITIAL_FACING,
                profile: evader_profile,
            },
            pursuer: Pursuer {
                cell: pursuer_cell,
                profile: pursuer_profile,
            },
            exit: resolved.exit,
            items,
            collected,
            outcome: None,
            tick_index: 0,
        })
    }

    fn profile(&self, actor: Actor) -> ActorProfile {
        match actor {
            Actor::Evader => self.evader.profile,
            Actor::Pursuer => self.pursuer.profile,
        }
    }

    fn cell_mut(&mut self, actor: Actor) -> &mut CellCoord {
        match actor {
            Actor::Evader => &mut self.evader.cell,
            Actor::Pursuer => &mut self.pursuer.cell,
        }
    }

    fn validate_step(
        &self,
        actor: Actor,
        direction: Direction,
    ) -> Result<(CellCoord, CellCoord), StepError> {
        if self.outcome.is_some() {
            return Err(StepError::RunConcluded);
        }

        let from = match actor {
            Actor::Evader => self.evader.cell,
            Actor::Pursuer => self.pursuer.cell,
        };
        let to = from
            .step(direction, self.grid.rows(), self.grid.columns())
            .ok_or(StepError::OutOfBounds)?;

        if !self.grid.is_grid_free(to) {
            return Err(StepError::Wall);
        }

        if !self.grid.is_rect_free(to, self.profile(actor).hitbox) {
            return Err(StepError::BlockedStep);
        }

        Ok((from, to))
    }

    fn step(&mut self, actor: Actor, direction: Direction, out_events: &mut Vec<Event>) {
        let (from, to) = match self.validate_step(actor, direction) {
            Ok(cells) => cells,
            Err(reason) => {
                log::debug!("{actor:?} step {direction:?} rejected: {reason:?}");
                out_events.push(Event::StepRejected { actor, reason });
                return;
            }
        };

        *self.cell_mut(actor) = to;
        out_events.push(Event::ActorMoved {
            actor,
            from,
            to,
            direction,
        });

        if actor == Actor::Evader {
            self.evader.facing = direction;
            self.collect_item(to, out_events);

            if to == self.exit && self.items.is_empty() {
                self.conclude(Outcome::Escaped, out_events);
            }
        }
    }

    fn collect_item(&mut self, cell: CellCoord, out_events: &mut Vec<Event>) {
        // Several items may be listed on one cell; all of them are taken.
        let before = self.items.len();
        self.items.retain(|item| *item != cell);

        for _ in self.items.len()..before {
            self.collected = self.collected.saturating_add(1);
            out_events.push(Event::ItemCollected {
                cell,
                collected: self.collected,
            });
        }
    }

    fn conclude(&mut self, outcome: Outcome, out_events: &mut Vec<Event>) {
        log::info!(
            "run concluded on tick {} with {outcome:?} ({} item(s) collected)",
            self.tick_index,
            self.collected
        );
        self.outcome = Some(outcome);
        out_events.push(Event::RunConcluded { outcome });
    }
}

fn repair_spawn(
    grid: &GridMap,
    actor: Actor,
    cell: CellCoord,
    profile: ActorProfile,
) -> CellCoord {
    let resolution = resolve_nearest_free(grid, cell, profile.hitbox);
    if let Resolution::Relocated { from, to } = resolution {
        log::info!(
            "{actor:?} spawn ({}, {}) is blocked; relocated to ({}, {})",
            from.row(),
            from.column(),
            to.row(),
            to.column()
        );
    }
    resolution.cell()
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick => {
            if world.outcome.is_some() {
                return;
            }

            world.tick_index = world.tick_index.saturating_add(1);
            out_events.push(Event::TimeAdvanced {
                tick: world.tick_index,
            });
        }
        Command::Step { actor, direction } => world.step(actor, direction, out_events),
        Command::ConcludeTick => {
            if world.outcome.is_none() && world.evader.cell == world.pursuer.cell {
                world.conclude(Outcome::Captured, out_events);
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use stealth_pursuit_core::{CellCoord, EvaderSnapshot, Outcome, PursuerSnapshot};

    use super::{GridMap, World};

    /// Provides read-only access to the immutable occupancy grid.
    #[must_use]
    pub fn grid_map(world: &World) -> &GridMap {
        &world.grid
    }

    /// Captures the evader's cell, facing and profile.
    #[must_use]
    pub fn evader(world: &World) -> EvaderSnapshot {
        EvaderSnapshot {
            cell: world.evader.cell,
            facing: world.evader.facing,
            profile: world.evader.profile,
        }
    }

    /// Captures the pursuer's cell and profile.
    #[must_use]
    pub fn pursuer(world: &World) -> PursuerSnapshot {
        PursuerSnapshot {
            cell: world.pursuer.cell,
            profile: world.pursuer.profile,
        }
    }

    /// Cell the evader is currently heading for: the first uncollected item,
    /// or the exit once every item is collected.
    #[must_use]
    pub fn active_target(world: &World) -> CellCoord {
        world.items.first().copied().unwrap_or(world.exit)
    }

    /// Items still lying on the map, in collection order.
    #[must_use]
    pub fn remaining_items(world: &World) -> &[CellCoord] {
        &world.items
    }

    /// Number of items the evader picked up so far.
    #[must_use]
    pub fn collected_count(world: &World) -> u32 {
        world.collected
    }

    /// The exit cell.
    #[must_use]
    pub fn exit(world: &World) -> CellCoord {
        world.exit
    }

    /// Terminal outcome, if the run has concluded.
    #[must_use]
    pub fn outcome(world: &World) -> Option<Outcome> {
        world.outcome
    }

    /// Number of ticks started so far.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stealth_pursuit_core::{Hitbox, ObstacleRect};

    fn profile() -> ActorProfile {
        ActorProfile::new(Hitbox::new(10.0), 1)
    }

    fn corridor_world() -> World {
        let mut layout = MapLayout::new(5, 5, 10.0);
        layout.set_evader(CellCoord::new(0, 0));
        layout.set_pursuer(CellCoord::new(4, 0));
        layout.set_exit(CellCoord::new(0, 2));
        layout.add_item(CellCoord::new(0, 1));
        let _ = layout.set_wall(CellCoord::new(1, 0));
        World::from_layout(layout, profile(), profile()).expect("world")
    }

    fn step(world: &mut World, actor: Actor, direction: Direction) -> Vec<Event> {
        let mut events = Vec::new();
        apply(world, Command::Step { actor, direction }, &mut events);
        events
    }

    #[test]
    fn tick_advances_index() {
        let mut world = corridor_world();
        let mut events = Vec::new();

        apply(&mut world, Command::Tick, &mut events);
        apply(&mut world, Command::Tick, &mut events);

        assert_eq!(query::tick_index(&world), 2);
        assert_eq!(
            events,
            vec![
                Event::TimeAdvanced { tick: 1 },
                Event::TimeAdvanced { tick: 2 }
            ]
        );
    }

    #[test]
    fn invalid_steps_are_rejected_with_reason() {
        let mut world = corridor_world();

        assert_eq!(
            step(&mut world, Actor::Evader, Direction::Up),
            vec![Event::StepRejected {
                actor: Actor::Evader,
                reason: StepError::OutOfBounds,
            }]
        );
        assert_eq!(
            step(&mut world, Actor::Evader, Direction::Down),
            vec![Event::StepRejected {
                actor: Actor::Evader,
                reason: StepError::Wall,
            }]
        );
        assert_eq!(query::evader(&world).cell, CellCoord::new(0, 0));
    }

    #[test]
    fn furniture_rejects_oversized_hitbox() {
        let mut layout = MapLayout::new(3, 3, 10.0);
        layout.set_evader(CellCoord::new(0, 0));
        layout.set_pursuer(CellCoord::new(2, 2));
        layout.set_exit(CellCoord::new(2, 0));
        layout.add_item(CellCoord::new(0, 2));
        layout.add_obstacle(ObstacleRect::new(12.0, 12.0, 6.0, 6.0));
        let mut world = World::from_layout(layout, profile(), profile()).expect("world");

        let events = step(&mut world, Actor::Pursuer, Direction::Up);
        assert!(matches!(events[0], Event::ActorMoved { .. }));

        let events = step(&mut world, Actor::Pursuer, Direction::Left);
        assert_eq!(
            events,
            vec![Event::StepRejected {
                actor: Actor::Pursuer,
                reason: StepError::BlockedStep,
            }]
        );
    }

    #[test]
    fn evader_collects_items_then_escapes() {
        let mut world = corridor_world();
        assert_eq!(query::active_target(&world), CellCoord::new(0, 1));

        let events = step(&mut world, Actor::Evader, Direction::Right);
        assert_eq!(
            events,
            vec![
                Event::ActorMoved {
                    actor: Actor::Evader,
                    from: CellCoord::new(0, 0),
                    to: CellCoord::new(0, 1),
                    direction: Direction::Right,
                },
                Event::ItemCollected {
                    cell: CellCoord::new(0, 1),
                    collected: 1,
                },
            ]
        );
        assert_eq!(query::active_target(&world), CellCoord::new(0, 2));
        assert!(query::remaining_items(&world).is_empty());

        let events = step(&mut world, Actor::Evader, Direction::Right);
        assert_eq!(
            events.last(),
            Some(&Event::RunConcluded {
                outcome: Outcome::Escaped,
            })
        );
        assert_eq!(query::outcome(&world), Some(Outcome::Escaped));
        assert_eq!(query::collected_count(&world), 1);
    }

    #[test]
    fn items_sharing_a_cell_are_collected_together() {
        let mut layout = MapLayout::new(1, 3, 10.0);
        layout.set_evader(CellCoord::new(0, 0));
        layout.set_pursuer(CellCoord::new(0, 0));
        layout.set_exit(CellCoord::new(0, 2));
        layout.add_item(CellCoord::new(0, 1));
        layout.add_item(CellCoord::new(0, 1));
        let mut world = World::from_layout(layout, profile(), profile()).expect("world");

        let events = step(&mut world, Actor::Evader, Direction::Right);

        assert_eq!(
            &events[1..],
            &[
                Event::ItemCollected {
                    cell: CellCoord::new(0, 1),
                    collected: 1,
                },
                Event::ItemCollected {
                    cell: CellCoord::new(0, 1),
                    collected: 2,
                },
            ]
        );
        assert!(query::remaining_items(&world).is_empty());
        assert_eq!(query::active_target(&world), CellCoord::new(0, 2));

        let _ = step(&mut world, Actor::Evader, Direction::Right);
        assert_eq!(query::outcome(&world), Some(Outcome::Escaped));
    }

    #[test]
    fn exit_without_items_does_not_conclude() {
        let mut layout = MapLayout::new(3, 3, 10.0);
        layout.set_evader(CellCoord::new(0, 0));
        layout.set_pursuer(CellCoord::new(2, 2));
        layout.set_exit(CellCoord::new(0, 1));
        layout.add_item(CellCoord::new(0, 2));
        let mut world = World::from_layout(layout, profile(), profile()).expect("world");

        let _ = step(&mut world, Actor::Evader, Direction::Right);

        assert_eq!(query::outcome(&world), None);
        assert_eq!(query::evader(&world).facing, Direction::Right);

        let _ = step(&mut world, Actor::Evader, Direction::Down);
        assert_eq!(query::evader(&world).facing, Direction::Down);
    }

    #[test]
    fn shared_cell_is_captured_at_end_of_tick() {
        let mut layout = MapLayout::new(3, 3, 10.0);
        layout.set_evader(CellCoord::new(0, 0));
        layout.set_pursuer(CellCoord::new(0, 1));
        layout.set_exit(CellCoord::new(2, 2));
        layout.add_item(CellCoord::new(2, 0));
        let mut world = World::from_layout(layout, profile(), profile()).expect("world");
        let mut events = Vec::new();

        apply(&mut world, Command::ConcludeTick, &mut events);
        assert!(events.is_empty());

        let _ = step(&mut world, Actor::Pursuer, Direction::Left);
        apply(&mut world, Command::ConcludeTick, &mut events);

        assert_eq!(
            events,
            vec![Event::RunConcluded {
                outcome: Outcome::Captured,
            }]
        );

        let rejected = step(&mut world, Actor::Evader, Direction::Down);
        assert_eq!(
            rejected,
            vec![Event::StepRejected {
                actor: Actor::Evader,
                reason: StepError::RunConcluded,
            }]
        );

        events.clear();
        apply(&mut world, Command::Tick, &mut events);
        assert!(events.is_empty());
    }

    #[test]
    fn item_under_evader_spawn_is_collected_up_front() {
        let mut layout = MapLayout::new(3, 3, 10.0);
        layout.set_evader(CellCoord::new(1, 1));
        layout.set_pursuer(CellCoord::new(2, 0));
        layout.set_exit(CellCoord::new(0, 0));
        layout.add_item(CellCoord::new(1, 1));
        layout.add_item(CellCoord::new(2, 2));

        let world = World::from_layout(layout, profile(), profile()).expect("world");

        assert_eq!(query::collected_count(&world), 1);
        assert_eq!(query::active_target(&world), CellCoord::new(2, 2));
    }

    #[test]
    fn evader_spawn_on_furniture_is_relocated_one_hop() {
        let mut layout = MapLayout::new(3, 3, 10.0);
        layout.set_evader(CellCoord::new(1, 1));
        layout.set_pursuer(CellCoord::new(2, 0));
        layout.set_exit(CellCoord::new(0, 0));
        layout.add_item(CellCoord::new(2, 2));
        layout.add_obstacle(ObstacleRect::new(10.0, 10.0, 10.0, 10.0));

        let world = World::from_layout(layout, profile(), profile()).expect("world");

        let evader = query::evader(&world).cell;
        assert_eq!(evader, CellCoord::new(1, 2));
        assert_eq!(evader.manhattan_distance(CellCoord::new(1, 1)), 1);
        assert_eq!(query::pursuer(&world).cell, CellCoord::new(2, 0));
    }
}
