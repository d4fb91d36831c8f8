#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Per-tick driver that sequences the evader, the pursuer and the terminal
//! checks against the authoritative world.

use stealth_pursuit_core::{
    ActorProfile, CellCoord, Command, EvaderSnapshot, Event, Outcome, Path, PursuerSnapshot,
    PursuitMode,
};
use stealth_pursuit_system_evasion::Evasion;
use stealth_pursuit_system_pursuit::Pursuit;
use stealth_pursuit_system_vision::{self as vision, VisionSnapshot};
use stealth_pursuit_world::{self as world, query, LayoutError, MapLayout, World};

/// Configuration parameters required to construct a simulation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    evader: ActorProfile,
    pursuer: ActorProfile,
    rng_seed: u64,
}

impl Config {
    /// Creates a configuration from both actor profiles and the waypoint seed.
    #[must_use]
    pub const fn new(evader: ActorProfile, pursuer: ActorProfile, rng_seed: u64) -> Self {
        Self {
            evader,
            pursuer,
            rng_seed,
        }
    }

    /// Replaces the seed driving waypoint sampling.
    #[must_use]
    pub const fn with_seed(mut self, rng_seed: u64) -> Self {
        self.rng_seed = rng_seed;
        self
    }

    /// Replaces the evader's profile.
    #[must_use]
    pub const fn with_evader(mut self, evader: ActorProfile) -> Self {
        self.evader = evader;
        self
    }

    /// Replaces the pursuer's profile.
    #[must_use]
    pub const fn with_pursuer(mut self, pursuer: ActorProfile) -> Self {
        self.pursuer = pursuer;
        self
    }

    /// Hitbox and vision range of the evader.
    #[must_use]
    pub const fn evader(&self) -> ActorProfile {
        self.evader
    }

    /// Hitbox and vision range of the pursuer.
    #[must_use]
    pub const fn pursuer(&self) -> ActorProfile {
        self.pursuer
    }

    /// Seed driving waypoint sampling.
    #[must_use]
    pub const fn rng_seed(&self) -> u64 {
        self.rng_seed
    }
}

/// Summary of a single tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TickReport {
    /// Index of the tick, starting at one.
    pub tick: u64,
    /// Mode the pursuer acted under.
    ///
    /// When the evader escapes during its own move the pursuer does not act,
    /// and this carries the mode of the previous tick (`Patrol` on tick one).
    pub mode: PursuitMode,
    /// Terminal outcome, once the run has concluded.
    pub outcome: Option<Outcome>,
    /// Every event the world emitted during the tick.
    pub events: Vec<Event>,
}

/// Everything an observer may render or inspect after a tick.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationSnapshot {
    /// Number of ticks run so far.
    pub tick: u64,
    /// Evader cell, facing and profile.
    pub evader: EvaderSnapshot,
    /// Pursuer cell and profile.
    pub pursuer: PursuerSnapshot,
    /// Evader route planned on the last tick.
    pub evader_path: Option<Path>,
    /// Pursuer route currently followed.
    pub pursuer_path: Option<Path>,
    /// Pending patrol waypoints.
    pub waypoints: Vec<CellCoord>,
    /// Vision zones recomputed at the end of the last tick.
    pub vision: VisionSnapshot,
    /// Items picked up so far.
    pub collected: u32,
    /// Items still on the map.
    pub remaining_items: Vec<CellCoord>,
    /// The exit cell.
    pub exit: CellCoord,
    /// Mode the pursuer acted under on the last tick.
    pub mode: PursuitMode,
    /// Terminal outcome, if any.
    pub outcome: Option<Outcome>,
}

/// Owns the world and both controllers for the duration of a run.
#[derive(Debug)]
pub struct Simulation {
    world: World,
    evasion: Evasion,
    pursuit: Pursuit,
    vision: VisionSnapshot,
}

impl Simulation {
    /// Builds the world from a map source and prepares both controllers.
    pub fn new(layout: MapLayout, config: Config) -> Result<Self, LayoutError> {
        let world = World::from_layout(layout, config.evader(), config.pursuer())?;
        let vision = vision::observe(&world);

        Ok(Self {
            world,
            evasion: Evasion::default(),
            pursuit: Pursuit::new(config.rng_seed()),
            vision,
        })
    }

    /// Runs one tick: evader move, pursuer move, capture check, vision update.
    ///
    /// Once the run has concluded the call changes nothing and reports the
    /// stored outcome.
    pub fn tick(&mut self) -> TickReport {
        if let Some(outcome) = query::outcome(&self.world) {
            return TickReport {
                tick: query::tick_index(&self.world),
                mode: self.pursuit.mode(),
                outcome: Some(outcome),
                events: Vec::new(),
            };
        }

        let mut events = Vec::new();
        let mut commands = Vec::new();

        world::apply(&mut self.world, Command::Tick, &mut events);

        self.evasion.handle(&self.world, &mut commands);
        self.execute(&mut commands, &mut events);

        let mode = self.pursuit.handle(&self.world, &mut commands);
        self.execute(&mut commands, &mut events);
        self.pursuit.observe(&events);

        world::apply(&mut self.world, Command::ConcludeTick, &mut events);
        self.vision = vision::observe(&self.world);

        let tick = query::tick_index(&self.world);
        log::trace!("tick {tick} finished with {} event(s)", events.len());

        TickReport {
            tick,
            mode,
            outcome: query::outcome(&self.world),
            events,
        }
    }

    fn execute(&mut self, commands: &mut Vec<Command>, events: &mut Vec<Event>) {
        for command in commands.drain(..) {
            world::apply(&mut self.world, command, events);
        }
    }

    /// Ticks until the run concludes or `max_ticks` ticks have elapsed.
    pub fn run(&mut self, max_ticks: u64) -> Option<Outcome> {
        for _ in 0..max_ticks {
            if let Some(outcome) = self.tick().outcome {
                return Some(outcome);
            }
        }

        query::outcome(&self.world)
    }

    /// Captures the observable state of the run.
    #[must_use]
    pub fn snapshot(&self) -> SimulationSnapshot {
        SimulationSnapshot {
            tick: query::tick_index(&self.world),
            evader: query::evader(&self.world),
            pursuer: query::pursuer(&self.world),
            evader_path: self.evasion.path().cloned(),
            pursuer_path: self.pursuit.path().cloned(),
            waypoints: self.pursuit.waypoints().collect(),
            vision: self.vision.clone(),
            collected: query::collected_count(&self.world),
            remaining_items: query::remaining_items(&self.world).to_vec(),
            exit: query::exit(&self.world),
            mode: self.pursuit.mode(),
            outcome: query::outcome(&self.world),
        }
    }

    /// Read-only access to the authoritative world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stealth_pursuit_core::Hitbox;

    fn config() -> Config {
        let profile = ActorProfile::new(Hitbox::new(10.0), 1);
        Config::new(profile, profile, 5)
    }

    #[test]
    fn config_overrides_replace_single_fields() {
        let wide = ActorProfile::new(Hitbox::new(12.0), 4);
        let config = config().with_seed(9).with_pursuer(wide);

        assert_eq!(config.rng_seed(), 9);
        assert_eq!(config.pursuer(), wide);
        assert_eq!(config.evader(), ActorProfile::new(Hitbox::new(10.0), 1));
    }

    #[test]
    fn initial_snapshot_has_vision_but_no_outcome() {
        let mut layout = MapLayout::new(5, 5, 10.0);
        layout.set_evader(CellCoord::new(2, 2));
        layout.set_pursuer(CellCoord::new(4, 4));
        layout.set_exit(CellCoord::new(0, 0));
        layout.add_item(CellCoord::new(0, 4));

        let simulation = Simulation::new(layout, config()).expect("simulation");
        let snapshot = simulation.snapshot();

        assert_eq!(snapshot.tick, 0);
        assert_eq!(snapshot.outcome, None);
        assert!(snapshot.vision.evader.contains(CellCoord::new(2, 3)));
        assert_eq!(snapshot.vision.pursuer.len(), 3);
        assert!(snapshot.evader_path.is_none());
    }

    #[test]
    fn concluded_run_ignores_further_ticks() {
        let mut layout = MapLayout::new(3, 3, 10.0);
        layout.set_evader(CellCoord::new(0, 0));
        layout.set_pursuer(CellCoord::new(0, 0));
        layout.set_exit(CellCoord::new(2, 2));
        layout.add_item(CellCoord::new(2, 0));
        let mut simulation = Simulation::new(layout, config()).expect("simulation");

        assert_eq!(simulation.run(10), Some(Outcome::Captured));
        let after = simulation.snapshot();

        let report = simulation.tick();
        assert!(report.events.is_empty());
        assert_eq!(report.outcome, Some(Outcome::Captured));
        assert_eq!(simulation.snapshot(), after);
    }
}
