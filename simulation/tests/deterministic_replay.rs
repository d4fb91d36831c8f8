use stealth_pursuit_core::{ActorProfile, CellCoord, Hitbox, ObstacleRect, Outcome, PursuitMode};
use stealth_pursuit_simulation::{Config, Simulation, SimulationSnapshot, TickReport};
use stealth_pursuit_world::MapLayout;

const MAP: [&str; 10] = [
    "############",
    "#T.....#...#",
    "#.##.#.#.#.#",
    "#.#..#...#.#",
    "#.#.####.#I#",
    "#...#..#...#",
    "###.#.##.###",
    "#I....M....#",
    "#.####.###E#",
    "############",
];

#[test]
fn deterministic_replay_produces_expected_run() {
    let first = replay(0x5157_ea17);
    let second = replay(0x5157_ea17);

    assert_eq!(first.reports, second.reports, "replay diverged between runs");
    assert_eq!(first.snapshots, second.snapshots);

    let last = first.snapshots.last().expect("at least one tick");
    assert_eq!(last.tick, 27);
    assert_eq!(last.outcome, Some(Outcome::Captured));
    assert_eq!(last.evader.cell, CellCoord::new(7, 2));
    assert_eq!(last.pursuer.cell, CellCoord::new(7, 2));
    assert_eq!(last.collected, 2);

    // The first draw lands on the furnished cell (3, 4) and is dropped at once.
    assert_eq!(
        first.patrol_waypoints(),
        vec![CellCoord::new(2, 10), CellCoord::new(1, 5)]
    );
    assert_eq!(first.snapshots[0].pursuer.cell, CellCoord::new(7, 6));

    let first_chase = first
        .reports
        .iter()
        .position(|report| report.mode == PursuitMode::Chase)
        .expect("pursuer spotted the evader");
    assert_eq!(first.reports[first_chase].tick, 17);
    assert!(first.reports[first_chase..]
        .iter()
        .all(|report| report.mode == PursuitMode::Chase));
}

#[test]
fn another_seed_takes_another_route() {
    let outcome = replay(42);
    let last = outcome.snapshots.last().expect("at least one tick");

    assert_eq!(last.tick, 10);
    assert_eq!(last.outcome, Some(Outcome::Captured));
    assert_eq!(last.pursuer.cell, CellCoord::new(4, 8));
    assert_eq!(last.collected, 0);
    assert_eq!(
        outcome.patrol_waypoints(),
        vec![
            CellCoord::new(7, 5),
            CellCoord::new(6, 8),
            CellCoord::new(3, 7)
        ]
    );
}

#[test]
fn waypoints_stay_on_free_interior_cells() {
    for seed in [0, 42, 0x5157_ea17, u64::MAX] {
        let outcome = replay(seed);

        for snapshot in &outcome.snapshots {
            for waypoint in &snapshot.waypoints {
                assert!((1..=8).contains(&waypoint.row()), "tick {}", snapshot.tick);
                assert!((1..=10).contains(&waypoint.column()), "tick {}", snapshot.tick);
                let row = MAP[waypoint.row() as usize].as_bytes();
                assert_ne!(row[waypoint.column() as usize], b'#', "tick {}", snapshot.tick);
            }
        }
    }
}

struct ReplayOutcome {
    reports: Vec<TickReport>,
    snapshots: Vec<SimulationSnapshot>,
}

impl ReplayOutcome {
    /// Distinct front waypoints in the order the pursuer held them.
    fn patrol_waypoints(&self) -> Vec<CellCoord> {
        let mut held: Vec<CellCoord> = Vec::new();
        for waypoint in self
            .snapshots
            .iter()
            .filter_map(|snapshot| snapshot.waypoints.first().copied())
        {
            if held.last() != Some(&waypoint) {
                held.push(waypoint);
            }
        }
        held
    }
}

fn replay(seed: u64) -> ReplayOutcome {
    let mut simulation = Simulation::new(layout(), config(seed)).expect("simulation");
    let mut reports = Vec::new();
    let mut snapshots = Vec::new();

    for _ in 0..120 {
        let report = simulation.tick();
        let finished = report.outcome.is_some();
        reports.push(report);
        snapshots.push(simulation.snapshot());
        if finished {
            break;
        }
    }

    ReplayOutcome { reports, snapshots }
}

fn config(seed: u64) -> Config {
    Config::new(
        ActorProfile::new(Hitbox::new(38.4), 1),
        ActorProfile::new(Hitbox::new(32.0), 2),
        seed,
    )
}

fn layout() -> MapLayout {
    let rows = MAP.len() as u32;
    let columns = MAP[0].len() as u32;
    let mut layout = MapLayout::new(rows, columns, 32.0);

    for (row, line) in MAP.iter().enumerate() {
        for (column, symbol) in line.chars().enumerate() {
            let cell = CellCoord::new(row as u32, column as u32);
            match symbol {
                '#' => {
                    let _ = layout.set_wall(cell);
                }
                'T' => layout.set_evader(cell),
                'M' => layout.set_pursuer(cell),
                'E' => layout.set_exit(cell),
                'I' => layout.add_item(cell),
                _ => {}
            }
        }
    }

    layout.add_obstacle(ObstacleRect::new(135.0, 100.0, 10.0, 10.0));
    layout
}
