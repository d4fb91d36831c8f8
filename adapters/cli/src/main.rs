#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a stealth pursuit scenario headlessly.

mod logging;
mod scenario;

use std::{path::PathBuf, thread, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use stealth_pursuit_core::Outcome;
use stealth_pursuit_simulation::{Simulation, SimulationSnapshot, TickReport};

const DEMO_SCENARIO: &str = include_str!("../../../demos/manor.toml");

/// Runs a thief-versus-master pursuit on a grid map and reports each tick.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Scenario TOML file; the bundled manor demo runs when omitted.
    scenario: Option<PathBuf>,

    /// Overrides the waypoint sampling seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Overrides the tick limit.
    #[arg(long)]
    max_ticks: Option<u64>,

    /// Delay between ticks in milliseconds.
    #[arg(long, default_value_t = 0)]
    tick_ms: u64,

    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,
}

/// Entry point for the stealth pursuit command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);

    let scenario = match &args.scenario {
        Some(path) => scenario::load(path)?,
        None => scenario::parse(DEMO_SCENARIO).context("bundled demo scenario is invalid")?,
    };

    let config = match args.seed {
        Some(seed) => scenario.config.with_seed(seed),
        None => scenario.config,
    };
    let max_ticks = args.max_ticks.unwrap_or(scenario.max_ticks);
    let pacing = Duration::from_millis(args.tick_ms);

    let mut simulation =
        Simulation::new(scenario.layout, config).context("scenario map is not playable")?;
    let total_items = simulation.snapshot().remaining_items.len();

    for _ in 0..max_ticks {
        let report = simulation.tick();
        println!(
            "{}",
            status_line(&report, &simulation.snapshot(), total_items)
        );

        if let Some(outcome) = report.outcome {
            println!("{}", outcome_message(outcome));
            return Ok(());
        }

        if !pacing.is_zero() {
            thread::sleep(pacing);
        }
    }

    println!("No outcome after {max_ticks} ticks.");
    Ok(())
}

fn status_line(report: &TickReport, snapshot: &SimulationSnapshot, total_items: usize) -> String {
    let thief = snapshot.evader.cell;
    let master = snapshot.pursuer.cell;
    format!(
        "tick {:>4} | master ({}, {}) {:?} | thief ({}, {}) facing {:?} | items {}/{}",
        report.tick,
        master.row(),
        master.column(),
        report.mode,
        thief.row(),
        thief.column(),
        snapshot.evader.facing,
        snapshot.collected,
        total_items
    )
}

fn outcome_message(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Escaped => "The thief escaped!",
        Outcome::Captured => "Caught by the master!",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_runs_to_a_status_line() {
        let scenario = scenario::parse(DEMO_SCENARIO).expect("demo");
        let mut simulation = Simulation::new(scenario.layout, scenario.config).expect("simulation");
        let total_items = simulation.snapshot().remaining_items.len();

        let report = simulation.tick();
        let line = status_line(&report, &simulation.snapshot(), total_items);

        assert!(line.starts_with("tick    1 | master ("));
        assert!(line.ends_with("items 0/2"));
    }

    #[test]
    fn outcome_messages_name_the_winner() {
        assert_eq!(outcome_message(Outcome::Escaped), "The thief escaped!");
        assert_eq!(outcome_message(Outcome::Captured), "Caught by the master!");
    }

    #[test]
    fn arguments_parse_overrides() {
        let args = Args::parse_from([
            "stealth-pursuit",
            "map.toml",
            "--seed",
            "9",
            "--max-ticks",
            "50",
            "--tick-ms",
            "200",
        ]);

        assert_eq!(args.scenario, Some(PathBuf::from("map.toml")));
        assert_eq!(args.seed, Some(9));
        assert_eq!(args.max_ticks, Some(50));
        assert_eq!(args.tick_ms, 200);
        assert!(!args.verbose);
    }
}
