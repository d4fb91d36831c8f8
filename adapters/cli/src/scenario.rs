//! TOML scenario files describing a map and both actors.

use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use stealth_pursuit_core::{ActorProfile, CellCoord, Hitbox, ObstacleRect};
use stealth_pursuit_simulation::Config;
use stealth_pursuit_world::MapLayout;

const DEFAULT_CELL_LENGTH: f32 = 32.0;
const DEFAULT_MAX_TICKS: u64 = 1_000;

/// Fully parsed scenario ready to be simulated.
#[derive(Debug)]
pub(crate) struct Scenario {
    pub(crate) layout: MapLayout,
    pub(crate) config: Config,
    pub(crate) max_ticks: u64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ScenarioFile {
    #[serde(default = "default_cell_length")]
    cell_length: f32,
    #[serde(default)]
    seed: u64,
    #[serde(default = "default_max_ticks")]
    max_ticks: u64,
    map: String,
    #[serde(default = "default_evader")]
    evader: ProfileFile,
    #[serde(default = "default_pursuer")]
    pursuer: ProfileFile,
    #[serde(default)]
    obstacles: Vec<ObstacleFile>,
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProfileFile {
    hitbox: f32,
    vision_range: u32,
}

impl From<ProfileFile> for ActorProfile {
    fn from(profile: ProfileFile) -> Self {
        ActorProfile::new(Hitbox::new(profile.hitbox), profile.vision_range)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ObstacleFile {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    #[serde(default)]
    rasterize: bool,
}

fn default_cell_length() -> f32 {
    DEFAULT_CELL_LENGTH
}

fn default_max_ticks() -> u64 {
    DEFAULT_MAX_TICKS
}

fn default_evader() -> ProfileFile {
    ProfileFile {
        hitbox: DEFAULT_CELL_LENGTH * 1.2,
        vision_range: 1,
    }
}

fn default_pursuer() -> ProfileFile {
    ProfileFile {
        hitbox: DEFAULT_CELL_LENGTH,
        vision_range: 2,
    }
}

/// Reads and parses the scenario stored at `path`.
pub(crate) fn load(path: &Path) -> Result<Scenario> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read scenario at {}", path.display()))?;
    parse(&contents).with_context(|| format!("invalid scenario {}", path.display()))
}

/// Parses scenario TOML contents.
pub(crate) fn parse(contents: &str) -> Result<Scenario> {
    let file: ScenarioFile =
        toml::from_str(contents).context("failed to parse scenario toml contents")?;
    let mut layout = parse_map(&file.map, file.cell_length)?;

    for obstacle in &file.obstacles {
        let rect = ObstacleRect::new(obstacle.x, obstacle.y, obstacle.width, obstacle.height);
        if obstacle.rasterize {
            let _ = layout.rasterize_obstacle(rect);
        } else {
            layout.add_obstacle(rect);
        }
    }

    Ok(Scenario {
        layout,
        config: Config::new(file.evader.into(), file.pursuer.into(), file.seed),
        max_ticks: file.max_ticks,
    })
}

fn parse_map(map: &str, cell_length: f32) -> Result<MapLayout> {
    let lines: Vec<&str> = map
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    let Some(first) = lines.first() else {
        bail!("scenario map is empty");
    };
    let columns = first.chars().count();
    if let Some((index, line)) = lines
        .iter()
        .enumerate()
        .find(|(_, line)| line.chars().count() != columns)
    {
        bail!(
            "map row {index} has {} columns; expected {columns}",
            line.chars().count()
        );
    }

    let rows = u32::try_from(lines.len()).context("map has too many rows")?;
    let columns = u32::try_from(columns).context("map has too many columns")?;
    let mut layout = MapLayout::new(rows, columns, cell_length);
    let mut placed = [false; 3];

    for (row, line) in (0..rows).zip(&lines) {
        for (column, symbol) in (0..columns).zip(line.chars()) {
            let cell = CellCoord::new(row, column);
            match symbol {
                '.' => {}
                '#' => {
                    let _ = layout.set_wall(cell);
                }
                'T' => {
                    place_once(&mut placed[0], 'T', cell)?;
                    layout.set_evader(cell);
                }
                'M' => {
                    place_once(&mut placed[1], 'M', cell)?;
                    layout.set_pursuer(cell);
                }
                'E' => {
                    place_once(&mut placed[2], 'E', cell)?;
                    layout.set_exit(cell);
                }
                'I' => layout.add_item(cell),
                other => bail!("unknown map symbol `{other}` at ({row}, {column})"),
            }
        }
    }

    Ok(layout)
}

fn place_once(placed: &mut bool, symbol: char, cell: CellCoord) -> Result<()> {
    if *placed {
        bail!(
            "map places `{symbol}` more than once; second at ({}, {})",
            cell.row(),
            cell.column()
        );
    }
    *placed = true;
    Ok(())
}
