//! Delve - print randomly generated dungeon levels.

use std::error::Error;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use delve_core::Point;
use delve_gen::{LayoutKind, Level, LevelConfig, RandomSource, RngSource, Terrain, generate};
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Layout {
    Zones,
    Partition,
    Wiggle,
}

impl From<Layout> for LayoutKind {
    fn from(layout: Layout) -> Self {
        match layout {
            Layout::Zones => LayoutKind::Zones,
            Layout::Partition => LayoutKind::partition(),
            Layout::Wiggle => LayoutKind::wiggle(),
        }
    }
}

/// Room-and-tunnel dungeon generator
#[derive(Parser, Debug)]
#[command(name = "delve")]
#[command(version, about, long_about = None)]
struct Args {
    /// Random seed
    #[arg(short, long, default_value_t = 123)]
    seed: u64,

    /// Level width
    #[arg(long)]
    width: Option<i32>,

    /// Level height
    #[arg(long)]
    height: Option<i32>,

    /// Zone grid columns
    #[arg(long)]
    grid_width: Option<i32>,

    /// Zone grid rows
    #[arg(long)]
    grid_height: Option<i32>,

    /// Room layout
    #[arg(short, long, value_enum)]
    layout: Option<Layout>,

    /// JSON file with level settings; flags override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seeds to try before giving up
    #[arg(short, long, default_value_t = 10)]
    attempts: usize,

    /// Mark every room with its label
    #[arg(long)]
    labels: bool,

    /// Draw the walk from the up to the down staircase
    #[arg(long)]
    route: bool,

    /// Log generation steps (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn level_config(&self) -> Result<LevelConfig, Box<dyn Error>> {
        let mut config = match &self.config {
            Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
            None => LevelConfig::default(),
        };
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(grid_width) = self.grid_width {
            config.grid_width = grid_width;
        }
        if let Some(grid_height) = self.grid_height {
            config.grid_height = grid_height;
        }
        if let Some(layout) = self.layout {
            config.layout = layout.into();
        }
        config.validate()?;
        Ok(config)
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Generate with fresh seeds until a level comes out or `attempts` runs
/// are spent.
fn build(config: &LevelConfig, seed: u64, attempts: usize) -> Result<Level, Box<dyn Error>> {
    let mut random = RngSource::seeded(seed);
    let mut last = None;
    for attempt in 0..attempts.max(1) {
        match generate(config, &mut random) {
            Ok(level) => return Ok(level),
            Err(err) if err.is_retryable() => {
                log::info!("attempt {attempt}: {err}");
                last = Some(err);
                random = RngSource::seeded(random.next_long() as u64);
            }
            Err(err) => return Err(err.into()),
        }
    }
    Err(match last {
        Some(err) => format!("no level after {attempts} attempts: {err}").into(),
        None => "no attempts made".into(),
    })
}

/// Level rows with `*` over every tunnel and floor cell of the stairs route.
fn with_route(level: &Level) -> Result<Vec<String>, Box<dyn Error>> {
    let mut rows: Vec<Vec<char>> = level.strings().iter().map(|r| r.chars().collect()).collect();
    let (Some(up), Some(down)) = (level.find(Terrain::UpStairs), level.find(Terrain::DownStairs))
    else {
        log::warn!("route needs both staircases");
        return Ok(level.strings());
    };
    let Some(path) = level.travel_path(up, down)? else {
        log::warn!("no route from {up} to {down}");
        return Ok(level.strings());
    };
    for Point { x, y } in path {
        if matches!(level.terrain(Point::new(x, y)), Some(Terrain::Floor | Terrain::Tunnel)) {
            rows[y as usize][x as usize] = '*';
        }
    }
    Ok(rows.into_iter().map(String::from_iter).collect())
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = args.level_config()?;
    let mut level = build(&config, args.seed, args.attempts)?;
    if args.labels {
        level.label_rooms();
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if args.route {
        for row in with_route(&level)? {
            writeln!(out, "{row}")?;
        }
    } else {
        level.show(&mut out)?;
    }
    Ok(())
}
