//! Headless ecosystem simulation runner.
//!
//! Run with: cargo run -p eco-cli --
//!
//! Examples:
//!   cargo run -p eco-cli -- --scenario assets/scenario.toml --ticks 5000
//!   cargo run -p eco-cli -- --scenario assets/scenario.toml --time-scale 8 --seed 7

use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};

use eco_core::pawn::MAX_GROUP_ID;
use eco_core::{GridPos, Simulation, TemplateError, TemplateLibrary, World};
use eco_events::snapshot::generate_snapshot_id;
use eco_events::EventLog;

mod config;

use config::{ConfigError, Scenario};

/// Headless ecosystem simulation runner
#[derive(Parser, Debug)]
#[command(name = "ecosim")]
#[command(about = "Runs the ecosystem simulation and writes events and snapshots")]
struct Args {
    /// Scenario TOML file; defaults apply when omitted
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Directory of pawn template JSON files (overrides the scenario's)
    #[arg(long)]
    templates: Option<PathBuf>,

    /// Number of update steps to run
    #[arg(long, default_value_t = 2000)]
    ticks: u64,

    /// Length of one update step in seconds
    #[arg(long, default_value_t = 0.1)]
    dt: f32,

    /// Random seed for the world
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Simulation speed multiplier; high values substep automatically
    #[arg(long, default_value_t = 1.0)]
    time_scale: f32,

    /// Output directory for events and snapshots
    #[arg(long, default_value = "output")]
    output_dir: PathBuf,

    /// Steps between snapshots; 0 writes only the final one
    #[arg(long, default_value_t = 500)]
    snapshot_interval: u64,
}

/// Error terminating a run.
#[derive(Debug)]
enum RunError {
    Config(ConfigError),
    Template(TemplateError),
    UnknownTemplate(String),
    InvalidGroup(u8),
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for RunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunError::Config(e) => write!(f, "scenario error: {}", e),
            RunError::Template(e) => write!(f, "template error: {}", e),
            RunError::UnknownTemplate(name) => {
                write!(f, "scenario spawns unknown template '{}'", name)
            }
            RunError::InvalidGroup(id) => {
                write!(f, "scenario group id {} is out of range (1..={})", id, MAX_GROUP_ID)
            }
            RunError::Io(e) => write!(f, "io error: {}", e),
            RunError::Json(e) => write!(f, "serialization error: {}", e),
        }
    }
}

impl std::error::Error for RunError {}

impl From<ConfigError> for RunError {
    fn from(e: ConfigError) -> Self {
        RunError::Config(e)
    }
}

impl From<TemplateError> for RunError {
    fn from(e: TemplateError) -> Self {
        RunError::Template(e)
    }
}

impl From<std::io::Error> for RunError {
    fn from(e: std::io::Error) -> Self {
        RunError::Io(e)
    }
}

impl From<serde_json::Error> for RunError {
    fn from(e: serde_json::Error) -> Self {
        RunError::Json(e)
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn main() {
    init_tracing();
    let args = Args::parse();

    if let Err(error) = run(&args) {
        tracing::error!(%error, "simulation run failed");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), RunError> {
    let scenario = match &args.scenario {
        Some(path) => Scenario::from_file(path)?,
        None => Scenario::default(),
    };

    let mut library = TemplateLibrary::new();
    for data in scenario.templates.iter().cloned() {
        library.register(data)?;
    }
    if let Some(dir) = args.templates.as_ref().or(scenario.templates_dir.as_ref()) {
        library.load_dir(dir)?;
    }

    let mut world = World::new(scenario.world.width, scenario.world.height, args.seed);
    world.clock_mut().time_scale = scenario.world.world_time_scale;
    world.clock_mut().set_hours(scenario.world.start_hours);
    for group in &scenario.groups {
        if group.id == 0 || group.id > MAX_GROUP_ID {
            return Err(RunError::InvalidGroup(group.id));
        }
        world.set_group_limit(group.id, group.limit);
    }

    for batch in &scenario.spawns {
        let Some(data) = library.get(&batch.template) else {
            return Err(RunError::UnknownTemplate(batch.template.clone()));
        };
        for _ in 0..batch.count {
            let pos = match batch.position {
                Some([x, y]) => GridPos::new(x, y),
                None => world.random_tile(),
            };
            let id = world.spawn_pawn(data.clone(), pos);
            if batch.group > 0 {
                if let Some(pawn) = world.pawn_mut(id) {
                    pawn.group_id = batch.group;
                }
            }
        }
    }

    fs::create_dir_all(&args.output_dir)?;
    let mut log = EventLog::new(args.output_dir.join("events.jsonl"))?;
    let mut sim = Simulation::new(world).with_time_scale(args.time_scale);

    tracing::info!(
        pawns = sim.world.pawn_count(),
        ticks = args.ticks,
        seed = args.seed,
        "simulation starting"
    );

    let mut snapshot_seq = 0u64;
    for tick in 1..=args.ticks {
        sim.update(args.dt);

        let time = sim.world.time();
        for (pawn, kind) in sim.drain_events() {
            log.record(time, pawn, kind)?;
        }

        if args.snapshot_interval > 0 && tick % args.snapshot_interval == 0 {
            write_snapshot(&args.output_dir, snapshot_seq, &sim.world)?;
            snapshot_seq += 1;
        }

        if sim.world.pawn_count() == 0 {
            tracing::info!(tick, "world is empty, stopping early");
            break;
        }
    }

    write_snapshot(&args.output_dir, snapshot_seq, &sim.world)?;
    log.flush()?;

    tracing::info!(
        pawns = sim.world.pawn_count(),
        events = log.event_count(),
        "simulation finished"
    );
    Ok(())
}

fn write_snapshot(dir: &Path, seq: u64, world: &World) -> Result<(), RunError> {
    let snapshot = world.snapshot();
    let path = dir.join(format!("{}.json", generate_snapshot_id(seq)));
    fs::write(&path, snapshot.to_json_pretty()?)?;
    tracing::debug!(path = %path.display(), "snapshot written");
    Ok(())
}
