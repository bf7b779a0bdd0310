use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use eascore::{Cluster, ShowerParticle};
use log::error;

use eassim::data::handle::ShowerDataHandle;
use eassim::error::{SimulationError, SimulationResult};
use eassim::sim::reduction::store_observables;
use eassim::sim::settings::{load_cluster, SimulationSettings};
use eassim::sim::simulation::ShowerSimulation;

#[derive(Parser, Debug)]
#[command(name = "eassim", about = "Air shower detector placement simulation")]
struct Cli {
    /// SQLite database holding ground particles and simulation results
    #[arg(long, short)]
    database: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Layout {
    /// one four detector station
    Single,
    /// one two detector station
    Pair,
    /// four four detector stations on a triangle
    Simple,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Place a cluster around a shower many times and store the particle hits
    Simulate {
        /// JSON settings file, command line values override it
        #[arg(long)]
        settings: Option<PathBuf>,
        /// ground particle dataset
        #[arg(long)]
        ground: Option<String>,
        /// name of the simulation area to create
        #[arg(long)]
        destination: Option<String>,
        /// maximum core distance of the cluster center in meters
        #[arg(long)]
        radius: Option<f64>,
        /// number of cluster positions
        #[arg(long)]
        events: Option<u32>,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        threads: Option<usize>,
        #[arg(long)]
        batch_size: Option<usize>,
        /// JSON cluster description, overrides --layout
        #[arg(long)]
        cluster: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = Layout::Simple)]
        layout: Layout,
        /// station spacing for the simple layout in meters
        #[arg(long, default_value_t = 250.0)]
        cluster_size: f64,
    },
    /// Derive observables and coincidences from a simulation area
    Reduce {
        run: String,
    },
    /// Load a JSON array of ground particles into a new dataset
    ImportGround {
        name: String,
        path: PathBuf,
    },
}

fn required<T>(value: Option<T>, name: &str) -> SimulationResult<T> {
    value.ok_or_else(|| SimulationError::Configuration(format!("--{} is required without --settings", name)))
}

fn simulate_settings(
    settings: Option<PathBuf>,
    ground: Option<String>,
    destination: Option<String>,
    radius: Option<f64>,
    events: Option<u32>,
) -> SimulationResult<SimulationSettings> {
    match settings {
        Some(path) => {
            let mut settings = SimulationSettings::from_json_file(&path)?;
            if let Some(ground) = ground {
                settings.ground_particles = ground;
            }
            if let Some(destination) = destination {
                settings.destination = destination;
            }
            if let Some(radius) = radius {
                settings.max_radius = radius;
            }
            if let Some(events) = events {
                settings.n_events = events;
            }
            Ok(settings)
        }
        None => Ok(SimulationSettings::new(
            &required(ground, "ground")?,
            &required(destination, "destination")?,
            required(radius, "radius")?,
            required(events, "events")?,
        )),
    }
}

fn run(cli: Cli) -> SimulationResult<()> {
    let mut handle = ShowerDataHandle::new(&cli.database)?;

    match cli.command {
        Command::Simulate {
            settings,
            ground,
            destination,
            radius,
            events,
            seed,
            threads,
            batch_size,
            cluster,
            layout,
            cluster_size,
        } => {
            let mut settings = simulate_settings(settings, ground, destination, radius, events)?;
            if seed.is_some() {
                settings.seed = seed;
            }
            if let Some(threads) = threads {
                settings.num_threads = threads;
            }
            if let Some(batch_size) = batch_size {
                settings.batch_size = batch_size;
            }

            let cluster = match cluster {
                Some(path) => load_cluster(&path)?,
                None => match layout {
                    Layout::Single => Cluster::single_station(),
                    Layout::Pair => Cluster::two_detector_station(),
                    Layout::Simple => Cluster::simple(cluster_size),
                },
            };

            ShowerSimulation::new(cluster, settings)?.run(&mut handle)?;
        }
        Command::Reduce { run } => {
            store_observables(&mut handle, &run)?;
        }
        Command::ImportGround { name, path } => {
            let reader = BufReader::new(File::open(&path)?);
            let particles: Vec<ShowerParticle> = serde_json::from_reader(reader)?;
            handle.write_ground_particles(&name, &particles)?;
            log::info!("imported {} ground particles into {}", particles.len(), name);
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.is_precondition() => {
            error!("cancelled: {}", e);
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
