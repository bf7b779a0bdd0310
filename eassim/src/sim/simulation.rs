use eascore::{sample_placements, simulate_event, Cluster, EventRecords, Placement};
use log::{debug, info, warn};
use rand::Rng;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;

use crate::data::handle::{insert_headers, insert_particles, insert_run, RunInfo, ShowerDataHandle};
use crate::error::{SimulationError, SimulationResult};
use crate::sim::settings::SimulationSettings;

/// What a finished simulation wrote.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationSummary {
    pub run: String,
    pub seed: u64,
    pub events: usize,
    pub headers: usize,
    pub particles: usize,
}

/// Places a cluster many times around a single shower and records the hits.
pub struct ShowerSimulation {
    pub cluster: Cluster,
    pub settings: SimulationSettings,
}

impl ShowerSimulation {
    pub fn new(cluster: Cluster, settings: SimulationSettings) -> SimulationResult<Self> {
        settings.validate()?;
        cluster.validate()?;
        Ok(ShowerSimulation { cluster, settings })
    }

    /// Run the simulation and store headers and particle hits in a new area
    ///
    /// The ground particle dataset must exist and the destination must not.
    /// Both are checked before anything is written. All output is written in
    /// one transaction, so a failed run leaves the handle unchanged.
    pub fn run(&self, handle: &mut ShowerDataHandle) -> SimulationResult<SimulationSummary> {
        let settings = &self.settings;
        settings.validate()?;
        self.cluster.validate()?;

        if !handle.ground_dataset_exists(&settings.ground_particles)? {
            return Err(SimulationError::Configuration(format!(
                "ground particle dataset {} not found",
                settings.ground_particles
            )));
        }
        if handle.run_exists(&settings.destination)? {
            return Err(SimulationError::DestinationConflict(settings.destination.clone()));
        }

        let ground = handle.read_ground_particles(&settings.ground_particles)?;
        let seed = settings.seed.unwrap_or_else(|| rand::thread_rng().gen());

        info!("running simulation {}", settings.destination);
        info!("ground particles: {} ({} rows)", settings.ground_particles, ground.len());
        info!(
            "maximum core distance {} m, {} cluster positions, {} stations, seed {}",
            settings.max_radius,
            settings.n_events,
            self.cluster.stations().len(),
            seed
        );
        if settings.n_events == 0 {
            warn!("no events requested, {} will be empty", settings.destination);
        }
        if ground.is_empty() {
            warn!("ground particle dataset {} is empty", settings.ground_particles);
        }

        let thread_pool = ThreadPoolBuilder::new().num_threads(settings.num_threads).build()?;

        let mut summary = SimulationSummary {
            run: settings.destination.clone(),
            seed,
            events: 0,
            headers: 0,
            particles: 0,
        };

        let sampler = sample_placements(settings.max_radius, settings.n_events as usize, seed)?;

        let tx = handle.connection.transaction()?;
        insert_run(&tx, &RunInfo {
            name: settings.destination.clone(),
            ground_particles: settings.ground_particles.clone(),
            max_radius: settings.max_radius,
            n_events: settings.n_events,
            seed,
        })?;

        // placements are drawn sequentially so the output only depends on the seed
        let mut placements = (0u32..).zip(sampler);

        loop {
            let batch: Vec<(u32, Placement)> = placements.by_ref().take(settings.batch_size).collect();
            if batch.is_empty() {
                break;
            }

            let events: Vec<EventRecords> = thread_pool.install(|| {
                batch.par_iter()
                    .map(|(event_id, placement)| simulate_event(*event_id, placement, &self.cluster, &ground))
                    .collect()
            });

            for event in &events {
                insert_headers(&tx, &settings.destination, &event.headers)?;
                insert_particles(&tx, &settings.destination, &event.particles)?;
                summary.headers += event.headers.len();
                summary.particles += event.particles.len();
            }
            summary.events += events.len();

            debug!("batch of {} events, {} particle hits", events.len(), events.iter().map(|e| e.particles.len()).sum::<usize>());
            info!("{} / {} events simulated", summary.events, settings.n_events);
        }

        tx.commit()?;

        info!(
            "simulation {} done: {} headers, {} particle hits",
            summary.run, summary.headers, summary.particles
        );

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eascore::{Detector, Orientation, ShowerParticle, Station};

    fn handle_with_ground() -> ShowerDataHandle {
        let mut handle = ShowerDataHandle::open_in_memory().unwrap();
        let particles: Vec<ShowerParticle> = (0..400)
            .map(|i| {
                let x = (i % 20) as f64 - 10.0;
                let y = (i / 20) as f64 - 10.0;
                ShowerParticle::from_xy(3, x + 0.1, y + 0.1, i as f64, 1.0)
            })
            .collect();
        handle.write_ground_particles("grid", &particles).unwrap();
        handle
    }

    #[test]
    fn test_missing_ground_dataset() {
        let mut handle = ShowerDataHandle::open_in_memory().unwrap();
        let sim = ShowerSimulation::new(Cluster::single_station(), SimulationSettings::new("nope", "sim", 10.0, 5)).unwrap();

        let err = sim.run(&mut handle).unwrap_err();
        assert!(matches!(err, SimulationError::Configuration(_)));
        assert!(!handle.run_exists("sim").unwrap());
    }

    #[test]
    fn test_station_with_five_detectors_is_rejected() {
        let detectors = vec![Detector::new((0.0, 0.0), Orientation::UpDown); 5];
        let cluster = Cluster::new(vec![Station::new((0.0, 0.0), 0.0, (1.0, 1.0), detectors)]);

        let result = ShowerSimulation::new(cluster, SimulationSettings::new("grid", "sim", 0.0, 1));
        assert!(matches!(result, Err(SimulationError::Configuration(_))));
    }

    #[test]
    fn test_radius_with_overflowing_square_is_rejected() {
        let mut handle = handle_with_ground();
        let mut sim = ShowerSimulation::new(Cluster::single_station(), SimulationSettings::new("grid", "sim", 1.0, 1)).unwrap();

        assert!(ShowerSimulation::new(Cluster::single_station(), SimulationSettings::new("grid", "sim", 1e200, 1)).is_err());

        // settings changed after construction are caught before anything is written
        sim.settings.max_radius = 1e200;
        let err = sim.run(&mut handle).unwrap_err();
        assert!(matches!(err, SimulationError::Configuration(_)));
        assert!(!handle.run_exists("sim").unwrap());
    }

    #[test]
    fn test_zero_events_creates_empty_area() {
        let mut handle = handle_with_ground();
        let settings = SimulationSettings::new("grid", "sim", 10.0, 0).with_seed(1);
        let summary = ShowerSimulation::new(Cluster::single_station(), settings).unwrap().run(&mut handle).unwrap();

        assert_eq!(summary.events, 0);
        assert!(handle.run_exists("sim").unwrap());
        assert!(handle.read_headers("sim").unwrap().is_empty());
    }

    #[test]
    fn test_output_independent_of_threads_and_batches() {
        let mut handle = handle_with_ground();

        let mut a = SimulationSettings::new("grid", "a", 8.0, 25).with_seed(99);
        a.num_threads = 1;
        a.batch_size = 25;
        let mut b = SimulationSettings::new("grid", "b", 8.0, 25).with_seed(99);
        b.num_threads = 3;
        b.batch_size = 4;

        let cluster = Cluster::single_station();
        ShowerSimulation::new(cluster.clone(), a).unwrap().run(&mut handle).unwrap();
        let summary = ShowerSimulation::new(cluster, b).unwrap().run(&mut handle).unwrap();

        assert_eq!(summary.seed, 99);
        assert_eq!(handle.read_headers("a").unwrap(), handle.read_headers("b").unwrap());
        assert_eq!(handle.read_particles("a").unwrap(), handle.read_particles("b").unwrap());
        assert_eq!(handle.read_headers("b").unwrap().len(), 25 * 2);
    }
}
