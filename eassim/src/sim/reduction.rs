use eascore::{reduce, CoincidenceRecord, ObservableRecord, ReductionSink, ReductionSummary};
use log::info;
use rusqlite::{params, Connection};

use crate::data::handle::{
    header_from_row, insert_coincidence, insert_observable, insert_reduction, particle_from_row, ShowerDataHandle,
    SELECT_HEADERS, SELECT_PARTICLES,
};
use crate::error::{SimulationError, SimulationResult};

/// Writes reduced records of one run through an open connection or transaction.
pub struct SqlReductionSink<'a> {
    connection: &'a Connection,
    run: &'a str,
}

impl<'a> SqlReductionSink<'a> {
    pub fn new(connection: &'a Connection, run: &'a str) -> Self {
        SqlReductionSink { connection, run }
    }
}

impl ReductionSink for SqlReductionSink<'_> {
    type Error = SimulationError;

    fn write_observable(&mut self, record: ObservableRecord) -> Result<(), Self::Error> {
        insert_observable(self.connection, self.run, &record)?;
        Ok(())
    }

    fn write_coincidence(&mut self, record: CoincidenceRecord) -> Result<(), Self::Error> {
        insert_coincidence(self.connection, self.run, &record)?;
        Ok(())
    }
}

/// Derive observables and coincidences from a finished simulation
///
/// Streams the run's headers and particle hits once, in the order they were
/// written, and stores one observable per station and one coincidence per
/// event. Fails without writing if the run does not exist or was already
/// reduced; a stream ordering violation rolls back everything written so far.
pub fn store_observables(handle: &mut ShowerDataHandle, run: &str) -> SimulationResult<ReductionSummary> {
    if !handle.run_exists(run)? {
        return Err(SimulationError::Configuration(format!("simulation {} not found", run)));
    }
    if handle.reduction_exists(run)? {
        return Err(SimulationError::DestinationConflict(format!("{} observables", run)));
    }

    info!("storing observables from {}", run);

    let tx = handle.connection.transaction()?;
    insert_reduction(&tx, run)?;

    let summary = {
        let mut header_stmt = tx.prepare(SELECT_HEADERS)?;
        let headers = header_stmt.query_map(params![run], header_from_row)?;

        let mut particle_stmt = tx.prepare(SELECT_PARTICLES)?;
        let particles = particle_stmt.query_map(params![run], particle_from_row)?;

        let mut sink = SqlReductionSink::new(&tx, run);
        let summary = reduce(
            headers.map(|h| h.map_err(SimulationError::from)),
            particles.map(|p| p.map_err(SimulationError::from)),
            &mut sink,
        )?;
        summary
    };

    tx.commit()?;

    info!(
        "{}: {} events, {} stations, {} particle hits, {} stations triggered",
        run, summary.events, summary.stations, summary.particles, summary.triggered_stations
    );

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::handle::{insert_headers, insert_particles, insert_run, RunInfo};
    use eascore::{HeaderRecord, ParticleHitRecord, StreamOrderingViolation};

    fn register(handle: &ShowerDataHandle, run: &str) {
        insert_run(&handle.connection, &RunInfo {
            name: run.to_string(),
            ground_particles: "g".to_string(),
            max_radius: 1.0,
            n_events: 1,
            seed: 0,
        }).unwrap();
    }

    #[test]
    fn test_unknown_run() {
        let mut handle = ShowerDataHandle::open_in_memory().unwrap();
        let err = store_observables(&mut handle, "missing").unwrap_err();
        assert!(matches!(err, SimulationError::Configuration(_)));
    }

    #[test]
    fn test_two_station_event() {
        let mut handle = ShowerDataHandle::open_in_memory().unwrap();
        register(&handle, "run");
        insert_headers(&handle.connection, "run", &[
            HeaderRecord::new(0, 0, 5.0, 1.0, 2.0),
            HeaderRecord::new(0, 1, 5.0, 1.0, 2.0),
            HeaderRecord::new(0, 2, 6.0, 1.0, 2.0),
        ]).unwrap();
        insert_particles(&handle.connection, "run", &[
            ParticleHitRecord::new(0, 1, 0, 3, 1.0, 0.0, 8.0, 1.0),
            ParticleHitRecord::new(0, 1, 3, 3, 1.0, 0.0, 9.0, 1.0),
            ParticleHitRecord::new(0, 2, 1, 3, 1.0, 0.0, 7.0, 1.0),
        ]).unwrap();

        let summary = store_observables(&mut handle, "run").unwrap();
        assert_eq!(summary.events, 1);
        assert_eq!(summary.stations, 2);

        let coincidences = handle.read_coincidences("run").unwrap();
        assert_eq!(coincidences, vec![CoincidenceRecord { event_id: 0, r: 5.0, phi: 1.0, alpha: 2.0, n: 1 }]);

        let observables = handle.read_observables("run").unwrap();
        assert_eq!(observables[0].first_arrival, [Some(8.0), None, None, Some(9.0)]);
        assert_eq!(observables[1].counts, [0, 1, 0, 0]);
    }

    #[test]
    fn test_ordering_violation_rolls_back() {
        let mut handle = ShowerDataHandle::open_in_memory().unwrap();
        register(&handle, "run");
        insert_headers(&handle.connection, "run", &[
            HeaderRecord::new(0, 0, 0.0, 0.0, 0.0),
            HeaderRecord::new(0, 1, 0.0, 0.0, 0.0),
            HeaderRecord::new(0, 2, 0.0, 0.0, 0.0),
        ]).unwrap();
        insert_particles(&handle.connection, "run", &[
            ParticleHitRecord::new(0, 2, 0, 3, 1.0, 0.0, 1.0, 1.0),
            ParticleHitRecord::new(0, 1, 0, 3, 1.0, 0.0, 1.0, 1.0),
        ]).unwrap();

        let err = store_observables(&mut handle, "run").unwrap_err();
        assert!(matches!(
            err,
            SimulationError::StreamOrdering(StreamOrderingViolation::ParticleOutOfOrder { .. })
        ));
        assert!(!handle.reduction_exists("run").unwrap());
        assert!(handle.read_observables("run").unwrap().is_empty());
    }
}
