use std::path::Path;

use eascore::{CoincidenceRecord, HeaderRecord, ObservableRecord, ParticleHitRecord};
use rusqlite::{params, Connection, OptionalExtension, Row};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS simulation_runs (
        name TEXT PRIMARY KEY,
        ground_particles TEXT NOT NULL,
        max_radius REAL NOT NULL,
        n_events INTEGER NOT NULL,
        seed INTEGER NOT NULL
    );
    CREATE TABLE IF NOT EXISTS headers (
        run TEXT NOT NULL,
        event_id INTEGER NOT NULL,
        station_id INTEGER NOT NULL,
        r REAL NOT NULL,
        phi REAL NOT NULL,
        alpha REAL NOT NULL
    );
    CREATE INDEX IF NOT EXISTS headers_run ON headers (run);
    CREATE TABLE IF NOT EXISTS particles (
        run TEXT NOT NULL,
        event_id INTEGER NOT NULL,
        station_id INTEGER NOT NULL,
        detector_id INTEGER NOT NULL,
        pid INTEGER NOT NULL,
        r REAL NOT NULL,
        phi REAL NOT NULL,
        time REAL NOT NULL,
        energy REAL NOT NULL
    );
    CREATE INDEX IF NOT EXISTS particles_run ON particles (run);
    CREATE TABLE IF NOT EXISTS reductions (
        run TEXT PRIMARY KEY
    );
    CREATE TABLE IF NOT EXISTS observables (
        run TEXT NOT NULL,
        event_id INTEGER NOT NULL,
        station_id INTEGER NOT NULL,
        r REAL NOT NULL,
        phi REAL NOT NULL,
        alpha REAL NOT NULL,
        n INTEGER NOT NULL,
        n1 INTEGER NOT NULL,
        n2 INTEGER NOT NULL,
        n3 INTEGER NOT NULL,
        n4 INTEGER NOT NULL,
        t1 REAL,
        t2 REAL,
        t3 REAL,
        t4 REAL
    );
    CREATE INDEX IF NOT EXISTS observables_run ON observables (run);
    CREATE TABLE IF NOT EXISTS coincidences (
        run TEXT NOT NULL,
        event_id INTEGER NOT NULL,
        n INTEGER NOT NULL,
        r REAL NOT NULL,
        phi REAL NOT NULL,
        alpha REAL NOT NULL
    );
    CREATE INDEX IF NOT EXISTS coincidences_run ON coincidences (run);
";

/// Tables owned by the store, never valid as ground particle dataset names.
pub const RESERVED_TABLES: [&str; 6] =
    ["simulation_runs", "headers", "particles", "reductions", "observables", "coincidences"];

/// Registry entry describing one simulation area.
#[derive(Debug, Clone, PartialEq)]
pub struct RunInfo {
    pub name: String,
    pub ground_particles: String,
    pub max_radius: f64,
    pub n_events: u32,
    pub seed: u64,
}

/// SQLite file holding ground particle datasets and simulation areas.
#[derive(Debug)]
pub struct ShowerDataHandle {
    pub connection: Connection,
}

impl ShowerDataHandle {
    pub fn new(path: &Path) -> rusqlite::Result<Self> {
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> rusqlite::Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    pub fn from_connection(connection: Connection) -> rusqlite::Result<Self> {
        connection.execute_batch(SCHEMA)?;
        Ok(Self { connection })
    }

    pub fn run_exists(&self, run: &str) -> rusqlite::Result<bool> {
        self.connection.query_row(
            "SELECT EXISTS (SELECT 1 FROM simulation_runs WHERE name = ?1)",
            params![run],
            |row| row.get(0),
        )
    }

    pub fn reduction_exists(&self, run: &str) -> rusqlite::Result<bool> {
        self.connection.query_row(
            "SELECT EXISTS (SELECT 1 FROM reductions WHERE run = ?1)",
            params![run],
            |row| row.get(0),
        )
    }

    pub fn read_run(&self, run: &str) -> rusqlite::Result<Option<RunInfo>> {
        self.connection.query_row(
            "SELECT name, ground_particles, max_radius, n_events, seed FROM simulation_runs WHERE name = ?1",
            params![run],
            |row| {
                let seed: i64 = row.get(4)?;
                Ok(RunInfo {
                    name: row.get(0)?,
                    ground_particles: row.get(1)?,
                    max_radius: row.get(2)?,
                    n_events: row.get(3)?,
                    seed: seed as u64,
                })
            },
        ).optional()
    }

    pub fn read_headers(&self, run: &str) -> rusqlite::Result<Vec<HeaderRecord>> {
        let mut stmt = self.connection.prepare(SELECT_HEADERS)?;
        let headers_iter = stmt.query_map(params![run], header_from_row)?;
        let mut headers = Vec::new();
        for header in headers_iter {
            headers.push(header?);
        }
        Ok(headers)
    }

    pub fn read_particles(&self, run: &str) -> rusqlite::Result<Vec<ParticleHitRecord>> {
        let mut stmt = self.connection.prepare(SELECT_PARTICLES)?;
        let particles_iter = stmt.query_map(params![run], particle_from_row)?;
        let mut particles = Vec::new();
        for particle in particles_iter {
            particles.push(particle?);
        }
        Ok(particles)
    }

    pub fn read_observables(&self, run: &str) -> rusqlite::Result<Vec<ObservableRecord>> {
        let mut stmt = self.connection.prepare(
            "SELECT event_id, station_id, r, phi, alpha, n, n1, n2, n3, n4, t1, t2, t3, t4
             FROM observables WHERE run = ?1 ORDER BY rowid",
        )?;
        let observables_iter = stmt.query_map(params![run], |row| {
            Ok(ObservableRecord {
                event_id: row.get(0)?,
                station_id: row.get(1)?,
                r: row.get(2)?,
                phi: row.get(3)?,
                alpha: row.get(4)?,
                detectors_hit: row.get(5)?,
                counts: [row.get(6)?, row.get(7)?, row.get(8)?, row.get(9)?],
                first_arrival: [row.get(10)?, row.get(11)?, row.get(12)?, row.get(13)?],
            })
        })?;
        let mut observables = Vec::new();
        for observable in observables_iter {
            observables.push(observable?);
        }
        Ok(observables)
    }

    pub fn read_coincidences(&self, run: &str) -> rusqlite::Result<Vec<CoincidenceRecord>> {
        let mut stmt = self.connection.prepare(
            "SELECT event_id, n, r, phi, alpha FROM coincidences WHERE run = ?1 ORDER BY rowid",
        )?;
        let coincidences_iter = stmt.query_map(params![run], |row| {
            Ok(CoincidenceRecord {
                event_id: row.get(0)?,
                n: row.get(1)?,
                r: row.get(2)?,
                phi: row.get(3)?,
                alpha: row.get(4)?,
            })
        })?;
        let mut coincidences = Vec::new();
        for coincidence in coincidences_iter {
            coincidences.push(coincidence?);
        }
        Ok(coincidences)
    }
}

// rowid order is the order the simulator appended records in
pub const SELECT_HEADERS: &str =
    "SELECT event_id, station_id, r, phi, alpha FROM headers WHERE run = ?1 ORDER BY rowid";

pub const SELECT_PARTICLES: &str =
    "SELECT event_id, station_id, detector_id, pid, r, phi, time, energy
     FROM particles WHERE run = ?1 ORDER BY rowid";

pub fn header_from_row(row: &Row) -> rusqlite::Result<HeaderRecord> {
    Ok(HeaderRecord::new(row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
}

pub fn particle_from_row(row: &Row) -> rusqlite::Result<ParticleHitRecord> {
    Ok(ParticleHitRecord::new(
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
    ))
}

pub fn insert_run(connection: &Connection, info: &RunInfo) -> rusqlite::Result<()> {
    connection.execute(
        "INSERT INTO simulation_runs (name, ground_particles, max_radius, n_events, seed)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![info.name, info.ground_particles, info.max_radius, info.n_events, info.seed as i64],
    )?;
    Ok(())
}

pub fn insert_headers(connection: &Connection, run: &str, headers: &[HeaderRecord]) -> rusqlite::Result<()> {
    let mut stmt = connection.prepare_cached(
        "INSERT INTO headers (run, event_id, station_id, r, phi, alpha) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?;
    for h in headers {
        stmt.execute(params![run, h.event_id, h.station_id, h.r, h.phi, h.alpha])?;
    }
    Ok(())
}

pub fn insert_particles(connection: &Connection, run: &str, particles: &[ParticleHitRecord]) -> rusqlite::Result<()> {
    let mut stmt = connection.prepare_cached(
        "INSERT INTO particles (run, event_id, station_id, detector_id, pid, r, phi, time, energy)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
    )?;
    for p in particles {
        stmt.execute(params![run, p.event_id, p.station_id, p.detector_id, p.pid, p.r, p.phi, p.time, p.energy])?;
    }
    Ok(())
}

pub fn insert_reduction(connection: &Connection, run: &str) -> rusqlite::Result<()> {
    connection.execute("INSERT INTO reductions (run) VALUES (?1)", params![run])?;
    Ok(())
}

pub fn insert_observable(connection: &Connection, run: &str, o: &ObservableRecord) -> rusqlite::Result<()> {
    let mut stmt = connection.prepare_cached(
        "INSERT INTO observables (run, event_id, station_id, r, phi, alpha, n, n1, n2, n3, n4, t1, t2, t3, t4)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
    )?;
    stmt.execute(params![
        run,
        o.event_id,
        o.station_id,
        o.r,
        o.phi,
        o.alpha,
        o.detectors_hit,
        o.counts[0],
        o.counts[1],
        o.counts[2],
        o.counts[3],
        o.first_arrival[0],
        o.first_arrival[1],
        o.first_arrival[2],
        o.first_arrival[3],
    ])?;
    Ok(())
}

pub fn insert_coincidence(connection: &Connection, run: &str, c: &CoincidenceRecord) -> rusqlite::Result<()> {
    let mut stmt = connection.prepare_cached(
        "INSERT INTO coincidences (run, event_id, n, r, phi, alpha) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?;
    stmt.execute(params![run, c.event_id, c.n, c.r, c.phi, c.alpha])?;
    Ok(())
}
