use eascore::{GroundParticles, ShowerParticle};
use rusqlite::params;

use crate::data::handle::{ShowerDataHandle, RESERVED_TABLES};
use crate::error::{SimulationError, SimulationResult};

/// Quote a dataset name for use as an SQL identifier.
fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

impl ShowerDataHandle {
    /// Whether a ground particle dataset of that name is present.
    pub fn ground_dataset_exists(&self, name: &str) -> rusqlite::Result<bool> {
        if RESERVED_TABLES.contains(&name) {
            return Ok(false);
        }
        self.connection.query_row(
            "SELECT EXISTS (SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1)",
            params![name],
            |row| row.get(0),
        )
    }

    /// Load a whole ground particle dataset into columns.
    pub fn read_ground_particles(&self, name: &str) -> rusqlite::Result<GroundParticles> {
        let query = format!(
            "SELECT pid, core_distance, polar_angle, arrival_time, energy FROM {} ORDER BY rowid",
            quote_identifier(name)
        );
        let mut stmt = self.connection.prepare(&query)?;
        let particles_iter = stmt.query_map([], |row| {
            Ok(ShowerParticle::new(
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
            ))
        })?;

        let mut pid = Vec::new();
        let mut core_distance = Vec::new();
        let mut polar_angle = Vec::new();
        let mut arrival_time = Vec::new();
        let mut energy = Vec::new();

        for particle in particles_iter {
            let particle = particle?;
            pid.push(particle.pid);
            core_distance.push(particle.core_distance);
            polar_angle.push(particle.polar_angle);
            arrival_time.push(particle.arrival_time);
            energy.push(particle.energy);
        }

        Ok(GroundParticles::new(pid, core_distance, polar_angle, arrival_time, energy))
    }

    /// Store a new ground particle dataset, refusing to overwrite an existing one.
    pub fn write_ground_particles(&mut self, name: &str, particles: &[ShowerParticle]) -> SimulationResult<()> {
        if name.is_empty() || RESERVED_TABLES.contains(&name) {
            return Err(SimulationError::Configuration(format!("{:?} is not a valid dataset name", name)));
        }
        if self.ground_dataset_exists(name)? {
            return Err(SimulationError::DestinationConflict(name.to_string()));
        }

        let table = quote_identifier(name);
        let tx = self.connection.transaction()?;
        tx.execute_batch(&format!(
            "CREATE TABLE {} (
                pid INTEGER NOT NULL,
                core_distance REAL NOT NULL,
                polar_angle REAL NOT NULL,
                arrival_time REAL NOT NULL,
                energy REAL NOT NULL
            );",
            table
        ))?;
        {
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO {} (pid, core_distance, polar_angle, arrival_time, energy) VALUES (?1, ?2, ?3, ?4, ?5)",
                table
            ))?;
            for p in particles {
                stmt.execute(params![p.pid, p.core_distance, p.polar_angle, p.arrival_time, p.energy])?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_round_trip_with_odd_name() {
        let mut handle = ShowerDataHandle::open_in_memory().unwrap();
        let name = "showers/E_1PeV/zenith_0/\"leptons\"";
        assert!(!handle.ground_dataset_exists(name).unwrap());

        let particles = vec![
            ShowerParticle::new(3, 1.0, 0.0, 5.0, 1e6),
            ShowerParticle::new(-3, 2.0, 3.0, 6.0, 2e6),
        ];
        handle.write_ground_particles(name, &particles).unwrap();

        assert!(handle.ground_dataset_exists(name).unwrap());
        let ground = handle.read_ground_particles(name).unwrap();
        assert_eq!(ground.len(), 2);
        assert_eq!(ground.get(1), Some(particles[1]));
        assert!((ground.x[0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_existing_dataset_is_not_overwritten() {
        let mut handle = ShowerDataHandle::open_in_memory().unwrap();
        let particles = vec![ShowerParticle::new(1, 1.0, 0.0, 0.0, 1.0)];
        handle.write_ground_particles("leptons", &particles).unwrap();

        let err = handle.write_ground_particles("leptons", &[]).unwrap_err();
        assert!(matches!(err, SimulationError::DestinationConflict(_)));
        assert_eq!(handle.read_ground_particles("leptons").unwrap().len(), 1);
    }

    #[test]
    fn test_reserved_names() {
        let mut handle = ShowerDataHandle::open_in_memory().unwrap();
        assert!(!handle.ground_dataset_exists("headers").unwrap());
        let err = handle.write_ground_particles("particles", &[]).unwrap_err();
        assert!(matches!(err, SimulationError::Configuration(_)));
    }
}
