use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use eascore::Cluster;
use serde::{Deserialize, Serialize};

use crate::error::{SimulationError, SimulationResult};

fn default_num_threads() -> usize {
    4
}

fn default_batch_size() -> usize {
    256
}

/// Parameters of one shower placement simulation.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SimulationSettings {
    /// name of the ground particle dataset
    pub ground_particles: String,
    /// name of the simulation area to create
    pub destination: String,
    /// maximum distance of the cluster center to the shower core, in meters
    pub max_radius: f64,
    /// number of cluster placements
    pub n_events: u32,
    /// RNG seed, drawn at random and recorded with the run when absent
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_num_threads")]
    pub num_threads: usize,
    /// events evaluated in parallel before being written
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl SimulationSettings {
    pub fn new(ground_particles: &str, destination: &str, max_radius: f64, n_events: u32) -> Self {
        SimulationSettings {
            ground_particles: ground_particles.to_string(),
            destination: destination.to_string(),
            max_radius,
            n_events,
            seed: None,
            num_threads: default_num_threads(),
            batch_size: default_batch_size(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> SimulationResult<()> {
        if !self.max_radius.is_finite() || self.max_radius < 0.0 || !(self.max_radius * self.max_radius).is_finite() {
            return Err(SimulationError::Configuration(format!(
                "max_radius must be finite, non negative and have a finite square, got {}",
                self.max_radius
            )));
        }
        if self.destination.is_empty() {
            return Err(SimulationError::Configuration("destination must not be empty".to_string()));
        }
        if self.num_threads == 0 {
            return Err(SimulationError::Configuration("num_threads must be at least 1".to_string()));
        }
        if self.batch_size == 0 {
            return Err(SimulationError::Configuration("batch_size must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn from_json_file(path: &Path) -> SimulationResult<Self> {
        let reader = BufReader::new(File::open(path)?);
        let settings: SimulationSettings = serde_json::from_reader(reader)?;
        settings.validate()?;
        Ok(settings)
    }
}

/// Read a cluster layout from a JSON document and check its stations.
pub fn load_cluster(path: &Path) -> SimulationResult<Cluster> {
    let reader = BufReader::new(File::open(path)?);
    let cluster: Cluster = serde_json::from_reader(reader).map_err(|e| {
        SimulationError::Configuration(format!("invalid cluster description {}: {}", path.display(), e))
    })?;
    cluster.validate()?;
    Ok(cluster)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_json() {
        let json = r#"{"ground_particles": "leptons", "destination": "sim/a", "max_radius": 100.0, "n_events": 10}"#;
        let settings: SimulationSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings, SimulationSettings::new("leptons", "sim/a", 100.0, 10));
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_invalid_settings() {
        let bad_radius = SimulationSettings::new("g", "d", -1.0, 1);
        assert!(matches!(bad_radius.validate(), Err(SimulationError::Configuration(_))));

        let nan_radius = SimulationSettings::new("g", "d", f64::NAN, 1);
        assert!(nan_radius.validate().is_err());

        // finite, but its square overflows
        let huge_radius = SimulationSettings::new("g", "d", 1e200, 1);
        assert!(matches!(huge_radius.validate(), Err(SimulationError::Configuration(_))));

        let mut no_threads = SimulationSettings::new("g", "d", 1.0, 1);
        no_threads.num_threads = 0;
        assert!(no_threads.validate().is_err());

        let mut no_batch = SimulationSettings::new("g", "d", 1.0, 1);
        no_batch.batch_size = 0;
        assert!(no_batch.validate().is_err());
    }

    fn write_cluster(name: &str, json: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("eassim-{}-{}.json", name, std::process::id()));
        std::fs::write(&path, json).unwrap();
        path
    }

    #[test]
    fn test_load_cluster_rejects_five_detectors() {
        let detector = r#"{"offset": [0.0, 0.0], "orientation": "UD"}"#;
        let detectors = vec![detector; 5].join(", ");
        let json = format!(
            r#"{{"stations": [{{"position": [0.0, 0.0], "angle": 0.0, "detector_size": [1.0, 1.0], "detectors": [{}]}}]}}"#,
            detectors
        );
        let path = write_cluster("five", &json);
        let result = load_cluster(&path);
        std::fs::remove_file(&path).unwrap();

        match result {
            Err(SimulationError::Configuration(message)) => assert!(message.contains("5 detectors"), "{}", message),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_load_cluster_rejects_unknown_orientation() {
        let json = r#"{"stations": [{"position": [0.0, 0.0], "angle": 0.0, "detector_size": [1.0, 1.0],
            "detectors": [{"offset": [0.0, 0.0], "orientation": "XY"}]}]}"#;
        let path = write_cluster("orientation", json);
        let result = load_cluster(&path);
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(SimulationError::Configuration(_))));
    }
}
