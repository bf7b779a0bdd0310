use eascore::error::{GeometryError, StreamOrderingViolation};
use thiserror::Error;

pub type SimulationResult<T> = Result<T, SimulationError>;

/// Errors raised by the simulation and reduction passes.
#[derive(Error, Debug)]
pub enum SimulationError {
    /// Missing input dataset or invalid settings, reported before any output is written
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Output area already exists, nothing was written
    #[error("destination already exists: {0}")]
    DestinationConflict(String),

    #[error("stream ordering violation: {0}")]
    StreamOrdering(#[from] StreamOrderingViolation),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Invalid cluster or sampling geometry is a configuration problem of the run.
impl From<GeometryError> for SimulationError {
    fn from(e: GeometryError) -> Self {
        SimulationError::Configuration(e.to_string())
    }
}

impl SimulationError {
    /// Errors that abort a pass before it touches the destination.
    pub fn is_precondition(&self) -> bool {
        matches!(self, SimulationError::Configuration(_) | SimulationError::DestinationConflict(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_error_is_precondition() {
        let err = SimulationError::from(GeometryError::InvalidRadius(-1.0));
        assert!(matches!(err, SimulationError::Configuration(ref m) if m.contains("-1")));
        assert!(err.is_precondition());
    }
}
