use serde::{Deserialize, Serialize};

use crate::data::records::DETECTORS_PER_STATION;
use crate::error::GeometryError;
use crate::geometry::detector::Orientation;

/// A rectangular detector pad, positioned relative to its station center.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Detector {
    pub offset: (f64, f64),
    pub orientation: Orientation,
}

impl Detector {
    pub fn new(offset: (f64, f64), orientation: Orientation) -> Self {
        Detector { offset, orientation }
    }
}

/// A measurement station: its place within the cluster and its detectors.
///
/// All detectors of a station share `detector_size` as (width, length).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Station {
    pub position: (f64, f64),
    pub angle: f64,
    pub detector_size: (f64, f64),
    pub detectors: Vec<Detector>,
}

impl Station {
    pub fn new(position: (f64, f64), angle: f64, detector_size: (f64, f64), detectors: Vec<Detector>) -> Self {
        Station { position, angle, detector_size, detectors }
    }
}

/// An array of stations placed together as one rigid body.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Cluster {
    pub stations: Vec<Station>,
}

impl Cluster {
    pub fn new(stations: Vec<Station>) -> Self {
        Cluster { stations }
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub fn num_detectors(&self) -> usize {
        self.stations.iter().map(|s| s.detectors.len()).sum()
    }

    /// Check that every station fits the observable record layout
    ///
    /// A station carries at most `DETECTORS_PER_STATION` detectors and its
    /// detector size must be finite and positive in both dimensions. Station
    /// indices in the returned error start at 1, like station ids in headers.
    pub fn validate(&self) -> Result<(), GeometryError> {
        for (station, s) in (1usize..).zip(self.stations.iter()) {
            if s.detectors.len() > DETECTORS_PER_STATION {
                return Err(GeometryError::TooManyDetectors {
                    station,
                    count: s.detectors.len(),
                    max: DETECTORS_PER_STATION,
                });
            }
            let (width, length) = s.detector_size;
            let valid = |v: f64| v.is_finite() && v > 0.0;
            if !valid(width) || !valid(length) {
                return Err(GeometryError::InvalidDetectorSize { station, width, length });
            }
        }
        Ok(())
    }
}
