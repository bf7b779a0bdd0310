use std::f64::consts::PI;

use crate::cluster::station::{Cluster, Detector, Station};
use crate::geometry::detector::Orientation;

/// Scintillator size as (width, length) in meters.
pub const DETECTOR_SIZE: (f64, f64) = (0.5, 1.0);

/// Side of the detector triangle in a four detector station, in meters.
const STATION_SIDE: f64 = 10.0;

/// Four detectors: two on the station axis and two on the base of a triangle.
pub fn four_detector_layout() -> Vec<Detector> {
    let a = STATION_SIDE / 2.0;
    let b = STATION_SIDE / (2.0 * 3f64.sqrt());
    vec![
        Detector::new((0.0, 2.0 * b), Orientation::UpDown),
        Detector::new((0.0, 0.0), Orientation::UpDown),
        Detector::new((-a, -b), Orientation::LeftRight),
        Detector::new((a, -b), Orientation::LeftRight),
    ]
}

/// Two detectors, side by side along the station x axis.
pub fn two_detector_layout() -> Vec<Detector> {
    vec![
        Detector::new((-5.0, 0.0), Orientation::UpDown),
        Detector::new((5.0, 0.0), Orientation::UpDown),
    ]
}

impl Cluster {
    /// A single four detector station at the cluster origin.
    pub fn single_station() -> Self {
        Cluster::new(vec![Station::new((0.0, 0.0), 0.0, DETECTOR_SIZE, four_detector_layout())])
    }

    /// A single two detector station at the cluster origin.
    pub fn two_detector_station() -> Self {
        Cluster::new(vec![Station::new((0.0, 0.0), 0.0, DETECTOR_SIZE, two_detector_layout())])
    }

    /// Four stations laid out like one four detector station scaled up to `size`.
    ///
    /// The outer stations are turned so their own layout points at the center.
    pub fn simple(size: f64) -> Self {
        let a = size / 2.0;
        let b = size / (2.0 * 3f64.sqrt());

        let stations = [
            ((0.0, 0.0), 0.0),
            ((0.0, 2.0 * b), 0.0),
            ((-a, -b), 2.0 * PI / 3.0),
            ((a, -b), -2.0 * PI / 3.0),
        ];

        Cluster::new(
            stations.iter()
                .map(|&(position, angle)| Station::new(position, angle, DETECTOR_SIZE, four_detector_layout()))
                .collect(),
        )
    }
}
