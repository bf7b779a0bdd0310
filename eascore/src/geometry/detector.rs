use std::fmt;
use std::str::FromStr;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::data::particles::GroundParticles;
use crate::error::GeometryError;
use crate::geometry::boundary::{line_boundary, ParallelStrip};

/// Orientation of a detector's long side relative to its station.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub enum Orientation {
    /// long side along the station y axis ("UD")
    UpDown,
    /// long side along the station x axis ("LR")
    LeftRight,
}

impl Orientation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::UpDown => "UD",
            Orientation::LeftRight => "LR",
        }
    }

    /// Half extents along the station x and y axes for a `(width, length)` size.
    pub fn half_extents(&self, size: (f64, f64)) -> (f64, f64) {
        let dx = size.0 / 2.0;
        let dy = size.1 / 2.0;
        match self {
            Orientation::UpDown => (dx, dy),
            Orientation::LeftRight => (dy, dx),
        }
    }
}

impl FromStr for Orientation {
    type Err = GeometryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UD" => Ok(Orientation::UpDown),
            "LR" => Ok(Orientation::LeftRight),
            other => Err(GeometryError::UnknownOrientation(other.to_string())),
        }
    }
}

impl TryFrom<String> for Orientation {
    type Error = GeometryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Orientation> for String {
    fn from(value: Orientation) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Corners of a detector in absolute coordinates
///
/// Arguments:
///
/// * `station` - absolute (x, y) of the station center
/// * `offset` - detector center relative to the station center
/// * `size` - (width, length) of the detector
/// * `orientation` - orientation of the long side relative to the station
/// * `rotation` - rotation angle of the station, `None` for no rotation
///
/// Returns:
///
/// * `[(f64, f64); 4]` - corners in counter-clockwise order, starting at the
///   lower left corner of the unrotated detector
pub fn detector_corners(
    station: (f64, f64),
    offset: (f64, f64),
    size: (f64, f64),
    orientation: Orientation,
    rotation: Option<f64>,
) -> [(f64, f64); 4] {
    let (x, y) = offset;
    let (dx, dy) = orientation.half_extents(size);

    let mut corners = [(x - dx, y - dy), (x + dx, y - dy), (x + dx, y + dy), (x - dx, y + dy)];

    if let Some(alpha) = rotation {
        let (sina, cosa) = alpha.sin_cos();
        for corner in corners.iter_mut() {
            let (cx, cy) = *corner;
            *corner = (cx * cosa - cy * sina, cx * sina + cy * cosa);
        }
    }

    corners.map(|(cx, cy)| (station.0 + cx, station.1 + cy))
}

/// The two strips whose intersection is the detector surface.
pub fn detector_strips(corners: &[(f64, f64); 4]) -> (ParallelStrip, ParallelStrip) {
    (
        line_boundary(corners[0], corners[1], corners[2]),
        line_boundary(corners[1], corners[2], corners[3]),
    )
}

/// Indices of all ground particles inside a detector
///
/// The rectangle test is expressed as membership of two parallel strips, so it
/// holds for any station rotation. The scan runs in parallel over the position
/// columns and returns indices in ascending order.
pub fn particles_in_detector(
    particles: &GroundParticles,
    station: (f64, f64),
    offset: (f64, f64),
    size: (f64, f64),
    orientation: Orientation,
    rotation: Option<f64>,
) -> Vec<usize> {
    let corners = detector_corners(station, offset, size, orientation, rotation);
    let (first, second) = detector_strips(&corners);

    particles.x.par_iter()
        .zip(particles.y.par_iter())
        .enumerate()
        .filter(|(_, (&x, &y))| first.contains(x, y) && second.contains(x, y))
        .map(|(index, _)| index)
        .collect()
}
