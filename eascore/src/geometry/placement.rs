use std::f64::consts::PI;

use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::cluster::station::Station;
use crate::error::GeometryError;

/// Position of the cluster center relative to the shower core plus the
/// rotation of the whole cluster, for one simulated event.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub r: f64,
    pub phi: f64,
    pub alpha: f64,
}

impl Placement {
    pub fn new(r: f64, phi: f64, alpha: f64) -> Self {
        Placement { r, phi, alpha }
    }

    /// Cartesian coordinates of the cluster center.
    pub fn center(&self) -> (f64, f64) {
        let (sin_phi, cos_phi) = self.phi.sin_cos();
        (self.r * cos_phi, self.r * sin_phi)
    }
}

/// Absolute position and rotation of a placed station.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StationPlacement {
    pub x: f64,
    pub y: f64,
    pub angle: f64,
}

impl StationPlacement {
    /// Polar position of the station, kept in station headers.
    pub fn polar(&self) -> (f64, f64) {
        (self.x.hypot(self.y), self.y.atan2(self.x))
    }
}

/// Lazily draws cluster placements uniformly over a disk.
///
/// `phi` and `alpha` are uniform on [-pi, pi). The radius is drawn as the
/// square root of a uniform variate on [0, R^2] so that points are uniform
/// over the disk area rather than clustered at its center.
#[derive(Debug, Clone)]
pub struct PlacementSampler {
    rng: StdRng,
    radius_squared: Uniform<f64>,
    angle: Uniform<f64>,
    remaining: usize,
}

impl PlacementSampler {
    /// Sampler for `count` placements within `max_radius`, reproducible from `seed`.
    pub fn new(max_radius: f64, count: usize, seed: u64) -> Result<Self, GeometryError> {
        Self::from_rng(max_radius, count, StdRng::seed_from_u64(seed))
    }

    /// Fails with `InvalidRadius` unless `max_radius` is finite, non negative
    /// and its square is still finite.
    pub fn from_rng(max_radius: f64, count: usize, rng: StdRng) -> Result<Self, GeometryError> {
        let radius_squared = max_radius * max_radius;
        if !max_radius.is_finite() || max_radius < 0.0 || !radius_squared.is_finite() {
            return Err(GeometryError::InvalidRadius(max_radius));
        }
        Ok(PlacementSampler {
            rng,
            radius_squared: Uniform::new_inclusive(0.0, radius_squared),
            angle: Uniform::new(-PI, PI),
            remaining: count,
        })
    }
}

impl Iterator for PlacementSampler {
    type Item = Placement;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let phi = self.angle.sample(&mut self.rng);
        let alpha = self.angle.sample(&mut self.rng);
        let r = self.radius_squared.sample(&mut self.rng).sqrt();

        Some(Placement { r, phi, alpha })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for PlacementSampler {}

/// Generate `count` cluster placements within a disk of radius `max_radius`.
pub fn sample_placements(max_radius: f64, count: usize, seed: u64) -> Result<PlacementSampler, GeometryError> {
    PlacementSampler::new(max_radius, count, seed)
}

/// Absolute coordinates of a station for a given cluster placement
///
/// The station's cluster-relative position is rotated by the cluster rotation
/// and then translated to the cluster center. This is the same rotate then
/// translate convention `detector_corners` applies to detector offsets.
pub fn station_absolute_placement(station: &Station, placement: &Placement) -> StationPlacement {
    let (center_x, center_y) = placement.center();
    let (sx, sy) = station.position;
    let (sin_a, cos_a) = placement.alpha.sin_cos();

    StationPlacement {
        x: center_x + sx * cos_a - sy * sin_a,
        y: center_y + sx * sin_a + sy * cos_a,
        angle: placement.alpha + station.angle,
    }
}
