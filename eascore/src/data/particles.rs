use serde::{Deserialize, Serialize};

/// A single simulated particle reaching the ground.
///
/// Position is given relative to the shower core in polar form, `x` and `y`
/// are derived from it.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ShowerParticle {
    pub pid: i32,
    pub core_distance: f64,
    pub polar_angle: f64,
    pub arrival_time: f64,
    pub energy: f64,
}

impl ShowerParticle {
    pub fn new(pid: i32, core_distance: f64, polar_angle: f64, arrival_time: f64, energy: f64) -> Self {
        ShowerParticle { pid, core_distance, polar_angle, arrival_time, energy }
    }

    /// Build a particle from absolute ground coordinates.
    pub fn from_xy(pid: i32, x: f64, y: f64, arrival_time: f64, energy: f64) -> Self {
        ShowerParticle::new(pid, x.hypot(y), y.atan2(x), arrival_time, energy)
    }

    pub fn x(&self) -> f64 {
        self.core_distance * self.polar_angle.cos()
    }

    pub fn y(&self) -> f64 {
        self.core_distance * self.polar_angle.sin()
    }
}

/// Column oriented, read-only collection of ground particles.
///
/// Absolute positions are precomputed once so that inclusion predicates can
/// be evaluated as a scan over two flat `f64` columns.
#[derive(Debug, Clone, Default)]
pub struct GroundParticles {
    pub pid: Vec<i32>,
    pub core_distance: Vec<f64>,
    pub polar_angle: Vec<f64>,
    pub arrival_time: Vec<f64>,
    pub energy: Vec<f64>,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl GroundParticles {
    pub fn new(
        pid: Vec<i32>,
        core_distance: Vec<f64>,
        polar_angle: Vec<f64>,
        arrival_time: Vec<f64>,
        energy: Vec<f64>,
    ) -> Self {
        assert_eq!(pid.len(), core_distance.len(), "column lengths must match");
        assert_eq!(pid.len(), polar_angle.len(), "column lengths must match");
        assert_eq!(pid.len(), arrival_time.len(), "column lengths must match");
        assert_eq!(pid.len(), energy.len(), "column lengths must match");

        let x = core_distance.iter().zip(polar_angle.iter()).map(|(r, phi)| r * phi.cos()).collect();
        let y = core_distance.iter().zip(polar_angle.iter()).map(|(r, phi)| r * phi.sin()).collect();

        GroundParticles { pid, core_distance, polar_angle, arrival_time, energy, x, y }
    }

    pub fn len(&self) -> usize {
        self.pid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pid.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<ShowerParticle> {
        if index >= self.len() {
            return None;
        }
        Some(ShowerParticle::new(
            self.pid[index],
            self.core_distance[index],
            self.polar_angle[index],
            self.arrival_time[index],
            self.energy[index],
        ))
    }
}

impl FromIterator<ShowerParticle> for GroundParticles {
    fn from_iter<T: IntoIterator<Item = ShowerParticle>>(iter: T) -> Self {
        let mut pid = Vec::new();
        let mut core_distance = Vec::new();
        let mut polar_angle = Vec::new();
        let mut arrival_time = Vec::new();
        let mut energy = Vec::new();

        for particle in iter {
            pid.push(particle.pid);
            core_distance.push(particle.core_distance);
            polar_angle.push(particle.polar_angle);
            arrival_time.push(particle.arrival_time);
            energy.push(particle.energy);
        }

        GroundParticles::new(pid, core_distance, polar_angle, arrival_time, energy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xy_derived_from_polar() {
        let particles: GroundParticles = vec![
            ShowerParticle::new(3, 2.0, 0.0, 1.0, 10.0),
            ShowerParticle::new(3, 1.0, std::f64::consts::FRAC_PI_2, 2.0, 10.0),
        ].into_iter().collect();

        assert_eq!(particles.len(), 2);
        assert!((particles.x[0] - 2.0).abs() < 1e-12);
        assert!(particles.y[0].abs() < 1e-12);
        assert!(particles.x[1].abs() < 1e-12);
        assert!((particles.y[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_from_xy() {
        let p = ShowerParticle::from_xy(1, -3.0, 4.0, 0.0, 1.0);
        assert!((p.core_distance - 5.0).abs() < 1e-12);
        assert!((p.x() + 3.0).abs() < 1e-12);
        assert!((p.y() - 4.0).abs() < 1e-12);
    }
}
