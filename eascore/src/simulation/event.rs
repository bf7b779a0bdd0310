use crate::cluster::station::Cluster;
use crate::data::particles::GroundParticles;
use crate::data::records::{HeaderRecord, ParticleHitRecord};
use crate::geometry::detector::particles_in_detector;
use crate::geometry::placement::{station_absolute_placement, Placement};

/// Header and particle records produced by one cluster placement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventRecords {
    /// event header first, then one header per station in cluster order
    pub headers: Vec<HeaderRecord>,
    /// grouped by station, then by detector
    pub particles: Vec<ParticleHitRecord>,
}

/// Place the cluster once and collect every particle that hits a detector
///
/// Arguments:
///
/// * `event_id` - id of the simulated event
/// * `placement` - cluster position and rotation relative to the shower core
/// * `cluster` - station and detector layout
/// * `ground` - ground particles of the shower
///
/// Returns:
///
/// * `EventRecords` - the event header, one header per station (station ids
///   start at 1) and all particle hits tagged with their detector index
pub fn simulate_event(
    event_id: u32,
    placement: &Placement,
    cluster: &Cluster,
    ground: &GroundParticles,
) -> EventRecords {
    let mut records = EventRecords::default();
    records.headers.push(HeaderRecord::new(event_id, 0, placement.r, placement.phi, placement.alpha));

    for (station_id, station) in (1u32..).zip(cluster.stations()) {
        let placed = station_absolute_placement(station, placement);
        let (r, phi) = placed.polar();
        records.headers.push(HeaderRecord::new(event_id, station_id, r, phi, placed.angle));

        for (detector_id, detector) in (0u32..).zip(station.detectors.iter()) {
            let hits = particles_in_detector(
                ground,
                (placed.x, placed.y),
                detector.offset,
                station.detector_size,
                detector.orientation,
                Some(placed.angle),
            );

            records.particles.extend(hits.into_iter().map(|i| {
                ParticleHitRecord::new(
                    event_id,
                    station_id,
                    detector_id,
                    ground.pid[i],
                    ground.core_distance[i],
                    ground.polar_angle[i],
                    ground.arrival_time[i],
                    ground.energy[i],
                )
            }));
        }
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::station::{Detector, Station};
    use crate::data::particles::ShowerParticle;
    use crate::geometry::detector::Orientation;

    fn unit_cluster() -> Cluster {
        Cluster::new(vec![Station::new(
            (0.0, 0.0),
            0.0,
            (1.0, 1.0),
            vec![Detector::new((0.0, 0.0), Orientation::UpDown)],
        )])
    }

    #[test]
    fn test_single_detector_at_core() {
        let ground: GroundParticles = vec![
            ShowerParticle::from_xy(1, 0.0, 0.0, 10.0, 1.0),
            ShowerParticle::from_xy(2, 0.4, 0.0, 11.0, 2.0),
            ShowerParticle::from_xy(3, 0.6, 0.0, 12.0, 3.0),
            ShowerParticle::from_xy(4, 2.0, 2.0, 13.0, 4.0),
        ].into_iter().collect();

        let records = simulate_event(0, &Placement::new(0.0, 0.0, 0.0), &unit_cluster(), &ground);

        assert_eq!(records.headers.len(), 2);
        assert!(records.headers[0].is_event_header());
        assert_eq!(records.headers[1].station_id, 1);

        let pids: Vec<i32> = records.particles.iter().map(|p| p.pid).collect();
        assert_eq!(pids, vec![1, 2]);
        assert!(records.particles.iter().all(|p| p.event_id == 0 && p.station_id == 1 && p.detector_id == 0));
        assert_eq!(records.particles[1].time, 11.0);
    }

    #[test]
    fn test_station_headers_follow_cluster_order() {
        let cluster = Cluster::simple(100.0);
        let ground = GroundParticles::default();
        let placement = Placement::new(30.0, 1.0, -0.5);

        let records = simulate_event(9, &placement, &cluster, &ground);

        let ids: Vec<u32> = records.headers.iter().map(|h| h.station_id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
        assert!(records.headers.iter().all(|h| h.event_id == 9));
        assert_eq!(records.headers[0].r, 30.0);
        assert!(records.particles.is_empty());

        // the central station sits on the cluster center
        assert!((records.headers[1].r - 30.0).abs() < 1e-9);
        assert!((records.headers[1].alpha + 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_moved_cluster_misses_core_particles() {
        let ground: GroundParticles = vec![ShowerParticle::from_xy(1, 0.0, 0.0, 0.0, 1.0)].into_iter().collect();
        let records = simulate_event(0, &Placement::new(3.0, 0.0, 0.0), &unit_cluster(), &ground);
        assert!(records.particles.is_empty());
    }
}
