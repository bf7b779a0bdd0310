pub mod error;

// particle and record containers
pub mod data {
    pub mod particles;
    pub mod records;
}

// detector geometry and cluster placement
pub mod geometry {
    pub mod boundary;
    pub mod detector;
    pub mod placement;
}

pub mod cluster {
    pub mod presets;
    pub mod station;
}

pub mod simulation {
    pub mod event;
}

pub mod reduction {
    pub mod cursor;
    pub mod reducer;
}

pub use cluster::station::{Cluster, Detector, Station};
pub use data::particles::{GroundParticles, ShowerParticle};
pub use data::records::{CoincidenceRecord, HeaderRecord, ObservableRecord, ParticleHitRecord, DETECTORS_PER_STATION};
pub use error::{GeometryError, StreamOrderingViolation};
pub use geometry::boundary::{line_boundary, LineEquation, ParallelStrip};
pub use geometry::detector::{detector_corners, particles_in_detector, Orientation};
pub use geometry::placement::{sample_placements, station_absolute_placement, Placement, PlacementSampler, StationPlacement};
pub use reduction::reducer::{reduce, reduce_records, ReducedEvents, ReductionSink, ReductionSummary};
pub use simulation::event::{simulate_event, EventRecords};
