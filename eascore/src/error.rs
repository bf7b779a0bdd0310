use thiserror::Error;

/// Errors raised while building detector geometry.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("unknown detector orientation: {0:?} (expected \"UD\" or \"LR\")")]
    UnknownOrientation(String),

    #[error("station {station} has {count} detectors, at most {max} are supported")]
    TooManyDetectors { station: usize, count: usize, max: usize },

    #[error("station {station} detector size ({width}, {length}) must be finite and positive")]
    InvalidDetectorSize { station: usize, width: f64, length: f64 },

    #[error("placement radius {0} must be finite, non negative and have a finite square")]
    InvalidRadius(f64),
}

/// The header and particle streams handed to the reducer were not co-sorted.
///
/// Every variant carries the ids needed to locate the offending record.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StreamOrderingViolation {
    #[error("expected an event header, found station {station_id} of event {event_id}")]
    MissingEventHeader { event_id: u32, station_id: u32 },

    #[error("event {found} follows event {previous}, event ids must strictly increase")]
    EventOutOfOrder { previous: u32, found: u32 },

    #[error("station {found} follows station {previous} in event {event_id}")]
    StationOutOfOrder { event_id: u32, previous: u32, found: u32 },

    #[error("station header for event {found_event} inside event {event_id}")]
    StationOutsideEvent { event_id: u32, found_event: u32 },

    #[error(
        "particle of event {particle_event} station {particle_station} encountered while \
         reading event {event_id} station {station_id}"
    )]
    ParticleOutOfOrder {
        event_id: u32,
        station_id: u32,
        particle_event: u32,
        particle_station: u32,
    },

    #[error("detector index {detector_id} out of range in event {event_id} station {station_id}")]
    DetectorOutOfRange { event_id: u32, station_id: u32, detector_id: u32 },

    #[error("particle of event {event_id} station {station_id} left over after the last header")]
    TrailingParticles { event_id: u32, station_id: u32 },
}
