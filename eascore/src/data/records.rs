use serde::{Deserialize, Serialize};

/// Number of detector slots tracked per station in derived records.
pub const DETECTORS_PER_STATION: usize = 4;

/// Event or station header written by the simulator.
///
/// `station_id == 0` marks the event level header, whose `r`, `phi` and
/// `alpha` describe the cluster placement. Station headers (`station_id > 0`)
/// carry the absolute polar position and rotation of that station.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct HeaderRecord {
    pub event_id: u32,
    pub station_id: u32,
    pub r: f64,
    pub phi: f64,
    pub alpha: f64,
}

impl HeaderRecord {
    pub fn new(event_id: u32, station_id: u32, r: f64, phi: f64, alpha: f64) -> Self {
        HeaderRecord { event_id, station_id, r, phi, alpha }
    }

    pub fn is_event_header(&self) -> bool {
        self.station_id == 0
    }
}

/// One particle that struck one detector of one station in one event.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ParticleHitRecord {
    pub event_id: u32,
    pub station_id: u32,
    pub detector_id: u32,
    pub pid: i32,
    pub r: f64,
    pub phi: f64,
    pub time: f64,
    pub energy: f64,
}

impl ParticleHitRecord {
    pub fn new(
        event_id: u32,
        station_id: u32,
        detector_id: u32,
        pid: i32,
        r: f64,
        phi: f64,
        time: f64,
        energy: f64,
    ) -> Self {
        ParticleHitRecord { event_id, station_id, detector_id, pid, r, phi, time, energy }
    }

    /// (event, station) key used to merge against the header stream.
    pub fn key(&self) -> (u32, u32) {
        (self.event_id, self.station_id)
    }
}

/// Per station summary of one event.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ObservableRecord {
    pub event_id: u32,
    pub station_id: u32,
    pub r: f64,
    pub phi: f64,
    pub alpha: f64,
    /// number of detectors with at least one particle
    pub detectors_hit: u32,
    pub counts: [u32; DETECTORS_PER_STATION],
    /// first arrival time per detector, `None` if the detector saw nothing
    pub first_arrival: [Option<f64>; DETECTORS_PER_STATION],
}

impl ObservableRecord {
    /// Summarize the arrival times collected for each detector of `station`.
    pub fn from_arrival_times(station: &HeaderRecord, times: &[Vec<f64>; DETECTORS_PER_STATION]) -> Self {
        let counts = times.each_ref().map(|t| t.len() as u32);
        let first_arrival = times.each_ref().map(|t| t.iter().copied().reduce(f64::min));
        let detectors_hit = counts.iter().filter(|&&n| n > 0).count() as u32;

        ObservableRecord {
            event_id: station.event_id,
            station_id: station.station_id,
            r: station.r,
            phi: station.phi,
            alpha: station.alpha,
            detectors_hit,
            counts,
            first_arrival,
        }
    }

    /// A station triggers when at least two of its detectors were hit.
    pub fn is_triggered(&self) -> bool {
        self.detectors_hit >= 2
    }
}

/// Per event summary: where the cluster was and how many stations triggered.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct CoincidenceRecord {
    pub event_id: u32,
    pub r: f64,
    pub phi: f64,
    pub alpha: f64,
    pub n: u32,
}

impl CoincidenceRecord {
    pub fn new(event: &HeaderRecord, n: u32) -> Self {
        CoincidenceRecord { event_id: event.event_id, r: event.r, phi: event.phi, alpha: event.alpha, n }
    }
}
