use std::cmp::Ordering;

use log::debug;

use crate::data::records::{
    CoincidenceRecord, HeaderRecord, ObservableRecord, ParticleHitRecord, DETECTORS_PER_STATION,
};
use crate::error::StreamOrderingViolation;
use crate::reduction::cursor::StreamCursor;

/// Destination for reduced records.
pub trait ReductionSink {
    type Error;

    fn write_observable(&mut self, record: ObservableRecord) -> Result<(), Self::Error>;
    fn write_coincidence(&mut self, record: CoincidenceRecord) -> Result<(), Self::Error>;
}

/// Reduced records kept in memory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReducedEvents {
    pub observables: Vec<ObservableRecord>,
    pub coincidences: Vec<CoincidenceRecord>,
}

impl ReductionSink for ReducedEvents {
    type Error = StreamOrderingViolation;

    fn write_observable(&mut self, record: ObservableRecord) -> Result<(), Self::Error> {
        self.observables.push(record);
        Ok(())
    }

    fn write_coincidence(&mut self, record: CoincidenceRecord) -> Result<(), Self::Error> {
        self.coincidences.push(record);
        Ok(())
    }
}

/// Counts gathered during one reduction pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReductionSummary {
    pub events: usize,
    pub stations: usize,
    pub particles: usize,
    pub triggered_stations: usize,
}

/// Arrival times collected per detector slot for the current station.
type DetectorTimes = [Vec<f64>; DETECTORS_PER_STATION];

enum ReducerState {
    AwaitEventHeader,
    AwaitStationHeader { event: HeaderRecord, triggered: u32, last_station: u32 },
    CollectParticlesForStation { event: HeaderRecord, station: HeaderRecord, triggered: u32, times: DetectorTimes },
    Finalize { event: HeaderRecord, triggered: u32 },
    Done,
}

/// Merge the header and particle streams into observables and coincidences
///
/// Both streams must be ordered by event, then station, and the particle
/// stream may only reference (event, station) pairs that appear in the header
/// stream. Every station header yields one `ObservableRecord`; every event
/// yields exactly one `CoincidenceRecord`, including the last one, which is
/// finalized when the header stream runs out.
///
/// Any deviation from that order is reported as a `StreamOrderingViolation`
/// instead of producing undercounted aggregates.
pub fn reduce<H, P, S, E>(headers: H, particles: P, sink: &mut S) -> Result<ReductionSummary, E>
where
    H: IntoIterator<Item = Result<HeaderRecord, E>>,
    P: IntoIterator<Item = Result<ParticleHitRecord, E>>,
    S: ReductionSink<Error = E>,
    E: From<StreamOrderingViolation>,
{
    let mut headers = StreamCursor::new(headers.into_iter());
    let mut particles = StreamCursor::new(particles.into_iter());
    let mut summary = ReductionSummary::default();
    let mut last_event: Option<u32> = None;
    let mut state = ReducerState::AwaitEventHeader;

    loop {
        state = match state {
            ReducerState::AwaitEventHeader => match headers.advance()? {
                None => {
                    if let Some(p) = particles.peek()? {
                        return Err(StreamOrderingViolation::TrailingParticles {
                            event_id: p.event_id,
                            station_id: p.station_id,
                        }.into());
                    }
                    ReducerState::Done
                }
                Some(header) => {
                    if !header.is_event_header() {
                        return Err(StreamOrderingViolation::MissingEventHeader {
                            event_id: header.event_id,
                            station_id: header.station_id,
                        }.into());
                    }
                    if let Some(previous) = last_event {
                        if header.event_id <= previous {
                            return Err(StreamOrderingViolation::EventOutOfOrder {
                                previous,
                                found: header.event_id,
                            }.into());
                        }
                    }
                    last_event = Some(header.event_id);
                    ReducerState::AwaitStationHeader { event: header, triggered: 0, last_station: 0 }
                }
            },

            ReducerState::AwaitStationHeader { event, triggered, last_station } => {
                // the next event header stays in the stream for AwaitEventHeader
                let next_station = match headers.peek()? {
                    Some(header) if !header.is_event_header() => Some(*header),
                    _ => None,
                };

                match next_station {
                    None => ReducerState::Finalize { event, triggered },
                    Some(station) => {
                        headers.advance()?;
                        if station.event_id != event.event_id {
                            return Err(StreamOrderingViolation::StationOutsideEvent {
                                event_id: event.event_id,
                                found_event: station.event_id,
                            }.into());
                        }
                        if station.station_id <= last_station {
                            return Err(StreamOrderingViolation::StationOutOfOrder {
                                event_id: event.event_id,
                                previous: last_station,
                                found: station.station_id,
                            }.into());
                        }
                        ReducerState::CollectParticlesForStation {
                            event,
                            station,
                            triggered,
                            times: Default::default(),
                        }
                    }
                }
            }

            ReducerState::CollectParticlesForStation { event, station, mut triggered, mut times } => {
                let key = (event.event_id, station.station_id);
                let belongs_here = match particles.peek()? {
                    // no more particles: every remaining station is empty
                    None => false,
                    Some(p) => match p.key().cmp(&key) {
                        Ordering::Equal => true,
                        Ordering::Greater => false,
                        Ordering::Less => {
                            return Err(StreamOrderingViolation::ParticleOutOfOrder {
                                event_id: key.0,
                                station_id: key.1,
                                particle_event: p.event_id,
                                particle_station: p.station_id,
                            }.into());
                        }
                    },
                };

                if belongs_here {
                    if let Some(p) = particles.advance()? {
                        let slot = times.get_mut(p.detector_id as usize).ok_or(
                            StreamOrderingViolation::DetectorOutOfRange {
                                event_id: p.event_id,
                                station_id: p.station_id,
                                detector_id: p.detector_id,
                            },
                        )?;
                        slot.push(p.time);
                    }
                    ReducerState::CollectParticlesForStation { event, station, triggered, times }
                } else {
                    let observable = ObservableRecord::from_arrival_times(&station, &times);
                    if observable.is_triggered() {
                        triggered += 1;
                        summary.triggered_stations += 1;
                    }
                    sink.write_observable(observable)?;
                    summary.stations += 1;
                    ReducerState::AwaitStationHeader { event, triggered, last_station: station.station_id }
                }
            }

            ReducerState::Finalize { event, triggered } => {
                sink.write_coincidence(CoincidenceRecord::new(&event, triggered))?;
                summary.events += 1;
                debug!("event {} reduced, {} stations triggered", event.event_id, triggered);
                ReducerState::AwaitEventHeader
            }

            ReducerState::Done => break,
        };
    }

    summary.particles = particles.consumed();
    Ok(summary)
}

/// Reduce two in-memory record slices.
pub fn reduce_records(
    headers: &[HeaderRecord],
    particles: &[ParticleHitRecord],
) -> Result<ReducedEvents, StreamOrderingViolation> {
    let mut reduced = ReducedEvents::default();
    reduce(
        headers.iter().copied().map(Ok),
        particles.iter().copied().map(Ok),
        &mut reduced,
    )?;
    Ok(reduced)
}
