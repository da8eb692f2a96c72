//! Odds of being late to a meeting as a function of the time you leave home to catch a bus.
//!
//! A [`Timetable`] (static feed or simulated with jitter) is combined with a walking and riding
//! model, then a sweep over candidate home departures produces either a deterministic on time /
//! late curve ([`deterministic::sweep`]) or a Monte Carlo probability curve
//! ([`monte_carlo::sweep_monte_carlo`]).

use std::fmt::Debug;
use std::time::Duration;

pub mod config;
pub mod curve;
pub mod deterministic;
pub mod error;
pub mod generator;
pub mod gtfs;
pub mod launch;
pub mod logger;
pub mod monte_carlo;
pub mod report;
pub mod sweep;
pub mod time;
pub mod timetable;

pub use curve::{CurvePoint, CurveRow, Outcome, OutcomeCurve, ProbabilityCurve};
pub use error::{Error, Result};
pub use generator::generate_schedule;
pub use monte_carlo::RideModel;
pub use sweep::SweepWindow;
pub use time::TimeOfDay;
pub use timetable::{DepartureTimetable, Trip, TripTimetable};

/// A bus schedule between the commuter's stop and the stop near the meeting.
///
/// Implementations keep their buses sorted by departure so that the earliest bus leaving at or
/// after a given time can be found by binary search.
pub trait Timetable {
    type Bus: Copy + Debug;

    /// First bus departing at or after `at`.
    fn get_earliest_bus(&self, at: TimeOfDay) -> Option<Self::Bus>;
    fn get_departure_time(&self, bus: Self::Bus) -> TimeOfDay;
    fn nb_of_buses(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.nb_of_buses() == 0
    }
}

/// Walking legs around the bus ride and the time to beat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Commute {
    pub walk_to_stop: Duration,
    pub walk_to_work: Duration,
    pub meeting_time: TimeOfDay,
}

impl Commute {
    pub fn new(walk_to_stop: Duration, walk_to_work: Duration, meeting_time: TimeOfDay) -> Self {
        Self {
            walk_to_stop,
            walk_to_work,
            meeting_time,
        }
    }

    pub fn arrival_at_stop(&self, leave_home: TimeOfDay) -> TimeOfDay {
        leave_home + self.walk_to_stop
    }
}
