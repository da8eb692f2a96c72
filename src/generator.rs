use std::time::Duration;

use rand::Rng;
use tracing::debug;

use crate::{DepartureTimetable, TimeOfDay};

/// Settings of a simulated timetable, see [`generate_schedule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleGenerator {
    pub start: TimeOfDay,
    pub end: TimeOfDay,
    pub interval: Duration,
    pub jitter_bound: Duration,
}

impl ScheduleGenerator {
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> DepartureTimetable {
        generate_schedule(self.start, self.end, self.interval, self.jitter_bound, rng)
    }
}

/// Simulated timetable: one bus every `interval` from `start` up to `end` included, each departure
/// shifted by a uniform offset in `[-jitter_bound, +jitter_bound]` (whole seconds).
///
/// Returns an empty timetable when `start > end` or when `interval` is zero.
/// Jitter may reorder neighbouring slots, the result is sorted afterwards.
pub fn generate_schedule<R: Rng + ?Sized>(
    start: TimeOfDay,
    end: TimeOfDay,
    interval: Duration,
    jitter_bound: Duration,
    rng: &mut R,
) -> DepartureTimetable {
    if start > end || interval.as_secs() == 0 {
        return DepartureTimetable::default();
    }

    let jitter = i64::try_from(jitter_bound.as_secs()).unwrap_or(i64::MAX);
    let mut departures = Vec::new();
    let mut current = start;
    while current <= end {
        let offset = if jitter == 0 {
            0
        } else {
            rng.gen_range(-jitter..=jitter)
        };
        departures.push(current.saturating_add_signed(offset));

        let next = current + interval;
        if next == current {
            // saturated at the end of the representable range
            break;
        }
        current = next;
    }

    debug!(
        "generated {} departures between {} and {} (jitter ±{}s)",
        departures.len(),
        start,
        end,
        jitter
    );
    DepartureTimetable::new(departures)
}
