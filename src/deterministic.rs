use tracing::{debug, trace};

use crate::{Commute, CurvePoint, Outcome, OutcomeCurve, SweepWindow, TimeOfDay, Timetable, TripTimetable};

/// On time or late when leaving home at `leave_home` and boarding the next feasible bus.
///
/// A bus departing exactly when the commuter reaches the stop is still caught.
/// Without any feasible bus the outcome is late.
pub fn evaluate(leave_home: TimeOfDay, timetable: &TripTimetable, commute: &Commute) -> Outcome {
    let arrival_at_stop = commute.arrival_at_stop(leave_home);
    let Some(trip) = timetable.get_earliest_bus(arrival_at_stop) else {
        trace!("no bus after {} for departure {}", arrival_at_stop, leave_home);
        return Outcome::Late;
    };

    let final_arrival = trip.arrival + commute.walk_to_work;
    if final_arrival > commute.meeting_time {
        Outcome::Late
    } else {
        Outcome::OnTime
    }
}

/// Evaluates every candidate of `window` and marks the first safe → late boundary.
pub fn sweep(timetable: &TripTimetable, commute: &Commute, window: &SweepWindow) -> OutcomeCurve {
    let points: Vec<CurvePoint<Outcome>> = window
        .candidates()
        .map(|departure| CurvePoint {
            departure,
            value: evaluate(departure, timetable, commute),
        })
        .collect();

    let curve = OutcomeCurve::with_boundary(points);
    debug!(
        "deterministic sweep {}-{} over {} trips, last safe departure {:?}",
        window.start(),
        window.end(),
        timetable.nb_of_buses(),
        curve.last_safe_departure().map(|t| t.to_string())
    );
    curve
}
