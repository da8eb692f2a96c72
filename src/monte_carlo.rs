use std::time::Duration;

use rand::Rng;
use rand_distr::{Distribution, Normal};
use rand_pcg::Pcg64;
use rayon::prelude::*;
use tracing::{debug, trace};

use crate::{Commute, CurvePoint, Error, ProbabilityCurve, Result, SweepWindow, TimeOfDay, Timetable};

/// Bus ride duration, normally distributed and floored at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RideModel {
    pub mean: Duration,
    pub stddev: Duration,
}

impl RideModel {
    pub fn new(mean: Duration, stddev: Duration) -> Self {
        Self { mean, stddev }
    }

    fn distribution(&self) -> Result<Normal<f64>> {
        Normal::new(self.mean.as_secs_f64(), self.stddev.as_secs_f64()).map_err(|err| {
            Error::invalid_argument(format!("invalid ride duration distribution: {err}"))
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonteCarloParams {
    pub commute: Commute,
    pub ride: RideModel,
    pub trials: u32,
}

impl MonteCarloParams {
    pub fn new(commute: Commute, ride: RideModel, trials: u32) -> Self {
        Self {
            commute,
            ride,
            trials,
        }
    }

    fn check_trials(&self) -> Result<()> {
        if self.trials == 0 {
            return Err(Error::invalid_argument(
                "the number of trials must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Share of `params.trials` simulated commutes that reach the meeting late.
///
/// The next bus does not depend on the ride draw, so without any feasible bus the result is
/// exactly `1.0` and `rng` is left untouched.
pub fn estimate_probability<T, R>(
    leave_home: TimeOfDay,
    timetable: &T,
    params: &MonteCarloParams,
    rng: &mut R,
) -> Result<f64>
where
    T: Timetable + ?Sized,
    R: Rng + ?Sized,
{
    params.check_trials()?;
    let ride = params.ride.distribution()?;
    Ok(late_share(leave_home, timetable, params, &ride, rng))
}

fn late_share<T, R>(
    leave_home: TimeOfDay,
    timetable: &T,
    params: &MonteCarloParams,
    ride: &Normal<f64>,
    rng: &mut R,
) -> f64
where
    T: Timetable + ?Sized,
    R: Rng + ?Sized,
{
    let arrival_at_stop = params.commute.arrival_at_stop(leave_home);
    let Some(bus) = timetable.get_earliest_bus(arrival_at_stop) else {
        trace!("no bus after {} for departure {}", arrival_at_stop, leave_home);
        return 1.0;
    };

    // seconds left between boarding and the meeting, once the final walk is done
    let slack = params.commute.meeting_time.seconds_since(timetable.get_departure_time(bus)) as f64
        - params.commute.walk_to_work.as_secs_f64();

    let late_trials = (0..params.trials)
        .filter(|_| {
            let ride_duration = ride.sample(&mut *rng).max(0.0);
            ride_duration > slack
        })
        .count();

    late_trials as f64 / f64::from(params.trials)
}

/// Monte Carlo estimate for every candidate of `window`, drawing from a single `rng`.
pub fn sweep_monte_carlo<T, R>(
    timetable: &T,
    window: &SweepWindow,
    params: &MonteCarloParams,
    rng: &mut R,
) -> Result<ProbabilityCurve>
where
    T: Timetable + ?Sized,
    R: Rng + ?Sized,
{
    params.check_trials()?;
    let ride = params.ride.distribution()?;

    let points = window
        .candidates()
        .map(|departure| CurvePoint {
            departure,
            value: late_share(departure, timetable, params, &ride, &mut *rng),
        })
        .collect();

    debug!(
        "monte carlo sweep {}-{} over {} buses with {} trials per departure",
        window.start(),
        window.end(),
        timetable.nb_of_buses(),
        params.trials
    );
    Ok(ProbabilityCurve::new(points))
}

/// Random stream owned by the candidate at position `sweep_index` of a parallel sweep.
pub fn candidate_rng(seed: u64, sweep_index: usize) -> Pcg64 {
    Pcg64::new(u128::from(seed), sweep_index as u128)
}

/// Same as [`sweep_monte_carlo`] with candidates evaluated in parallel.
///
/// Each candidate draws from its own [`candidate_rng`] stream, so the curve only depends on
/// `seed`, not on how the work was scheduled.
pub fn par_sweep_monte_carlo<T>(
    timetable: &T,
    window: &SweepWindow,
    params: &MonteCarloParams,
    seed: u64,
) -> Result<ProbabilityCurve>
where
    T: Timetable + Sync + ?Sized,
{
    params.check_trials()?;
    let ride = params.ride.distribution()?;

    let candidates: Vec<TimeOfDay> = window.candidates().collect();
    let points = candidates
        .par_iter()
        .enumerate()
        .map(|(sweep_index, &departure)| {
            let mut rng = candidate_rng(seed, sweep_index);
            CurvePoint {
                departure,
                value: late_share(departure, timetable, params, &ride, &mut rng),
            }
        })
        .collect();

    debug!(
        "parallel monte carlo sweep {}-{} with seed {}",
        window.start(),
        window.end(),
        seed
    );
    Ok(ProbabilityCurve::new(points))
}
