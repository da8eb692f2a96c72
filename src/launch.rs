use rand::SeedableRng;
use rand_pcg::Pcg64;
use tracing::info;

use crate::config::{Config, Mode};
use crate::monte_carlo::{par_sweep_monte_carlo, sweep_monte_carlo};
use crate::report::write_csv_file;
use crate::{
    CurveRow, DepartureTimetable, Error, OutcomeCurve, ProbabilityCurve, Result, TimeOfDay,
    Timetable, TripTimetable, deterministic,
};

/// Timetable the curve was computed on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Schedule {
    Trips(TripTimetable),
    Departures(DepartureTimetable),
}

impl Schedule {
    pub fn nb_of_buses(&self) -> usize {
        match self {
            Schedule::Trips(trips) => trips.nb_of_buses(),
            Schedule::Departures(departures) => departures.nb_of_buses(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Curve {
    Outcomes(OutcomeCurve),
    Probabilities(ProbabilityCurve),
}

impl Curve {
    pub fn last_safe_departure(&self) -> Option<TimeOfDay> {
        match self {
            Curve::Outcomes(curve) => curve.last_safe_departure(),
            Curve::Probabilities(curve) => curve.last_safe_departure(),
        }
    }

    fn write_csv_file(&self, path: &std::path::Path) -> Result<()> {
        match self {
            Curve::Outcomes(curve) => write_csv_file(path, &curve.rows()),
            Curve::Probabilities(curve) => write_csv_file(path, &curve.rows()),
        }
    }

    /// Rows with the value rendered as it is persisted.
    pub fn rows(&self) -> Vec<CurveRow<String>> {
        match self {
            Curve::Outcomes(curve) => curve
                .rows()
                .into_iter()
                .map(|row| CurveRow {
                    departure_time: row.departure_time,
                    late_probability: row.late_probability.as_u8().to_string(),
                })
                .collect(),
            Curve::Probabilities(curve) => curve
                .rows()
                .into_iter()
                .map(|row| CurveRow {
                    departure_time: row.departure_time,
                    late_probability: format!("{:.3}", row.late_probability),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub schedule: Schedule,
    pub curve: Curve,
    /// seed the random generator was built from, monte carlo mode only
    pub seed: Option<u64>,
}

/// Validates the whole configuration, builds the schedule, runs the sweep of `config.mode` and
/// writes the CSV when an output path is configured.
///
/// Every section is validated first, including those the mode does not read. Nothing is loaded
/// or simulated when the configuration is invalid.
pub fn run(config: &Config) -> Result<RunReport> {
    let commute = config.commute.validate()?;
    let window = config.sweep.validate()?;
    let line_filter = config.line_filter.validate()?;
    let params = config.ride.validate(commute)?;
    let generator = config.generator.validate()?;

    let report = match config.mode {
        Mode::Deterministic => {
            let gtfs_path = config.gtfs_path.as_deref().ok_or_else(|| {
                Error::invalid_configuration("the deterministic mode needs a GTFS feed")
            })?;
            let trips = TripTimetable::from_gtfs_path(gtfs_path, &line_filter)?;
            let curve = deterministic::sweep(&trips, &commute, &window);
            RunReport {
                schedule: Schedule::Trips(trips),
                curve: Curve::Outcomes(curve),
                seed: None,
            }
        }
        Mode::MonteCarlo => {
            let seed = config.ride.seed.unwrap_or_else(rand::random);
            info!("random seed {}", seed);
            let mut rng = Pcg64::seed_from_u64(seed);

            let departures = match config.gtfs_path.as_deref() {
                Some(gtfs_path) => {
                    TripTimetable::from_gtfs_path(gtfs_path, &line_filter)?.to_departures()
                }
                None => generator.generate(&mut rng),
            };
            let curve = if config.ride.parallel {
                par_sweep_monte_carlo(&departures, &window, &params, seed)?
            } else {
                sweep_monte_carlo(&departures, &window, &params, &mut rng)?
            };
            RunReport {
                schedule: Schedule::Departures(departures),
                curve: Curve::Probabilities(curve),
                seed: Some(seed),
            }
        }
    };

    info!(
        "evaluated {} home departures against {} buses",
        window.nb_of_candidates(),
        report.schedule.nb_of_buses()
    );
    if let Some(output) = &config.output {
        report.curve.write_csv_file(output)?;
    }
    Ok(report)
}
