//! Configuration surface shared by the command line and JSON configuration files.
//!
//! Every parameter is kept as the raw string the user typed (durations in humantime notation such
//! as `5m` or `240s`, times as `HH:MM` or `HH:MM:SS`). The `validate` methods turn them into the
//! typed values used by the engine, failing with [`Error::InvalidConfiguration`] before anything
//! is evaluated.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use clap::Args;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::generator::ScheduleGenerator;
use crate::gtfs::LineFilter;
use crate::monte_carlo::MonteCarloParams;
use crate::{Commute, Error, Result, RideModel, SweepWindow, TimeOfDay};

pub const DEFAULT_WALK_TO_STOP: &str = "300s";
pub const DEFAULT_WALK_TO_WORK: &str = "240s";
pub const DEFAULT_MEETING_TIME: &str = "09:05:00";
pub const DEFAULT_SWEEP_START: &str = "08:00";
pub const DEFAULT_SWEEP_END: &str = "08:45";
pub const DEFAULT_SWEEP_STEP: &str = "1m";
pub const DEFAULT_RIDE_MEAN: &str = "20m";
pub const DEFAULT_RIDE_STDDEV: &str = "3m";
pub const DEFAULT_TRIAL_COUNT: i64 = 1000;
pub const DEFAULT_SCHEDULE_START: &str = "07:00";
pub const DEFAULT_SCHEDULE_END: &str = "09:00";
pub const DEFAULT_SCHEDULE_INTERVAL: &str = "10m";
pub const DEFAULT_JITTER_BOUND: &str = "60s";
pub const DEFAULT_LINE: &str = "8";
pub const DEFAULT_ORIGIN: &str = "Zoo";
pub const DEFAULT_DESTINATION: &str = "Toompark";
pub const DEFAULT_GTFS_WINDOW_START: &str = "07:00";
pub const DEFAULT_GTFS_WINDOW_END: &str = "09:00";

fn parse_time(name: &str, value: &str) -> Result<TimeOfDay> {
    TimeOfDay::from_str(value)
        .map_err(|err| Error::invalid_configuration(format!("{name}: {err}")))
}

/// Durations are whole seconds, every time of day in the engine has second precision.
fn parse_duration(name: &str, value: &str) -> Result<Duration> {
    let duration = humantime::parse_duration(value.trim()).map_err(|err| {
        Error::invalid_configuration(format!(
            "{name}: '{value}' is not a non-negative duration ({err})"
        ))
    })?;
    if duration.subsec_nanos() != 0 {
        return Err(Error::invalid_configuration(format!(
            "{name}: '{value}' is not a whole number of seconds"
        )));
    }
    Ok(duration)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Args)]
#[serde(deny_unknown_fields)]
pub struct CommuteParams {
    /// walking time from home to the bus stop
    #[arg(long, default_value = DEFAULT_WALK_TO_STOP)]
    #[serde(default = "default_walk_to_stop")]
    pub walk_to_stop: String,

    /// walking time from the alighting stop to the meeting
    #[arg(long, default_value = DEFAULT_WALK_TO_WORK)]
    #[serde(default = "default_walk_to_work")]
    pub walk_to_work: String,

    /// start of the meeting
    #[arg(long, default_value = DEFAULT_MEETING_TIME)]
    #[serde(default = "default_meeting_time")]
    pub meeting_time: String,
}

pub fn default_walk_to_stop() -> String {
    DEFAULT_WALK_TO_STOP.to_string()
}

pub fn default_walk_to_work() -> String {
    DEFAULT_WALK_TO_WORK.to_string()
}

pub fn default_meeting_time() -> String {
    DEFAULT_MEETING_TIME.to_string()
}

impl Default for CommuteParams {
    fn default() -> Self {
        Self {
            walk_to_stop: default_walk_to_stop(),
            walk_to_work: default_walk_to_work(),
            meeting_time: default_meeting_time(),
        }
    }
}

impl CommuteParams {
    pub fn validate(&self) -> Result<Commute> {
        Ok(Commute::new(
            parse_duration("walk_to_stop", &self.walk_to_stop)?,
            parse_duration("walk_to_work", &self.walk_to_work)?,
            parse_time("meeting_time", &self.meeting_time)?,
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Args)]
#[serde(deny_unknown_fields)]
pub struct SweepParams {
    /// earliest home departure to evaluate
    #[arg(long, default_value = DEFAULT_SWEEP_START)]
    #[serde(default = "default_sweep_start")]
    pub sweep_start: String,

    /// latest home departure to evaluate (included)
    #[arg(long, default_value = DEFAULT_SWEEP_END)]
    #[serde(default = "default_sweep_end")]
    pub sweep_end: String,

    /// spacing between two evaluated home departures
    #[arg(long, default_value = DEFAULT_SWEEP_STEP)]
    #[serde(default = "default_sweep_step")]
    pub sweep_step: String,
}

pub fn default_sweep_start() -> String {
    DEFAULT_SWEEP_START.to_string()
}

pub fn default_sweep_end() -> String {
    DEFAULT_SWEEP_END.to_string()
}

pub fn default_sweep_step() -> String {
    DEFAULT_SWEEP_STEP.to_string()
}

impl Default for SweepParams {
    fn default() -> Self {
        Self {
            sweep_start: default_sweep_start(),
            sweep_end: default_sweep_end(),
            sweep_step: default_sweep_step(),
        }
    }
}

impl SweepParams {
    pub fn validate(&self) -> Result<SweepWindow> {
        SweepWindow::with_step(
            parse_time("sweep_start", &self.sweep_start)?,
            parse_time("sweep_end", &self.sweep_end)?,
            parse_duration("sweep_step", &self.sweep_step)?,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Args)]
#[serde(deny_unknown_fields)]
pub struct RideParams {
    /// mean bus ride duration
    #[arg(long, default_value = DEFAULT_RIDE_MEAN)]
    #[serde(default = "default_ride_mean")]
    pub ride_mean: String,

    /// standard deviation of the bus ride duration
    #[arg(long, default_value = DEFAULT_RIDE_STDDEV)]
    #[serde(default = "default_ride_stddev")]
    pub ride_stddev: String,

    /// number of simulated commutes per home departure
    #[arg(long, default_value_t = DEFAULT_TRIAL_COUNT, allow_negative_numbers = true)]
    #[serde(default = "default_trial_count")]
    pub trial_count: i64,

    /// seed of the random generator, drawn from the OS when missing
    #[arg(long)]
    #[serde(default)]
    pub seed: Option<u64>,

    /// evaluate home departures in parallel
    #[arg(long)]
    #[serde(default)]
    pub parallel: bool,
}

pub fn default_ride_mean() -> String {
    DEFAULT_RIDE_MEAN.to_string()
}

pub fn default_ride_stddev() -> String {
    DEFAULT_RIDE_STDDEV.to_string()
}

pub fn default_trial_count() -> i64 {
    DEFAULT_TRIAL_COUNT
}

impl Default for RideParams {
    fn default() -> Self {
        Self {
            ride_mean: default_ride_mean(),
            ride_stddev: default_ride_stddev(),
            trial_count: default_trial_count(),
            seed: None,
            parallel: false,
        }
    }
}

impl RideParams {
    pub fn validate(&self, commute: Commute) -> Result<MonteCarloParams> {
        let ride = RideModel::new(
            parse_duration("ride_mean", &self.ride_mean)?,
            parse_duration("ride_stddev", &self.ride_stddev)?,
        );
        let trials = u32::try_from(self.trial_count)
            .ok()
            .filter(|&trials| trials > 0)
            .ok_or_else(|| {
                Error::invalid_configuration(format!(
                    "trial_count must be between 1 and {}, got {}",
                    u32::MAX,
                    self.trial_count
                ))
            })?;
        Ok(MonteCarloParams::new(commute, ride, trials))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Args)]
#[serde(deny_unknown_fields)]
pub struct GeneratorParams {
    /// first nominal departure of the simulated timetable
    #[arg(long, default_value = DEFAULT_SCHEDULE_START)]
    #[serde(default = "default_schedule_start")]
    pub schedule_start: String,

    /// last possible nominal departure of the simulated timetable
    #[arg(long, default_value = DEFAULT_SCHEDULE_END)]
    #[serde(default = "default_schedule_end")]
    pub schedule_end: String,

    /// headway of the simulated timetable
    #[arg(long, default_value = DEFAULT_SCHEDULE_INTERVAL)]
    #[serde(default = "default_schedule_interval")]
    pub schedule_interval: String,

    /// maximum shift applied to each simulated departure, in both directions
    #[arg(long, default_value = DEFAULT_JITTER_BOUND)]
    #[serde(default = "default_jitter_bound")]
    pub jitter_bound: String,
}

pub fn default_schedule_start() -> String {
    DEFAULT_SCHEDULE_START.to_string()
}

pub fn default_schedule_end() -> String {
    DEFAULT_SCHEDULE_END.to_string()
}

pub fn default_schedule_interval() -> String {
    DEFAULT_SCHEDULE_INTERVAL.to_string()
}

pub fn default_jitter_bound() -> String {
    DEFAULT_JITTER_BOUND.to_string()
}

impl Default for GeneratorParams {
    fn default() -> Self {
        Self {
            schedule_start: default_schedule_start(),
            schedule_end: default_schedule_end(),
            schedule_interval: default_schedule_interval(),
            jitter_bound: default_jitter_bound(),
        }
    }
}

impl GeneratorParams {
    pub fn validate(&self) -> Result<ScheduleGenerator> {
        let interval = parse_duration("schedule_interval", &self.schedule_interval)?;
        if interval.as_secs() == 0 {
            return Err(Error::invalid_configuration(
                "schedule_interval must be at least one second",
            ));
        }
        Ok(ScheduleGenerator {
            start: parse_time("schedule_start", &self.schedule_start)?,
            end: parse_time("schedule_end", &self.schedule_end)?,
            interval,
            jitter_bound: parse_duration("jitter_bound", &self.jitter_bound)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Args)]
#[serde(deny_unknown_fields)]
pub struct LineFilterParams {
    /// route_short_name of the bus line in the GTFS feed
    #[arg(long, default_value = DEFAULT_LINE)]
    #[serde(default = "default_line")]
    pub line: String,

    /// part of the boarding stop name
    #[arg(long, default_value = DEFAULT_ORIGIN)]
    #[serde(default = "default_origin")]
    pub origin: String,

    /// part of the alighting stop name
    #[arg(long, default_value = DEFAULT_DESTINATION)]
    #[serde(default = "default_destination")]
    pub destination: String,

    /// keep GTFS rides departing from this time
    #[arg(long, default_value = DEFAULT_GTFS_WINDOW_START)]
    #[serde(default = "default_gtfs_window_start")]
    pub gtfs_window_start: String,

    /// keep GTFS rides departing up to this time
    #[arg(long, default_value = DEFAULT_GTFS_WINDOW_END)]
    #[serde(default = "default_gtfs_window_end")]
    pub gtfs_window_end: String,
}

pub fn default_line() -> String {
    DEFAULT_LINE.to_string()
}

pub fn default_origin() -> String {
    DEFAULT_ORIGIN.to_string()
}

pub fn default_destination() -> String {
    DEFAULT_DESTINATION.to_string()
}

pub fn default_gtfs_window_start() -> String {
    DEFAULT_GTFS_WINDOW_START.to_string()
}

pub fn default_gtfs_window_end() -> String {
    DEFAULT_GTFS_WINDOW_END.to_string()
}

impl Default for LineFilterParams {
    fn default() -> Self {
        Self {
            line: default_line(),
            origin: default_origin(),
            destination: default_destination(),
            gtfs_window_start: default_gtfs_window_start(),
            gtfs_window_end: default_gtfs_window_end(),
        }
    }
}

impl LineFilterParams {
    pub fn validate(&self) -> Result<LineFilter> {
        Ok(LineFilter {
            line: self.line.clone(),
            origin: self.origin.clone(),
            destination: self.destination.clone(),
            window_start: parse_time("gtfs_window_start", &self.gtfs_window_start)?,
            window_end: parse_time("gtfs_window_end", &self.gtfs_window_end)?,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// next bus rule on (departure, arrival) pairs, 0/1 outcome per home departure
    Deterministic,
    /// simulated ride durations, late probability per home departure
    #[default]
    MonteCarlo,
}

/// A whole run, as read from a JSON configuration file.
///
/// The deterministic mode reads `commute`, `sweep` and `line_filter`. The monte carlo mode also
/// reads `ride` and `generator`, the latter only without a GTFS feed. Every section is
/// validated whatever the mode, so a file that is wrong for one mode is wrong for both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub mode: Mode,

    /// GTFS feed (zip, directory or URL); the monte carlo mode simulates a timetable without it
    #[serde(default)]
    pub gtfs_path: Option<String>,

    /// CSV file receiving the result curve
    #[serde(default)]
    pub output: Option<PathBuf>,

    #[serde(default)]
    pub commute: CommuteParams,

    #[serde(default)]
    pub sweep: SweepParams,

    #[serde(default)]
    pub ride: RideParams,

    #[serde(default)]
    pub generator: GeneratorParams,

    #[serde(default)]
    pub line_filter: LineFilterParams,
}

impl Config {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&content)?;
        debug!("read configuration from {}", path.display());
        Ok(config)
    }
}
