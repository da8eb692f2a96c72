// Usage: commute-lateness deterministic --gtfs <feed> [options]
//        commute-lateness monte-carlo [--gtfs <feed>] [options]
//        commute-lateness from-config <config.json>

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use humantime::format_duration;

use lateness::config::{
    CommuteParams, Config, GeneratorParams, LineFilterParams, Mode, RideParams, SweepParams,
};
use lateness::launch::{RunReport, Schedule, run};
use lateness::logger::init_logger;

#[derive(Parser)]
#[command(
    name = "commute-lateness",
    about = "Probability of being late to a meeting depending on when you leave home."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Catch the next bus of a static GTFS timetable: on time (0) or late (1) per departure.
    Deterministic(DeterministicOptions),
    /// Simulate ride durations: late probability per departure.
    MonteCarlo(MonteCarloOptions),
    /// Run from a JSON configuration file.
    FromConfig {
        /// path to the JSON configuration
        path: PathBuf,
    },
}

#[derive(Args)]
struct OutputOptions {
    /// write the result curve to this CSV file
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct DeterministicOptions {
    /// GTFS feed: zip archive, extracted directory or URL
    #[arg(long)]
    gtfs: String,

    #[command(flatten)]
    line_filter: LineFilterParams,

    #[command(flatten)]
    commute: CommuteParams,

    #[command(flatten)]
    sweep: SweepParams,

    #[command(flatten)]
    output: OutputOptions,
}

#[derive(Args)]
struct MonteCarloOptions {
    /// GTFS feed to take departures from, a jittered timetable is simulated without it
    #[arg(long)]
    gtfs: Option<String>,

    #[command(flatten)]
    line_filter: LineFilterParams,

    #[command(flatten)]
    generator: GeneratorParams,

    #[command(flatten)]
    commute: CommuteParams,

    #[command(flatten)]
    sweep: SweepParams,

    #[command(flatten)]
    ride: RideParams,

    #[command(flatten)]
    output: OutputOptions,
}

impl Command {
    fn into_config(self) -> anyhow::Result<Config> {
        let config = match self {
            Command::Deterministic(options) => Config {
                mode: Mode::Deterministic,
                gtfs_path: Some(options.gtfs),
                output: options.output.output,
                commute: options.commute,
                sweep: options.sweep,
                line_filter: options.line_filter,
                ..Default::default()
            },
            Command::MonteCarlo(options) => Config {
                mode: Mode::MonteCarlo,
                gtfs_path: options.gtfs,
                output: options.output.output,
                commute: options.commute,
                sweep: options.sweep,
                ride: options.ride,
                generator: options.generator,
                line_filter: options.line_filter,
            },
            Command::FromConfig { path } => Config::from_json_file(&path)
                .with_context(|| format!("Could not read configuration {}", path.display()))?,
        };
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    init_logger().context("Could not install the logger")?;

    let config = Cli::parse().command.into_config()?;
    let report = run(&config)?;

    print_schedule_overview(&report.schedule);
    print_curve(&report);

    Ok(())
}

fn print_schedule_overview(schedule: &Schedule) {
    println!("Using {} bus departures.", schedule.nb_of_buses());
    println!("Bus schedule overview (first 5 entries):");
    match schedule {
        Schedule::Trips(trips) => {
            for trip in trips.trips().iter().take(5) {
                let ride = Duration::from_secs(
                    trip.arrival.seconds_since(trip.departure).max(0) as u64,
                );
                println!(
                    "Dep: {} -> Arr: {} ({})",
                    trip.departure.to_hms_string(),
                    trip.arrival.to_hms_string(),
                    format_duration(ride)
                );
            }
        }
        Schedule::Departures(departures) => {
            for departure in departures.departures().iter().take(5) {
                println!("Dep: {}", departure.to_hms_string());
            }
        }
    }
    if schedule.nb_of_buses() > 5 {
        println!("...");
    }
    println!();
}

fn print_curve(report: &RunReport) {
    if let Some(seed) = report.seed {
        println!("Random seed: {seed}");
    }
    for row in report.curve.rows() {
        println!("{}  {}", row.departure_time, row.late_probability);
    }
    match report.curve.last_safe_departure() {
        Some(last_safe) => println!("\nLast safe departure: {last_safe}"),
        None => println!("\nNo safe departure time!"),
    }
}
