use std::time::Duration;

use anyhow::Error;
use lateness::config::{Config, Mode};
use lateness::launch::{Curve, Schedule, run};
use lateness::logger::init_test_logger;
use lateness::monte_carlo::{MonteCarloParams, estimate_probability, sweep_monte_carlo};
use lateness::{
    Commute, DepartureTimetable, RideModel, SweepWindow, TimeOfDay, Timetable, generate_schedule,
};
use rand::SeedableRng;
use rand_pcg::Pcg64;

fn hm(hours: u32, minutes: u32) -> TimeOfDay {
    TimeOfDay::from_hms(hours, minutes, 0)
}

fn simulated_config(seed: u64) -> Config {
    let mut config = Config {
        mode: Mode::MonteCarlo,
        ..Default::default()
    };
    config.ride.seed = Some(seed);
    config.ride.trial_count = 300;
    config
}

#[test]
fn generated_schedule_has_expected_length() {
    let mut rng = Pcg64::seed_from_u64(0);
    let timetable = generate_schedule(hm(8, 0), hm(8, 30), Duration::from_secs(600), Duration::ZERO, &mut rng);
    assert_eq!(timetable.departures(), &[hm(8, 0), hm(8, 10), hm(8, 20), hm(8, 30)]);
}

#[test]
fn jittered_schedules_are_sorted_for_any_seed() {
    for seed in 0..500 {
        let mut rng = Pcg64::seed_from_u64(seed);
        let timetable = generate_schedule(
            hm(8, 0),
            hm(8, 30),
            Duration::from_secs(600),
            Duration::from_secs(30),
            &mut rng,
        );
        assert_eq!(timetable.nb_of_buses(), 4);
        assert!(timetable.departures().windows(2).all(|w| w[0] <= w[1]));
    }
}

#[test]
fn frequent_buses_with_zero_walks_are_almost_never_late() -> Result<(), Error> {
    let mut rng = Pcg64::seed_from_u64(2024);
    let timetable = generate_schedule(hm(8, 0), hm(9, 0), Duration::from_secs(300), Duration::ZERO, &mut rng);
    let params = MonteCarloParams::new(
        Commute::new(Duration::ZERO, Duration::ZERO, hm(9, 5)),
        RideModel::new(Duration::from_secs(600), Duration::from_secs(60)),
        100,
    );
    let probability = estimate_probability(hm(8, 0), &timetable, &params, &mut rng)?;
    assert!((0.0..=0.05).contains(&probability));
    Ok(())
}

#[test]
fn no_bus_is_certainly_late_whatever_the_seed() -> Result<(), Error> {
    let params = MonteCarloParams::new(
        Commute::new(Duration::ZERO, Duration::ZERO, hm(9, 5)),
        RideModel::new(Duration::from_secs(600), Duration::from_secs(60)),
        10,
    );
    for seed in 0..10 {
        let mut rng = Pcg64::seed_from_u64(seed);
        let probability = estimate_probability(hm(8, 55), &DepartureTimetable::default(), &params, &mut rng)?;
        assert_eq!(probability, 1.0);
    }

    let window = SweepWindow::new(hm(8, 0), hm(8, 45))?;
    let curve = sweep_monte_carlo(
        &DepartureTimetable::default(),
        &window,
        &params,
        &mut Pcg64::seed_from_u64(0),
    )?;
    assert!(curve.points().iter().all(|p| p.value == 1.0));
    assert_eq!(curve.last_safe_departure(), None);
    Ok(())
}

#[test]
fn late_probability_grows_towards_the_meeting() -> Result<(), Error> {
    let timetable = DepartureTimetable::new(vec![hm(8, 0), hm(8, 20), hm(8, 40)]);
    let params = MonteCarloParams::new(
        Commute::new(Duration::from_secs(300), Duration::from_secs(240), hm(9, 5)),
        RideModel::new(Duration::from_secs(20 * 60), Duration::from_secs(3 * 60)),
        2000,
    );
    let window = SweepWindow::new(hm(7, 50), hm(8, 40))?;
    let curve = sweep_monte_carlo(&timetable, &window, &params, &mut Pcg64::seed_from_u64(5))?;
    let at = |minute_offset: usize| curve.points()[minute_offset].value;

    // 07:50 boards at 08:00 with 61 minutes of slack
    assert_eq!(at(0), 0.0);
    // 08:10 boards at 08:20 with 41 minutes of slack
    assert!(at(20) < 0.01);
    // 08:30 boards at 08:40 with 21 minutes of slack, about a third of rides are longer
    assert!(at(40) > 0.2 && at(40) < 0.5, "got {}", at(40));
    // 08:36 finds no bus any more
    assert_eq!(at(46), 1.0);
    assert_eq!(curve.last_safe_departure(), Some(hm(8, 15)));
    Ok(())
}

#[test]
fn simulated_run_is_reproducible_from_its_seed() -> Result<(), Error> {
    let _log_guard = init_test_logger();
    let first = run(&simulated_config(17))?;
    let second = run(&simulated_config(17))?;
    assert_eq!(first, second);
    assert_eq!(first.seed, Some(17));

    let Schedule::Departures(departures) = &first.schedule else {
        panic!("monte carlo runs work on departures");
    };
    // 07:00 to 09:00 every 10 minutes
    assert_eq!(departures.nb_of_buses(), 13);

    let Curve::Probabilities(curve) = &first.curve else {
        panic!("monte carlo runs produce probabilities");
    };
    assert_eq!(curve.points().len(), 46);
    assert!(curve.points().iter().all(|p| (0.0..=1.0).contains(&p.value)));
    Ok(())
}

#[test]
fn parallel_run_is_reproducible_from_its_seed() -> Result<(), Error> {
    let _log_guard = init_test_logger();
    let mut config = simulated_config(99);
    config.ride.parallel = true;
    assert_eq!(run(&config)?, run(&config)?);
    Ok(())
}

#[test]
fn invalid_configuration_aborts_before_writing() -> Result<(), Error> {
    let dir = tempfile::tempdir()?;
    let output = dir.path().join("late_probabilities.csv");

    let mut config = simulated_config(1);
    config.output = Some(output.clone());
    config.ride.trial_count = 0;
    assert!(run(&config).unwrap_err().is_configuration_error());

    let mut config = simulated_config(1);
    config.output = Some(output.clone());
    config.sweep.sweep_start = "08:50".to_string();
    assert!(run(&config).unwrap_err().is_configuration_error());

    let mut config = simulated_config(1);
    config.output = Some(output.clone());
    config.commute.walk_to_work = "-4m".to_string();
    assert!(run(&config).unwrap_err().is_configuration_error());

    assert!(!output.exists());
    Ok(())
}

#[test]
fn run_from_json_configuration() -> Result<(), Error> {
    let dir = tempfile::tempdir()?;
    let output = dir.path().join("curve.csv");
    let config_path = dir.path().join("config.json");
    std::fs::write(
        &config_path,
        serde_json::json!({
            "mode": "monte_carlo",
            "output": output,
            "sweep": { "sweep_start": "08:00", "sweep_end": "08:05" },
            "ride": { "trial_count": 20, "seed": 3 },
            "generator": { "jitter_bound": "0s" }
        })
        .to_string(),
    )?;

    let config = Config::from_json_file(&config_path)?;
    run(&config)?;

    let csv = std::fs::read_to_string(&output)?;
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("departure_time,late_probability"));
    let labels: Vec<&str> = lines.filter_map(|line| line.split(',').next()).collect();
    assert_eq!(labels, vec!["08:00", "08:01", "08:02", "08:03", "08:04", "08:05"]);
    Ok(())
}
