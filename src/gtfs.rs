use std::collections::HashSet;

use gtfs_structures::{Gtfs, StopTime};
use smallvec::SmallVec;
use tracing::{debug, info, warn};

use crate::{Result, TimeOfDay, Trip, TripTimetable};

/// Stop ids whose name matched a pattern; a stop name usually maps to a handful of platforms.
type StopIds<'a> = SmallVec<[&'a str; 4]>;

/// Which rides of a static feed make up the commuter's schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineFilter {
    /// `route_short_name` of the line, e.g. `8`
    pub line: String,
    /// case-insensitive substring of the boarding stop name
    pub origin: String,
    /// case-insensitive substring of the alighting stop name
    pub destination: String,
    pub window_start: TimeOfDay,
    pub window_end: TimeOfDay,
}

impl Default for LineFilter {
    fn default() -> Self {
        Self {
            line: "8".to_string(),
            origin: "Zoo".to_string(),
            destination: "Toompark".to_string(),
            window_start: TimeOfDay::from_hms(7, 0, 0),
            window_end: TimeOfDay::from_hms(9, 0, 0),
        }
    }
}

/// Reads a feed from a zip archive, an extracted directory or an URL.
pub fn load_gtfs(path: &str) -> Result<Gtfs> {
    let gtfs = Gtfs::new(path)?;
    info!(
        "loaded GTFS feed {} ({} routes, {} trips, {} stops)",
        path,
        gtfs.routes.len(),
        gtfs.trips.len(),
        gtfs.stops.len()
    );
    Ok(gtfs)
}

impl TripTimetable {
    pub fn from_gtfs_path(path: &str, filter: &LineFilter) -> Result<Self> {
        let gtfs = load_gtfs(path)?;
        Ok(Self::from_gtfs(&gtfs, filter))
    }

    /// Weekday rides of `filter.line` from the origin stop to the destination stop, departing
    /// within the filter's window.
    pub fn from_gtfs(gtfs: &Gtfs, filter: &LineFilter) -> Self {
        // Phase 1: services running every weekday and never on weekends
        let weekday_services = Self::weekday_services(gtfs);

        // Phase 2: routes of the line
        let routes = Self::line_routes(gtfs, &filter.line);
        if routes.is_empty() {
            warn!("route '{}' not found in the feed", filter.line);
            return Self::default();
        }
        info!("found {} route(s) for line {}", routes.len(), filter.line);

        // Phase 3: candidate boarding and alighting stops
        let origin_ids = Self::stops_named(gtfs, &filter.origin);
        let destination_ids = Self::stops_named(gtfs, &filter.destination);
        debug!("{} stop ids: {:?}", filter.origin, origin_ids);
        debug!("{} stop ids: {:?}", filter.destination, destination_ids);

        // Phase 4: extract rides in the right direction
        let mut nb_of_line_trips = 0;
        let trips: Vec<Trip> = gtfs
            .trips
            .values()
            .filter(|trip| {
                routes.contains(trip.route_id.as_str())
                    && weekday_services.contains(trip.service_id.as_str())
            })
            .inspect(|_| nb_of_line_trips += 1)
            .filter_map(|trip| Self::ride_between(&trip.stop_times, &origin_ids, &destination_ids))
            .filter(|ride| filter.window_start <= ride.departure && ride.departure <= filter.window_end)
            .collect();

        if nb_of_line_trips == 0 {
            warn!("no weekday trips found for line {}", filter.line);
        }
        info!(
            "found {} valid {} -> {} trips between {} and {}",
            trips.len(),
            filter.origin,
            filter.destination,
            filter.window_start,
            filter.window_end
        );

        Self::new(trips)
    }

    fn weekday_services(gtfs: &Gtfs) -> HashSet<&str> {
        gtfs.calendar
            .values()
            .filter(|c| {
                c.monday && c.tuesday && c.wednesday && c.thursday && c.friday && !c.saturday && !c.sunday
            })
            .map(|c| c.id.as_str())
            .collect()
    }

    fn line_routes<'a>(gtfs: &'a Gtfs, line: &str) -> HashSet<&'a str> {
        gtfs.routes
            .values()
            .filter(|route| route.short_name.as_deref() == Some(line))
            .map(|route| route.id.as_str())
            .collect()
    }

    fn stops_named<'a>(gtfs: &'a Gtfs, pattern: &str) -> StopIds<'a> {
        let mut ids: StopIds<'a> = gtfs
            .stops
            .values()
            .filter(|stop| stop.name.as_deref().is_some_and(|name| name_matches(name, pattern)))
            .map(|stop| stop.id.as_str())
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// Departure at the first origin stop and arrival at the first destination stop of a trip,
    /// provided the origin comes first and both times are known.
    fn ride_between(stop_times: &[StopTime], origin_ids: &[&str], destination_ids: &[&str]) -> Option<Trip> {
        // Sort stop_times by sequence
        let mut sorted_stop_times: Vec<&StopTime> = stop_times.iter().collect();
        sorted_stop_times.sort_by_key(|st| st.stop_sequence);

        let origin = first_stop_among(&sorted_stop_times, origin_ids)?;
        let destination = first_stop_among(&sorted_stop_times, destination_ids)?;
        if origin >= destination {
            return None;
        }

        let departure = sorted_stop_times[origin].departure_time?;
        let arrival = sorted_stop_times[destination].arrival_time?;
        Some(Trip::new(
            TimeOfDay::from_seconds(departure),
            TimeOfDay::from_seconds(arrival),
        ))
    }
}

fn first_stop_among(sorted_stop_times: &[&StopTime], ids: &[&str]) -> Option<usize> {
    sorted_stop_times
        .iter()
        .position(|st| ids.contains(&st.stop.id.as_str()))
}

fn name_matches(name: &str, pattern: &str) -> bool {
    name.to_lowercase().contains(&pattern.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::name_matches;

    #[test]
    fn stop_names_match_ignoring_case() {
        assert!(name_matches("Zoo", "zoo"));
        assert!(name_matches("Loomaaed / ZOO", "Zoo"));
        assert!(name_matches("Toompark", "toompark"));
        assert!(!name_matches("Zoological garden east", "Toompark"));
    }
}
