use crate::{TimeOfDay, Timetable};

/// One bus ride between the two stops of interest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Trip {
    pub departure: TimeOfDay,
    pub arrival: TimeOfDay,
}

impl Trip {
    pub fn new(departure: TimeOfDay, arrival: TimeOfDay) -> Self {
        Self {
            departure,
            arrival,
        }
    }
}

/// Departure instants only, the ride duration being modeled separately.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DepartureTimetable {
    departures: Vec<TimeOfDay>,
}

impl DepartureTimetable {
    /// Entries may come in any order, they are sorted here.
    pub fn new(mut departures: Vec<TimeOfDay>) -> Self {
        departures.sort_unstable();
        Self { departures }
    }

    pub fn departures(&self) -> &[TimeOfDay] {
        &self.departures
    }
}

impl FromIterator<TimeOfDay> for DepartureTimetable {
    fn from_iter<I: IntoIterator<Item = TimeOfDay>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl Timetable for DepartureTimetable {
    type Bus = TimeOfDay;

    fn get_earliest_bus(&self, at: TimeOfDay) -> Option<Self::Bus> {
        let pos = self.departures.partition_point(|&dep| dep < at);
        self.departures.get(pos).copied()
    }

    fn get_departure_time(&self, bus: Self::Bus) -> TimeOfDay {
        bus
    }

    fn nb_of_buses(&self) -> usize {
        self.departures.len()
    }
}

/// (departure, arrival) pairs, sorted by departure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TripTimetable {
    trips: Vec<Trip>,
}

impl TripTimetable {
    pub fn new(mut trips: Vec<Trip>) -> Self {
        trips.sort_unstable();
        Self { trips }
    }

    pub fn trips(&self) -> &[Trip] {
        &self.trips
    }

    /// Forget arrivals, e.g. to run the ride time model on a static feed.
    pub fn to_departures(&self) -> DepartureTimetable {
        self.trips.iter().map(|trip| trip.departure).collect()
    }
}

impl FromIterator<Trip> for TripTimetable {
    fn from_iter<I: IntoIterator<Item = Trip>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl Timetable for TripTimetable {
    type Bus = Trip;

    fn get_earliest_bus(&self, at: TimeOfDay) -> Option<Self::Bus> {
        // Binary search for first departure >= at
        let pos = self.trips.partition_point(|trip| trip.departure < at);
        self.trips.get(pos).copied()
    }

    fn get_departure_time(&self, bus: Self::Bus) -> TimeOfDay {
        bus.departure
    }

    fn nb_of_buses(&self) -> usize {
        self.trips.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hm(hours: u32, minutes: u32) -> TimeOfDay {
        TimeOfDay::from_hms(hours, minutes, 0)
    }

    #[test]
    fn earliest_bus_is_inclusive() {
        let timetable = DepartureTimetable::new(vec![hm(8, 20), hm(8, 0), hm(8, 10)]);
        assert_eq!(timetable.departures(), &[hm(8, 0), hm(8, 10), hm(8, 20)]);

        assert_eq!(timetable.get_earliest_bus(hm(7, 0)), Some(hm(8, 0)));
        assert_eq!(timetable.get_earliest_bus(hm(8, 10)), Some(hm(8, 10)));
        assert_eq!(
            timetable.get_earliest_bus(TimeOfDay::from_hms(8, 10, 1)),
            Some(hm(8, 20))
        );
        assert_eq!(timetable.get_earliest_bus(TimeOfDay::from_hms(8, 20, 1)), None);
    }

    #[test]
    fn trips_are_sorted_by_departure() {
        let timetable: TripTimetable = [
            Trip::new(hm(8, 30), hm(8, 50)),
            Trip::new(hm(8, 10), hm(8, 30)),
        ]
        .into_iter()
        .collect();

        let next = timetable.get_earliest_bus(hm(8, 0)).unwrap();
        assert_eq!(next, Trip::new(hm(8, 10), hm(8, 30)));
        assert_eq!(timetable.get_departure_time(next), hm(8, 10));
        assert_eq!(timetable.to_departures().departures(), &[hm(8, 10), hm(8, 30)]);
    }

    #[test]
    fn empty_timetable_has_no_bus() {
        let timetable = TripTimetable::default();
        assert!(timetable.is_empty());
        assert_eq!(timetable.get_earliest_bus(TimeOfDay::MIDNIGHT), None);
    }
}
