use std::time::Duration;

use serde::{Serialize, Serializer};

use crate::TimeOfDay;

/// Deterministic lateness outcome, persisted as `0` (on time) or `1` (late).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    OnTime,
    Late,
}

impl Outcome {
    pub fn is_late(self) -> bool {
        self == Outcome::Late
    }

    pub fn as_u8(self) -> u8 {
        match self {
            Outcome::OnTime => 0,
            Outcome::Late => 1,
        }
    }
}

impl Serialize for Outcome {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(self.as_u8())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurvePoint<V> {
    pub departure: TimeOfDay,
    pub value: V,
}

/// One persisted row of a result curve: `HH:MM` label and value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurveRow<V> {
    pub departure_time: String,
    pub late_probability: V,
}

impl<V: Copy> From<&CurvePoint<V>> for CurveRow<V> {
    fn from(point: &CurvePoint<V>) -> Self {
        Self {
            departure_time: point.departure.to_string(),
            late_probability: point.value,
        }
    }
}

/// Position of the first on-time → late junction of `outcomes`, as the index of its late entry.
///
/// Only the first junction counts, later ones are ignored even if the sequence is not monotonic.
pub fn first_late_after_safe(outcomes: &[Outcome]) -> Option<usize> {
    outcomes
        .windows(2)
        .position(|pair| pair == [Outcome::OnTime, Outcome::Late])
        .map(|pos| pos + 1)
}

/// Result of a deterministic sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct OutcomeCurve {
    points: Vec<CurvePoint<Outcome>>,
    boundary: Option<usize>,
}

impl OutcomeCurve {
    /// Builds the curve from sweep-ordered points and marks the safe/late boundary.
    ///
    /// When the sequence contains an on-time point directly followed by a late one, a synthetic
    /// late point labeled one second after the on-time departure is inserted between them. At
    /// most one such point is added.
    pub fn with_boundary(mut points: Vec<CurvePoint<Outcome>>) -> Self {
        let outcomes: Vec<Outcome> = points.iter().map(|point| point.value).collect();
        let boundary = first_late_after_safe(&outcomes);
        if let Some(idx) = boundary {
            let last_safe = points[idx - 1].departure;
            points.insert(
                idx,
                CurvePoint {
                    departure: last_safe + Duration::from_secs(1),
                    value: Outcome::Late,
                },
            );
        }
        Self { points, boundary }
    }

    pub fn points(&self) -> &[CurvePoint<Outcome>] {
        &self.points
    }

    /// Index of the synthetic boundary point, if one was inserted.
    pub fn boundary_index(&self) -> Option<usize> {
        self.boundary
    }

    /// Latest candidate departure that still arrives on time.
    pub fn last_safe_departure(&self) -> Option<TimeOfDay> {
        self.points
            .iter()
            .rev()
            .find(|point| !point.value.is_late())
            .map(|point| point.departure)
    }

    pub fn rows(&self) -> Vec<CurveRow<Outcome>> {
        self.points.iter().map(CurveRow::from).collect()
    }
}

/// Result of a Monte Carlo sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityCurve {
    points: Vec<CurvePoint<f64>>,
}

impl ProbabilityCurve {
    pub fn new(points: Vec<CurvePoint<f64>>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[CurvePoint<f64>] {
        &self.points
    }

    /// Latest candidate departure whose late probability is at most `max_risk`.
    pub fn last_departure_with_risk_at_most(&self, max_risk: f64) -> Option<TimeOfDay> {
        self.points
            .iter()
            .rev()
            .find(|point| point.value <= max_risk)
            .map(|point| point.departure)
    }

    pub fn last_safe_departure(&self) -> Option<TimeOfDay> {
        self.last_departure_with_risk_at_most(0.0)
    }

    pub fn rows(&self) -> Vec<CurveRow<f64>> {
        self.points.iter().map(CurveRow::from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::Outcome::{Late, OnTime};
    use super::*;

    fn curve_of(outcomes: &[Outcome]) -> OutcomeCurve {
        let points = outcomes
            .iter()
            .enumerate()
            .map(|(minute, &value)| CurvePoint {
                departure: TimeOfDay::from_hms(8, minute as u32, 0),
                value,
            })
            .collect();
        OutcomeCurve::with_boundary(points)
    }

    #[test]
    fn junction_index_points_at_first_late() {
        assert_eq!(first_late_after_safe(&[OnTime, OnTime, Late, Late]), Some(2));
        assert_eq!(first_late_after_safe(&[Late, OnTime, Late, OnTime, Late]), Some(2));
        assert_eq!(first_late_after_safe(&[OnTime, OnTime]), None);
        assert_eq!(first_late_after_safe(&[Late, Late]), None);
        assert_eq!(first_late_after_safe(&[Late, OnTime]), None);
        assert_eq!(first_late_after_safe(&[]), None);
    }

    #[test]
    fn boundary_point_sits_between_safe_and_late() {
        let curve = curve_of(&[OnTime, OnTime, Late]);
        assert_eq!(curve.points().len(), 4);
        assert_eq!(curve.boundary_index(), Some(2));

        let marker = curve.points()[2];
        assert_eq!(marker.departure, TimeOfDay::from_hms(8, 1, 1));
        assert_eq!(marker.value, Late);
        assert_eq!(curve.points()[3].departure, TimeOfDay::from_hms(8, 2, 0));
        assert!(curve.points().windows(2).all(|w| w[0].departure < w[1].departure));
    }

    #[test]
    fn only_first_junction_is_marked() {
        let curve = curve_of(&[OnTime, Late, OnTime, Late]);
        assert_eq!(curve.points().len(), 5);
        let synthetic = curve
            .points()
            .iter()
            .filter(|point| point.departure.seconds() % 60 != 0)
            .count();
        assert_eq!(synthetic, 1);
        assert_eq!(curve.last_safe_departure(), Some(TimeOfDay::from_hms(8, 2, 0)));
    }

    #[test]
    fn no_marker_without_junction() {
        assert_eq!(curve_of(&[OnTime, OnTime]).points().len(), 2);
        assert_eq!(curve_of(&[Late, Late]).points().len(), 2);
        assert_eq!(curve_of(&[Late, Late]).last_safe_departure(), None);
    }

    #[test]
    fn rows_are_labeled_by_minute() {
        let rows = curve_of(&[OnTime, Late]).rows();
        let labels: Vec<_> = rows.iter().map(|row| row.departure_time.as_str()).collect();
        assert_eq!(labels, vec!["08:00", "08:00", "08:01"]);
        assert_eq!(rows[1].late_probability, Late);
    }

    #[test]
    fn risk_threshold_lookup() {
        let curve = ProbabilityCurve::new(
            [0.0, 0.0, 0.1, 0.6, 1.0]
                .iter()
                .enumerate()
                .map(|(minute, &value)| CurvePoint {
                    departure: TimeOfDay::from_hms(8, minute as u32, 0),
                    value,
                })
                .collect(),
        );
        assert_eq!(curve.last_safe_departure(), Some(TimeOfDay::from_hms(8, 1, 0)));
        assert_eq!(
            curve.last_departure_with_risk_at_most(0.5),
            Some(TimeOfDay::from_hms(8, 2, 0))
        );
        assert_eq!(
            ProbabilityCurve::new(Vec::new()).last_safe_departure(),
            None
        );
    }
}
