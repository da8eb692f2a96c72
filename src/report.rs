use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::{CurveRow, Result};

pub const CSV_HEADER: [&str; 2] = ["departure_time", "late_probability"];

/// Two column CSV: `departure_time` (`HH:MM`) and `late_probability`.
/// The header is written even for an empty curve.
pub fn write_csv<W, V>(writer: W, rows: &[CurveRow<V>]) -> Result<()>
where
    W: Write,
    V: Serialize,
{
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv_writer.write_record(CSV_HEADER)?;
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Same as [`write_csv`], creating missing parent directories of `path`.
pub fn write_csv_file<V: Serialize>(path: &Path, rows: &[CurveRow<V>]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    write_csv(File::create(path)?, rows)?;
    info!("results saved to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CurvePoint, Outcome, OutcomeCurve, ProbabilityCurve, TimeOfDay};

    fn csv_of<V: Serialize>(rows: &[CurveRow<V>]) -> String {
        let mut buffer = Vec::new();
        write_csv(&mut buffer, rows).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn outcomes_are_written_as_integers() {
        let curve = OutcomeCurve::with_boundary(vec![
            CurvePoint {
                departure: TimeOfDay::from_hms(8, 0, 0),
                value: Outcome::OnTime,
            },
            CurvePoint {
                departure: TimeOfDay::from_hms(8, 1, 0),
                value: Outcome::Late,
            },
        ]);
        assert_eq!(
            csv_of(&curve.rows()),
            "departure_time,late_probability\n08:00,0\n08:00,1\n08:01,1\n"
        );
    }

    #[test]
    fn probabilities_are_written_as_floats() {
        let curve = ProbabilityCurve::new(vec![CurvePoint {
            departure: TimeOfDay::from_hms(8, 30, 0),
            value: 0.25,
        }]);
        assert_eq!(
            csv_of(&curve.rows()),
            "departure_time,late_probability\n08:30,0.25\n"
        );
    }

    #[test]
    fn empty_curve_keeps_header() {
        let rows: Vec<CurveRow<f64>> = Vec::new();
        assert_eq!(csv_of(&rows), "departure_time,late_probability\n");
    }

    #[test]
    fn file_writer_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("processed").join("late_probabilities.csv");
        let rows = vec![CurveRow {
            departure_time: "08:00".to_string(),
            late_probability: 1.0,
        }];
        write_csv_file(&path, &rows).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("departure_time,late_probability\n08:00,"));
    }
}
