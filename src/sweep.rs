use std::time::Duration;

use crate::{Error, Result, TimeOfDay};

pub const DEFAULT_SWEEP_STEP: Duration = Duration::from_secs(60);

/// Candidate home departures: `start`, `start + step`, ... up to `end` included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepWindow {
    start: TimeOfDay,
    end: TimeOfDay,
    step_seconds: u32,
}

impl SweepWindow {
    /// Minute by minute window.
    pub fn new(start: TimeOfDay, end: TimeOfDay) -> Result<Self> {
        Self::with_step(start, end, DEFAULT_SWEEP_STEP)
    }

    pub fn with_step(start: TimeOfDay, end: TimeOfDay, step: Duration) -> Result<Self> {
        if start > end {
            return Err(Error::invalid_configuration(format!(
                "sweep start {} is after sweep end {}",
                start.to_hms_string(),
                end.to_hms_string()
            )));
        }
        let step_seconds = u32::try_from(step.as_secs())
            .ok()
            .filter(|&s| s > 0)
            .ok_or_else(|| {
                Error::invalid_configuration(format!(
                    "sweep step must be a positive number of seconds, got {step:?}"
                ))
            })?;
        Ok(Self {
            start,
            end,
            step_seconds,
        })
    }

    pub fn start(&self) -> TimeOfDay {
        self.start
    }

    pub fn end(&self) -> TimeOfDay {
        self.end
    }

    pub fn nb_of_candidates(&self) -> usize {
        (self.end.seconds_since(self.start) / i64::from(self.step_seconds)) as usize + 1
    }

    pub fn candidates(&self) -> impl ExactSizeIterator<Item = TimeOfDay> + '_ {
        (0..self.nb_of_candidates()).map(move |idx| {
            TimeOfDay::from_seconds(self.start.seconds() + idx as u32 * self.step_seconds)
        })
    }
}
