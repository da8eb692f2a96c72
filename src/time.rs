use std::fmt::{Display, Formatter};
use std::ops::Add;
use std::str::FromStr;
use std::time::Duration;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::Error;

/// A wall clock instant on the service day, stored as seconds since the anchor day's midnight.
///
/// Every time of day handled by the crate is anchored to the same (arbitrary) day, so ordering
/// and arithmetic are always well defined. Values past 24:00:00 are allowed, as in GTFS feeds,
/// which means that adding a duration never wraps around midnight.
#[derive(Debug, Eq, PartialEq, Clone, Copy, Ord, PartialOrd, Hash)]
pub struct TimeOfDay {
    seconds: u32,
}

impl TimeOfDay {
    pub const MIDNIGHT: TimeOfDay = TimeOfDay { seconds: 0 };

    pub const fn from_seconds(seconds: u32) -> Self {
        Self { seconds }
    }

    pub const fn from_hms(hours: u32, minutes: u32, seconds: u32) -> Self {
        Self {
            seconds: seconds + 60 * minutes + 60 * 60 * hours,
        }
    }

    pub fn seconds(&self) -> u32 {
        self.seconds
    }

    /// Shift by a signed number of seconds. Saturates at the anchor midnight and at `u32::MAX`.
    pub fn saturating_add_signed(self, offset_seconds: i64) -> Self {
        let shifted = i64::from(self.seconds).saturating_add(offset_seconds);
        Self {
            seconds: shifted.clamp(0, i64::from(u32::MAX)) as u32,
        }
    }

    /// Signed number of seconds from `earlier` to `self`.
    pub fn seconds_since(&self, earlier: TimeOfDay) -> i64 {
        i64::from(self.seconds) - i64::from(earlier.seconds)
    }

    /// `HH:MM:SS`, hours may exceed 23.
    pub fn to_hms_string(&self) -> String {
        let (hours, minutes, seconds) = self.split();
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    }

    fn split(&self) -> (u32, u32, u32) {
        let hours = self.seconds / (60 * 60);
        let minutes_in_secs = self.seconds % (60 * 60);
        (hours, minutes_in_secs / 60, minutes_in_secs % 60)
    }
}

/// A partial second counts as a whole one, so a shifted instant is never earlier than the exact
/// one.
impl Add<Duration> for TimeOfDay {
    type Output = TimeOfDay;

    fn add(self, rhs: Duration) -> TimeOfDay {
        let whole_seconds = rhs.as_secs().saturating_add(u64::from(rhs.subsec_nanos() > 0));
        let seconds = i64::try_from(whole_seconds).unwrap_or(i64::MAX);
        self.saturating_add_signed(seconds)
    }
}

/// Formats as `HH:MM`, the label used for result curves.
impl Display for TimeOfDay {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let (hours, minutes, _) = self.split();
        write!(f, "{hours:02}:{minutes:02}")
    }
}

/// Accepts `HH:MM` or `HH:MM:SS`. Hours past 23 denote the following days, as in GTFS feeds,
/// so every label produced by `Display` or [`TimeOfDay::to_hms_string`] parses back.
impl FromStr for TimeOfDay {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || {
            Error::invalid_configuration(format!(
                "'{s}' is not a time of day, expected HH:MM or HH:MM:SS"
            ))
        };
        let trimmed = s.trim();
        let format = match trimmed.matches(':').count() {
            1 => "%H:%M",
            2 => "%H:%M:%S",
            _ => return Err(malformed()),
        };
        let (hours, rest) = trimmed.split_once(':').ok_or_else(malformed)?;
        if hours.is_empty() || !hours.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
        let hours: u32 = hours.parse().map_err(|_| malformed())?;

        // chrono only knows a single day, the whole days are added back afterwards
        let within_day = format!("{:02}:{rest}", hours % 24);
        let time = NaiveTime::parse_from_str(&within_day, format).map_err(|source| {
            Error::InvalidTime {
                input: s.to_string(),
                source,
            }
        })?;
        (hours / 24)
            .checked_mul(24 * 60 * 60)
            .and_then(|days| days.checked_add(time.num_seconds_from_midnight()))
            .map(Self::from_seconds)
            .ok_or_else(malformed)
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
