use crate::types::{PulseError, Result};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// History window offered by the range selector; its `as_str` form is the
/// `{duration}` segment of the REST paths.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TimeRange {
    OneHour,
    SixHours,
    TwelveHours,
    #[default]
    OneDay,
    SevenDays,
    ThirtyDays,
    OneYear,
}

impl TimeRange {
    pub const ALL: [TimeRange; 7] = [
        Self::OneHour,
        Self::SixHours,
        Self::TwelveHours,
        Self::OneDay,
        Self::SevenDays,
        Self::ThirtyDays,
        Self::OneYear,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OneHour => "1h",
            Self::SixHours => "6h",
            Self::TwelveHours => "12h",
            Self::OneDay => "24h",
            Self::SevenDays => "7d",
            Self::ThirtyDays => "30d",
            Self::OneYear => "1y",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::OneHour => "1 Hour",
            Self::SixHours => "6 Hours",
            Self::TwelveHours => "12 Hours",
            Self::OneDay => "24 Hours",
            Self::SevenDays => "7 Days",
            Self::ThirtyDays => "30 Days",
            Self::OneYear => "1 Year",
        }
    }

    /// Window length. A year counts as 365 days.
    pub fn duration(&self) -> Duration {
        const HOUR: u64 = 3600;
        const DAY: u64 = 24 * HOUR;
        Duration::from_secs(match self {
            Self::OneHour => HOUR,
            Self::SixHours => 6 * HOUR,
            Self::TwelveHours => 12 * HOUR,
            Self::OneDay => DAY,
            Self::SevenDays => 7 * DAY,
            Self::ThirtyDays => 30 * DAY,
            Self::OneYear => 365 * DAY,
        })
    }
}

impl FromStr for TimeRange {
    type Err = PulseError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|range| range.as_str() == s)
            .ok_or_else(|| PulseError::InvalidDuration(s.to_string()))
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses `<digits><unit>` where unit is one of `ms`, `s`, `m`, `h`, `d`.
pub fn parse_duration(input: &str) -> Result<Duration> {
    let invalid = || PulseError::InvalidDuration(input.to_string());

    let split = input
        .find(|c: char| !c.is_ascii_digit())
        .ok_or_else(invalid)?;
    let (digits, unit) = input.split_at(split);
    if digits.is_empty() {
        return Err(invalid());
    }

    let value: u64 = digits.parse().map_err(|_| invalid())?;
    let millis_per_unit: u64 = match unit {
        "ms" => 1,
        "s" => 1_000,
        "m" => 60_000,
        "h" => 3_600_000,
        "d" => 86_400_000,
        _ => return Err(invalid()),
    };

    value
        .checked_mul(millis_per_unit)
        .map(Duration::from_millis)
        .ok_or_else(invalid)
}
