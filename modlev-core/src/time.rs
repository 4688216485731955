//! Decoding of CF-style time axes
//!
//! Archive time coordinates are stored as numeric offsets from a reference date,
//! described by a units string such as `"hours since 2007-3-1 00:00:00"`.

use crate::errors::{ModLevError, ModLevResult};
use crate::FloatValue;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use std::str::FromStr;

/// Unit of the offsets on a time axis
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TimeUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    fn seconds(&self) -> FloatValue {
        match self {
            TimeUnit::Seconds => 1.0,
            TimeUnit::Minutes => 60.0,
            TimeUnit::Hours => 3600.0,
            TimeUnit::Days => 86400.0,
        }
    }
}

impl FromStr for TimeUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "seconds" | "second" | "secs" | "sec" | "s" => Ok(TimeUnit::Seconds),
            "minutes" | "minute" | "mins" | "min" => Ok(TimeUnit::Minutes),
            "hours" | "hour" | "hrs" | "hr" | "h" => Ok(TimeUnit::Hours),
            "days" | "day" | "d" => Ok(TimeUnit::Days),
            other => Err(format!("unknown time unit {:?}", other)),
        }
    }
}

/// Parsed `"<unit> since <reference>"` description of a time axis
///
/// # Examples
///
/// ```rust
/// use modlev_core::time::TimeAxisUnits;
/// use chrono::NaiveDate;
///
/// let units: TimeAxisUnits = "hours since 2007-3-1 00:00:00".parse().unwrap();
/// let time = units.decode(30.0).unwrap();
/// assert_eq!(time, NaiveDate::from_ymd_opt(2007, 3, 2).unwrap().and_hms_opt(6, 0, 0).unwrap());
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TimeAxisUnits {
    pub unit: TimeUnit,
    pub reference: NaiveDateTime,
}

impl TimeAxisUnits {
    pub fn parse(units: &str) -> ModLevResult<Self> {
        let invalid = |reason: String| ModLevError::InvalidTimeUnits {
            units: units.to_string(),
            reason,
        };

        let mut tokens = units.split_whitespace();
        let unit = tokens
            .next()
            .ok_or_else(|| invalid("empty units string".to_string()))?
            .parse::<TimeUnit>()
            .map_err(invalid)?;
        match tokens.next() {
            Some(word) if word.eq_ignore_ascii_case("since") => {}
            _ => return Err(invalid("expected \"<unit> since <date>\"".to_string())),
        }

        let date_token = tokens
            .next()
            .ok_or_else(|| invalid("missing reference date".to_string()))?;
        // ISO 8601 "2007-03-01T00:00:00" carries the time in the same token
        let (date_part, mut time_part) = match date_token.split_once('T') {
            Some((date, time)) => (date, Some(time)),
            None => (date_token, None),
        };
        if time_part.is_none() {
            time_part = tokens.next();
        }
        for extra in tokens {
            if !matches!(extra, "UTC" | "utc" | "Z" | "+00:00" | "+0:00" | "GMT") {
                return Err(invalid(format!("unsupported trailing token {:?}", extra)));
            }
        }

        let date = parse_date(date_part).map_err(invalid)?;
        let time = match time_part {
            Some(time) => parse_time(time.trim_end_matches('Z')).map_err(invalid)?,
            None => NaiveTime::MIN,
        };

        Ok(Self {
            unit,
            reference: date.and_time(time),
        })
    }

    /// Absolute timestamp of an offset along the axis
    ///
    /// Offsets are resolved to the nearest millisecond.
    pub fn decode(&self, offset: FloatValue) -> ModLevResult<NaiveDateTime> {
        let invalid = |reason: String| ModLevError::InvalidTimeUnits {
            units: format!("{:?} since {}", self.unit, self.reference),
            reason,
        };
        let milliseconds = (offset * self.unit.seconds() * 1000.0).round();
        // Duration is limited to i64 milliseconds, far beyond any calendar date
        if !milliseconds.is_finite() || milliseconds.abs() > 1.0e17 {
            return Err(invalid(format!("offset {} is out of range", offset)));
        }
        self.reference
            .checked_add_signed(Duration::milliseconds(milliseconds as i64))
            .ok_or_else(|| invalid(format!("offset {} is out of range", offset)))
    }
}

impl FromStr for TimeAxisUnits {
    type Err = ModLevError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Decode all offsets of a time axis to timestamps
pub fn decode_time_axis(units: &str, offsets: &[FloatValue]) -> ModLevResult<Vec<NaiveDateTime>> {
    let units = TimeAxisUnits::parse(units)?;
    offsets.iter().map(|&offset| units.decode(offset)).collect()
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    let parts: Vec<&str> = value.split('-').collect();
    if parts.len() != 3 {
        return Err(format!("reference date {:?} is not year-month-day", value));
    }
    let number = |part: &str| {
        part.parse::<u32>()
            .map_err(|_| format!("invalid number {:?} in reference date", part))
    };
    let year = parts[0]
        .parse::<i32>()
        .map_err(|_| format!("invalid year {:?} in reference date", parts[0]))?;
    NaiveDate::from_ymd_opt(year, number(parts[1])?, number(parts[2])?)
        .ok_or_else(|| format!("reference date {:?} does not exist", value))
}

fn parse_time(value: &str) -> Result<NaiveTime, String> {
    let parts: Vec<&str> = value.split(':').collect();
    if parts.is_empty() || parts.len() > 3 {
        return Err(format!("reference time {:?} is not hour:minute:second", value));
    }
    let number = |part: &str| {
        part.parse::<u32>()
            .map_err(|_| format!("invalid number {:?} in reference time", part))
    };
    let hour = number(parts[0])?;
    let minute = parts.get(1).map(|p| number(p)).transpose()?.unwrap_or(0);
    let second = match parts.get(2) {
        Some(p) => {
            let seconds = p
                .parse::<FloatValue>()
                .map_err(|_| format!("invalid seconds {:?} in reference time", p))?;
            if !(seconds.is_finite() && (0.0..60.0).contains(&seconds)) {
                return Err(format!("seconds {:?} out of range in reference time", p));
            }
            // Fractional seconds such as "00.0" are truncated
            seconds.trunc() as u32
        }
        None => 0,
    };
    NaiveTime::from_hms_opt(hour, minute, second)
        .ok_or_else(|| format!("reference time {:?} does not exist", value))
}
