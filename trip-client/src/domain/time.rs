//! Clock times for itinerary schedules.
//!
//! Plans carry times as "HH:MM" strings. A day's schedule is built by adding
//! stay and travel minutes to the day anchor, so a long day can run past
//! midnight. `ClockTime` keeps the total number of minutes since the anchor
//! day's midnight and only wraps when formatted, which lets callers tell
//! "01:00" from "01:00 the next day".

use std::fmt;
use std::ops::Add;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Minutes in one calendar day.
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Error returned when parsing an invalid time string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// A time of day on an itinerary, possibly past midnight.
///
/// # Examples
///
/// ```
/// use trip_client::domain::ClockTime;
///
/// let start = ClockTime::parse_hhmm("22:30").unwrap();
/// let later = start + 150;
/// assert_eq!(later.to_string(), "01:00");
/// assert_eq!(later.day_offset(), 1);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ClockTime {
    minutes: u32,
}

impl ClockTime {
    /// Midnight of the anchor day.
    pub const MIDNIGHT: Self = Self { minutes: 0 };

    /// Create a time from a minute count since the anchor day's midnight.
    pub const fn from_minutes(minutes: u32) -> Self {
        Self { minutes }
    }

    /// Create a time on the anchor day from hour and minute.
    pub fn from_hm(hour: u32, minute: u32) -> Result<Self, TimeError> {
        if hour > 23 {
            return Err(TimeError::new("hour must be 0-23"));
        }
        if minute > 59 {
            return Err(TimeError::new("minute must be 0-59"));
        }
        Ok(Self {
            minutes: hour * 60 + minute,
        })
    }

    /// Parse a time from "HH:MM" format.
    ///
    /// # Examples
    ///
    /// ```
    /// use trip_client::domain::ClockTime;
    ///
    /// assert!(ClockTime::parse_hhmm("00:00").is_ok());
    /// assert!(ClockTime::parse_hhmm("23:59").is_ok());
    ///
    /// assert!(ClockTime::parse_hhmm("0900").is_err());
    /// assert!(ClockTime::parse_hhmm("9:00").is_err());
    /// assert!(ClockTime::parse_hhmm("24:00").is_err());
    /// ```
    pub fn parse_hhmm(s: &str) -> Result<Self, TimeError> {
        if s.len() != 5 {
            return Err(TimeError::new("expected HH:MM format"));
        }

        let bytes = s.as_bytes();
        if bytes[2] != b':' {
            return Err(TimeError::new("expected colon at position 2"));
        }

        let hour =
            parse_two_digits(&bytes[0..2]).ok_or_else(|| TimeError::new("invalid hour digits"))?;
        let minute = parse_two_digits(&bytes[3..5])
            .ok_or_else(|| TimeError::new("invalid minute digits"))?;

        Self::from_hm(hour, minute)
    }

    /// Total minutes since the anchor day's midnight.
    pub fn minutes(&self) -> u32 {
        self.minutes
    }

    /// Hour of the wrapped clock time (0-23).
    pub fn hour(&self) -> u32 {
        (self.minutes % MINUTES_PER_DAY) / 60
    }

    /// Minute of the hour (0-59).
    pub fn minute(&self) -> u32 {
        self.minutes % 60
    }

    /// Number of midnights crossed since the anchor day.
    pub fn day_offset(&self) -> u32 {
        self.minutes / MINUTES_PER_DAY
    }

    /// The same clock reading on the anchor day.
    pub fn wrapped(&self) -> Self {
        Self {
            minutes: self.minutes % MINUTES_PER_DAY,
        }
    }

    /// Add minutes, returning `None` on overflow.
    pub fn checked_add_minutes(self, minutes: u32) -> Option<Self> {
        self.minutes.checked_add(minutes).map(Self::from_minutes)
    }

    /// Signed minutes from `earlier` to `self`.
    pub fn minutes_since(&self, earlier: ClockTime) -> i64 {
        i64::from(self.minutes) - i64::from(earlier.minutes)
    }

    /// The wrapped clock reading as a chrono time.
    pub fn to_naive_time(&self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hour(), self.minute(), 0).unwrap_or(NaiveTime::MIN)
    }
}

impl From<NaiveTime> for ClockTime {
    fn from(time: NaiveTime) -> Self {
        Self {
            minutes: time.hour() * 60 + time.minute(),
        }
    }
}

impl Add<u32> for ClockTime {
    type Output = Self;

    fn add(self, rhs: u32) -> Self::Output {
        Self {
            minutes: self.minutes.saturating_add(rhs),
        }
    }
}

impl fmt::Debug for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ClockTime({:02}:{:02}+{})",
            self.hour(),
            self.minute(),
            self.day_offset()
        )
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl Serialize for ClockTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        ClockTime::parse_hhmm(&s).map_err(serde::de::Error::custom)
    }
}

/// Parse two ASCII digit bytes into a u32.
fn parse_two_digits(bytes: &[u8]) -> Option<u32> {
    if bytes.len() != 2 {
        return None;
    }
    let d1 = (bytes[0] as char).to_digit(10)?;
    let d2 = (bytes[1] as char).to_digit(10)?;
    Some(d1 * 10 + d2)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> ClockTime {
        ClockTime::parse_hhmm(s).unwrap()
    }

    #[test]
    fn parse_valid_times() {
        let time = t("00:00");
        assert_eq!(time.hour(), 0);
        assert_eq!(time.minute(), 0);

        let time = t("23:59");
        assert_eq!(time.hour(), 23);
        assert_eq!(time.minute(), 59);
        assert_eq!(time.minutes(), 23 * 60 + 59);
    }

    #[test]
    fn parse_invalid_format() {
        assert!(ClockTime::parse_hhmm("").is_err());
        assert!(ClockTime::parse_hhmm("9:00").is_err());
        assert!(ClockTime::parse_hhmm("09-00").is_err());
        assert!(ClockTime::parse_hhmm("0900").is_err());
        assert!(ClockTime::parse_hhmm("09:000").is_err());
        assert!(ClockTime::parse_hhmm("ab:cd").is_err());
    }

    #[test]
    fn parse_invalid_values() {
        assert!(ClockTime::parse_hhmm("24:00").is_err());
        assert!(ClockTime::parse_hhmm("12:60").is_err());
        assert!(ClockTime::from_hm(25, 0).is_err());
    }

    #[test]
    fn display_is_zero_padded() {
        assert_eq!(t("09:05").to_string(), "09:05");
        assert_eq!(ClockTime::from_minutes(65).to_string(), "01:05");
    }

    #[test]
    fn adding_minutes() {
        assert_eq!((t("09:00") + 60).to_string(), "10:00");
        assert_eq!((t("09:00") + 0), t("09:00"));
    }

    #[test]
    fn crossing_midnight_wraps_with_day_offset() {
        let late = t("23:30") + 45;
        assert_eq!(late.to_string(), "00:15");
        assert_eq!(late.day_offset(), 1);
        assert_eq!(late.wrapped(), t("00:15"));
        assert!(late > t("23:30"));
    }

    #[test]
    fn minutes_between() {
        assert_eq!(t("10:20").minutes_since(t("09:00")), 80);
        assert_eq!(t("09:00").minutes_since(t("10:20")), -80);
    }

    #[test]
    fn naive_time_conversion() {
        let time = t("14:30");
        assert_eq!(ClockTime::from(time.to_naive_time()), time);
    }

    #[test]
    fn serde_as_hhmm_string() {
        let json = serde_json::to_string(&t("08:05")).unwrap();
        assert_eq!(json, "\"08:05\"");

        let back: ClockTime = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t("08:05"));

        assert!(serde_json::from_str::<ClockTime>("\"8:05\"").is_err());
    }

    #[test]
    fn debug_shows_offset() {
        let late = t("23:00") + 120;
        assert_eq!(format!("{late:?}"), "ClockTime(01:00+1)");
    }
}
