//! Timestamps and their three wire formats.
//!
//! ## Notes
//!
//! - `Instant` stores whole seconds since the Unix epoch plus a sub-second nanosecond part, so values before 1970
//!   keep a non-negative nanosecond component (`-1.5` is `-2` seconds + `500_000_000` ns).
//! - `http-date` is the IMF-fixdate form of RFC 7231 (`Sun, 06 Nov 1994 08:49:37 GMT`) and never carries fractions.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};

/// Wire representation of a timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// RFC 3339 `date-time` (`1985-04-12T23:20:50.52Z`).
    DateTime,
    /// RFC 7231 IMF-fixdate.
    HttpDate,
    /// Seconds since the epoch, optionally fractional.
    EpochSeconds,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Format::DateTime => "date-time",
            Format::HttpDate => "http-date",
            Format::EpochSeconds => "epoch-seconds",
        };
        f.write_str(name)
    }
}

/// Failure to read a timestamp in the requested format.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("failed to parse `{input}` as {format}: {reason}")]
pub struct ParseError {
    input: String,
    format: Format,
    reason: String,
}

impl ParseError {
    fn new(input: &str, format: Format, reason: impl fmt::Display) -> Self {
        ParseError {
            input: input.to_string(),
            format,
            reason: reason.to_string(),
        }
    }
}

/// A point in time with nanosecond precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Instant {
    seconds: i64,
    subsecond_nanos: u32,
}

const NANOS_PER_SECOND: u32 = 1_000_000_000;

impl Instant {
    pub fn from_epoch_seconds(seconds: i64) -> Self {
        Instant {
            seconds,
            subsecond_nanos: 0,
        }
    }

    /// Build from whole seconds and a nanosecond part; nanoseconds past one second carry into `seconds`.
    pub fn from_secs_and_nanos(seconds: i64, subsecond_nanos: u32) -> Self {
        Instant {
            seconds: seconds + i64::from(subsecond_nanos / NANOS_PER_SECOND),
            subsecond_nanos: subsecond_nanos % NANOS_PER_SECOND,
        }
    }

    pub fn from_f64(epoch_seconds: f64) -> Self {
        let seconds = epoch_seconds.floor();
        let nanos = ((epoch_seconds - seconds) * f64::from(NANOS_PER_SECOND)).round() as u32;
        Instant::from_secs_and_nanos(seconds as i64, nanos)
    }

    pub fn epoch_seconds(&self) -> i64 {
        self.seconds
    }

    pub fn epoch_subsecond_nanos(&self) -> u32 {
        self.subsecond_nanos
    }

    pub fn has_nanos(&self) -> bool {
        self.subsecond_nanos != 0
    }

    pub fn epoch_fractional_seconds(&self) -> f64 {
        self.seconds as f64 + f64::from(self.subsecond_nanos) / f64::from(NANOS_PER_SECOND)
    }

    /// Parse a wire value in `format`.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(input: &str, format: Format) -> Result<Self, ParseError> {
        match format {
            Format::EpochSeconds => {
                if let Ok(seconds) = input.parse::<i64>() {
                    return Ok(Instant::from_epoch_seconds(seconds));
                }
                let value = input
                    .parse::<f64>()
                    .map_err(|err| ParseError::new(input, format, err))?;
                if !value.is_finite() {
                    return Err(ParseError::new(input, format, "value is not finite"));
                }
                Ok(Instant::from_f64(value))
            }
            Format::DateTime => DateTime::parse_from_rfc3339(input)
                .map(|parsed| Instant::from_datetime(parsed.with_timezone(&Utc)))
                .map_err(|err| ParseError::new(input, format, err)),
            Format::HttpDate => DateTime::parse_from_rfc2822(input)
                .map(|parsed| Instant::from_datetime(parsed.with_timezone(&Utc)))
                .map_err(|err| ParseError::new(input, format, err)),
        }
    }

    /// Render in `format`.
    pub fn fmt(&self, format: Format) -> String {
        match format {
            Format::EpochSeconds => self.fmt_epoch_seconds(),
            Format::DateTime => match self.to_datetime() {
                Some(datetime) => datetime.to_rfc3339_opts(SecondsFormat::AutoSi, true),
                None => self.fmt_epoch_seconds(),
            },
            Format::HttpDate => match self.to_datetime() {
                Some(datetime) => datetime.format("%a, %d %b %Y %H:%M:%S GMT").to_string(),
                None => self.fmt_epoch_seconds(),
            },
        }
    }

    fn fmt_epoch_seconds(&self) -> String {
        if !self.has_nanos() {
            return self.seconds.to_string();
        }
        let (whole, nanos, sign) = if self.seconds < 0 {
            (-(self.seconds + 1), NANOS_PER_SECOND - self.subsecond_nanos, "-")
        } else {
            (self.seconds, self.subsecond_nanos, "")
        };
        let fraction = format!("{nanos:09}");
        format!("{sign}{whole}.{}", fraction.trim_end_matches('0'))
    }

    fn from_datetime(datetime: DateTime<Utc>) -> Self {
        Instant::from_secs_and_nanos(datetime.timestamp(), datetime.timestamp_subsec_nanos())
    }

    fn to_datetime(self) -> Option<DateTime<Utc>> {
        DateTime::<Utc>::from_timestamp(self.seconds, self.subsecond_nanos)
    }
}
