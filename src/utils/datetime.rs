//! XMP Date/Time utilities
//!
//! This module provides functionality for parsing and formatting XMP date/time values.
//! XMP uses a specific ISO 8601-like format that supports partial dates and time zones.
//! EXIF style timestamps (`YYYY:MM:DD hh:mm:ss`) are accepted on input as well.

use crate::core::error::{XmpError, XmpResult};
use std::fmt;
use std::str::FromStr;

/// XMP Date/Time value
///
/// Represents a date/time value with optional components.
/// XMP supports partial dates (e.g., just year, or year-month).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct XmpDate {
    /// Year (can be negative for BCE dates)
    pub year: i32,
    /// Month (1-12, 0 means not set)
    pub month: u8,
    /// Day (1-31, 0 means not set)
    pub day: u8,
    /// Hour (0-23)
    pub hour: u8,
    /// Minute (0-59)
    pub minute: u8,
    /// Second (0-59)
    pub second: u8,
    /// Nanoseconds (0-999999999)
    pub nanosecond: u32,
    /// Whether time components are present
    pub has_time: bool,
    /// Time zone offset in minutes east of UTC, if present
    pub offset: Option<i16>,
}

impl XmpDate {
    /// Create a date without a time
    pub fn ymd(year: i32, month: u8, day: u8) -> Self {
        Self {
            year,
            month,
            day,
            ..Default::default()
        }
    }

    /// Attach a time of day
    pub fn with_time(mut self, hour: u8, minute: u8, second: u8) -> Self {
        self.hour = hour;
        self.minute = minute;
        self.second = second;
        self.has_time = true;
        self
    }

    /// Attach a time zone offset in minutes east of UTC
    pub fn with_offset(mut self, minutes: i16) -> Self {
        self.offset = Some(minutes);
        self
    }

    /// Parse an XMP date/time string
    ///
    /// XMP date/time format:
    /// - `YYYY` - year only
    /// - `YYYY-MM` - year and month
    /// - `YYYY-MM-DD` - date only
    /// - `YYYY-MM-DDThh:mm` - date and time without seconds
    /// - `YYYY-MM-DDThh:mm:ss.sss` - with fractional seconds
    /// - `YYYY-MM-DDThh:mm:ssZ` - UTC timezone
    /// - `YYYY-MM-DDThh:mm:ss+hh:mm` - timezone offset
    ///
    /// # Example
    ///
    /// ```rust
    /// use xmpmodel::utils::datetime::XmpDate;
    ///
    /// let dt = XmpDate::parse("2023-12-25T10:30:00Z").unwrap();
    /// assert_eq!(dt.year, 2023);
    /// assert_eq!(dt.month, 12);
    /// assert_eq!(dt.offset, Some(0));
    /// ```
    pub fn parse(s: &str) -> XmpResult<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(invalid(s, "empty date/time string"));
        }

        // EXIF writes "YYYY:MM:DD hh:mm:ss"
        let normalized;
        let s = if s.len() >= 10 && s.as_bytes()[4] == b':' && s.as_bytes()[7] == b':' {
            normalized = format!("{}-{}-{}", &s[..4], &s[5..7], s[8..].replacen(' ', "T", 1));
            normalized.as_str()
        } else {
            s
        };

        let (date_part, time_part) = match s.split_once('T') {
            Some((date, time)) => (date, Some(time)),
            None => (s, None),
        };

        let mut dt = Self::default();
        let (negative, digits) = match date_part.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, date_part),
        };
        let mut fields = digits.split('-');
        let year = fields.next().unwrap_or_default();
        if year.is_empty() || !year.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid(s, "invalid year"));
        }
        dt.year = year.parse().map_err(|_| invalid(s, "invalid year"))?;
        if negative {
            dt.year = -dt.year;
        }
        if let Some(month) = fields.next() {
            dt.month = number(s, month, "month")?;
        }
        if let Some(day) = fields.next() {
            dt.day = number(s, day, "day")?;
        }
        if fields.next().is_some() {
            return Err(invalid(s, "too many date components"));
        }

        if let Some(time) = time_part {
            if dt.day == 0 {
                return Err(invalid(s, "time requires a full date"));
            }
            dt.parse_time(s, time)?;
        }

        dt.validate().map_err(|e| invalid(s, &e.to_string()))?;
        Ok(dt)
    }

    fn parse_time(&mut self, source: &str, time: &str) -> XmpResult<()> {
        let (clock, zone) = if let Some(clock) = time.strip_suffix('Z') {
            (clock, Some(0))
        } else if let Some(pos) = time.rfind(['+', '-']) {
            let sign: i16 = if time.as_bytes()[pos] == b'-' { -1 } else { 1 };
            let (h, m) = time[pos + 1..]
                .split_once(':')
                .ok_or_else(|| invalid(source, "invalid time zone"))?;
            let h: u8 = number(source, h, "time zone hour")?;
            let m: u8 = number(source, m, "time zone minute")?;
            if h > 23 || m > 59 {
                return Err(invalid(source, "time zone out of range"));
            }
            (&time[..pos], Some(sign * (h as i16 * 60 + m as i16)))
        } else {
            (time, None)
        };

        let mut parts = clock.split(':');
        self.hour = number(source, parts.next().unwrap_or_default(), "hour")?;
        self.minute = number(
            source,
            parts.next().ok_or_else(|| invalid(source, "missing minute"))?,
            "minute",
        )?;
        if let Some(seconds) = parts.next() {
            let (whole, fraction) = match seconds.split_once('.') {
                Some((whole, fraction)) => (whole, Some(fraction)),
                None => (seconds, None),
            };
            self.second = number(source, whole, "second")?;
            if let Some(fraction) = fraction {
                if fraction.is_empty()
                    || fraction.len() > 9
                    || !fraction.bytes().all(|b| b.is_ascii_digit())
                {
                    return Err(invalid(source, "invalid fractional seconds"));
                }
                let padded = format!("{:0<9}", fraction);
                self.nanosecond = padded
                    .parse()
                    .map_err(|_| invalid(source, "invalid fractional seconds"))?;
            }
        }
        if parts.next().is_some() {
            return Err(invalid(source, "too many time components"));
        }
        self.has_time = true;
        self.offset = zone;
        Ok(())
    }

    /// Format as an XMP date/time string
    ///
    /// Formats the date/time according to XMP specification:
    /// - Year only: `YYYY`
    /// - Year and month: `YYYY-MM`
    /// - Date only: `YYYY-MM-DD`
    /// - Date and time: `YYYY-MM-DDThh:mm:ss`
    /// - With fractional seconds: `YYYY-MM-DDThh:mm:ss.sss`
    /// - With timezone: `YYYY-MM-DDThh:mm:ssZ` or `YYYY-MM-DDThh:mm:ss+hh:mm`
    pub fn format(&self) -> String {
        let mut result = if self.year < 0 {
            format!("-{:04}", self.year.unsigned_abs())
        } else {
            format!("{:04}", self.year)
        };
        if self.month != 0 {
            result.push_str(&format!("-{:02}", self.month));
            if self.day != 0 {
                result.push_str(&format!("-{:02}", self.day));
            }
        }

        if self.has_time && self.day != 0 {
            result.push_str(&format!(
                "T{:02}:{:02}:{:02}",
                self.hour, self.minute, self.second
            ));
            if self.nanosecond != 0 {
                // Format nanoseconds, removing trailing zeros
                let ns = format!("{:09}", self.nanosecond);
                result.push('.');
                result.push_str(ns.trim_end_matches('0'));
            }
            match self.offset {
                Some(0) => result.push('Z'),
                Some(offset) => {
                    let sign = if offset < 0 { '-' } else { '+' };
                    let offset = offset.unsigned_abs();
                    result.push_str(&format!("{}{:02}:{:02}", sign, offset / 60, offset % 60));
                }
                None => {}
            }
        }
        result
    }

    /// Validate the date/time values
    ///
    /// Checks that all values are within valid ranges.
    pub fn validate(&self) -> XmpResult<()> {
        if self.month > 12 {
            return Err(XmpError::BadParam("Month is out of range".to_string()));
        }
        if self.day > 31 || (self.day != 0 && self.month == 0) {
            return Err(XmpError::BadParam("Day is out of range".to_string()));
        }
        if self.has_time {
            if self.hour > 23 {
                return Err(XmpError::BadParam("Hour is out of range".to_string()));
            }
            if self.minute > 59 {
                return Err(XmpError::BadParam("Minute is out of range".to_string()));
            }
            if self.second > 59 {
                return Err(XmpError::BadParam("Second is out of range".to_string()));
            }
            if self.nanosecond >= 1_000_000_000 {
                return Err(XmpError::BadParam("Nanosecond is out of range".to_string()));
            }
        }
        Ok(())
    }
}

fn invalid(source: &str, reason: &str) -> XmpError {
    XmpError::Unmarshal(format!("invalid date '{}': {}", source, reason))
}

fn number(source: &str, text: &str, what: &str) -> XmpResult<u8> {
    if text.is_empty() || text.len() > 2 || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid(source, &format!("invalid {}", what)));
    }
    text.parse()
        .map_err(|_| invalid(source, &format!("invalid {}", what)))
}

impl fmt::Display for XmpDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}

impl FromStr for XmpDate {
    type Err = XmpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_partial_dates() {
        let dt = XmpDate::parse("2023").unwrap();
        assert_eq!((dt.year, dt.month, dt.day), (2023, 0, 0));
        assert_eq!(dt.format(), "2023");

        let dt = XmpDate::parse("2023-07").unwrap();
        assert_eq!(dt.format(), "2023-07");

        let dt = XmpDate::parse("2023-07-04").unwrap();
        assert!(!dt.has_time);
        assert_eq!(dt, XmpDate::ymd(2023, 7, 4));
    }

    #[test]
    fn test_parse_time_and_zone() {
        let dt = XmpDate::parse("2023-12-25T10:30:00Z").unwrap();
        assert_eq!(dt, XmpDate::ymd(2023, 12, 25).with_time(10, 30, 0).with_offset(0));
        assert_eq!(dt.format(), "2023-12-25T10:30:00Z");

        let dt = XmpDate::parse("2023-12-25T10:30:05.250-05:30").unwrap();
        assert_eq!(dt.nanosecond, 250_000_000);
        assert_eq!(dt.offset, Some(-330));
        assert_eq!(dt.format(), "2023-12-25T10:30:05.25-05:30");

        let dt = XmpDate::parse("2023-12-25T10:30").unwrap();
        assert_eq!(dt.format(), "2023-12-25T10:30:00");
    }

    #[test]
    fn test_parse_exif_format() {
        let dt = XmpDate::parse("2019:03:01 08:15:42").unwrap();
        assert_eq!(dt, XmpDate::ymd(2019, 3, 1).with_time(8, 15, 42));
    }

    #[test]
    fn test_parse_invalid() {
        for s in ["", "abc", "2023-13", "2023-01-32", "2023-01-01T25:00", "2023T10:00", "2023-01-01T10"] {
            let err = XmpDate::parse(s).unwrap_err();
            assert!(matches!(err, XmpError::Unmarshal(_)), "{}", s);
        }
    }

    #[test]
    fn test_round_trip() {
        for s in ["-0044-03-15", "1999-12-31T23:59:59+01:00", "2024-02-29T00:00:00.000001Z"] {
            assert_eq!(XmpDate::parse(s).unwrap().to_string(), s);
        }
    }
}
