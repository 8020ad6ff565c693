//! Calendar dates for work records.
//!
//! A work's date is a plain `YYYY-MM-DD` string, deliberately not a
//! timezone-aware timestamp. Parsing a bare date string through a
//! timezone-carrying type can shift the displayed day by one depending on
//! the host timezone, so display formatting rearranges the string directly
//! and never round-trips through a date object.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A validated `YYYY-MM-DD` calendar date.
///
/// Ordering is derived from the inner string; zero-padded ISO dates order
/// chronologically under lexicographic comparison.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WorkDate(String);

impl WorkDate {
    /// Parse a `YYYY-MM-DD` string into a `WorkDate`.
    ///
    /// The string must be exactly ten characters, zero-padded, and name a
    /// real calendar day. Validation is the only place a date type is used;
    /// the stored value stays a string.
    pub fn parse(s: &str) -> Result<Self> {
        let bytes = s.as_bytes();
        let well_formed = bytes.len() == 10
            && bytes[4] == b'-'
            && bytes[7] == b'-'
            && bytes
                .iter()
                .enumerate()
                .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
        if !well_formed {
            return Err(Error::Validation(format!(
                "date must be YYYY-MM-DD, got {:?}",
                s
            )));
        }

        let (year, month, day) = split_ymd(s);
        if NaiveDate::from_ymd_opt(year, month, day).is_none() {
            return Err(Error::Validation(format!("not a calendar date: {:?}", s)));
        }

        Ok(Self(s.to_string()))
    }

    /// Today's date on the local calendar.
    pub fn today() -> Self {
        let now = chrono::Local::now().date_naive();
        Self(format!(
            "{:04}-{:02}-{:02}",
            now.year(),
            now.month(),
            now.day()
        ))
    }

    /// The stored `YYYY-MM-DD` form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn year(&self) -> i32 {
        split_ymd(&self.0).0
    }

    pub fn month(&self) -> u32 {
        split_ymd(&self.0).1
    }

    pub fn day(&self) -> u32 {
        split_ymd(&self.0).2
    }

    /// Display form `DD/MM/YYYY`, produced by rearranging the stored string.
    pub fn format_dmy(&self) -> String {
        let (y, m, d) = (&self.0[0..4], &self.0[5..7], &self.0[8..10]);
        format!("{}/{}/{}", d, m, y)
    }
}

fn split_ymd(s: &str) -> (i32, u32, u32) {
    // Callers guarantee the validated layout.
    let year = s[0..4].parse().unwrap_or(0);
    let month = s[5..7].parse().unwrap_or(0);
    let day = s[8..10].parse().unwrap_or(0);
    (year, month, day)
}

impl fmt::Display for WorkDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for WorkDate {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<WorkDate> for String {
    fn from(d: WorkDate) -> Self {
        d.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_valid_date() {
        let d = WorkDate::parse("2024-01-05").unwrap();
        assert_eq!(d.as_str(), "2024-01-05");
        assert_eq!((d.year(), d.month(), d.day()), (2024, 1, 5));
    }

    #[test]
    fn parse_rejects_malformed_strings() {
        for bad in ["", "2024-1-5", "05/01/2024", "2024-01-05T00:00:00", "20240105"] {
            assert!(WorkDate::parse(bad).is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn parse_rejects_impossible_dates() {
        assert!(WorkDate::parse("2024-13-01").is_err());
        assert!(WorkDate::parse("2024-02-30").is_err());
        assert!(WorkDate::parse("2023-02-29").is_err());
    }

    #[test]
    fn parse_accepts_leap_day() {
        assert!(WorkDate::parse("2024-02-29").is_ok());
    }

    #[test]
    fn format_dmy_is_a_string_transform() {
        // No timezone can alter this: the digits are rearranged verbatim.
        let d = WorkDate::parse("2024-01-05").unwrap();
        assert_eq!(d.format_dmy(), "05/01/2024");
    }

    #[test]
    fn ordering_is_chronological() {
        let a = WorkDate::parse("2023-12-31").unwrap();
        let b = WorkDate::parse("2024-01-01").unwrap();
        let c = WorkDate::parse("2024-01-02").unwrap();
        assert!(a < b && b < c);
    }

    #[test]
    fn serde_round_trip_rejects_bad_input() {
        let d: WorkDate = serde_json::from_str("\"2024-06-15\"").unwrap();
        assert_eq!(d.as_str(), "2024-06-15");
        assert!(serde_json::from_str::<WorkDate>("\"yesterday\"").is_err());
    }
}
