use crate::error::{OverlapError, Result};
use chrono::{Duration, NaiveDate};
use std::fmt;
use std::str::FromStr;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// An inclusive range of calendar days. `start <= end` always holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(OverlapError::InvertedDateRange {
                start: start.format(DATE_FORMAT).to_string(),
                end: end.format(DATE_FORMAT).to_string(),
            });
        }
        Ok(Self { start, end })
    }

    pub fn single_day(day: NaiveDate) -> Self {
        Self { start: day, end: day }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of days covered, counting both ends.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// The sub-range of `len` days beginning at `offset` days after start,
    /// clipped to this range's end.
    pub(crate) fn window(&self, offset: i64, len: i64) -> Self {
        let start = self.start + Duration::days(offset);
        let end = (start + Duration::days(len - 1)).min(self.end);
        Self { start, end }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}",
            self.start.format(DATE_FORMAT),
            self.end.format(DATE_FORMAT)
        )
    }
}

/// Accepts `YYYY-MM-DD` for a single day or `YYYY-MM-DD:YYYY-MM-DD`.
impl FromStr for DateRange {
    type Err = OverlapError;

    fn from_str(s: &str) -> Result<Self> {
        match s.split_once(':') {
            Some((start, end)) => DateRange::new(parse_date(start)?, parse_date(end)?),
            None => Ok(DateRange::single_day(parse_date(s)?)),
        }
    }
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).map_err(|_| OverlapError::InvalidDate {
        value: s.to_string(),
    })
}

/// Sum of the inclusive spans of all ranges. Overlapping ranges count twice.
pub fn total_days(ranges: &[DateRange]) -> i64 {
    ranges.iter().map(DateRange::days).sum()
}
