//! Temporal value types

use super::errors::GeoExportError;
use super::result::Result;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Date format used in identifiers, label files and CLI arguments
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses a `YYYY-MM-DD` date
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|e| {
        GeoExportError::InvalidParameter(format!(
            "invalid date '{value}', expected YYYY-MM-DD: {e}"
        ))
    })
}

/// One mosaic period, half-open: `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl TimeWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Length in days
    pub fn len_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// A validated date range with `start < end`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawDateRange")]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

#[derive(Deserialize)]
struct RawDateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl TryFrom<RawDateRange> for DateRange {
    type Error = GeoExportError;

    fn try_from(raw: RawDateRange) -> Result<Self> {
        DateRange::new(raw.start, raw.end)
    }
}

impl DateRange {
    /// Creates a date range
    ///
    /// # Errors
    ///
    /// Returns [`GeoExportError::InvalidParameter`] if `end <= start`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end <= start {
            return Err(GeoExportError::InvalidParameter(format!(
                "end date {end} must be after start date {start}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Builds a range from an optional start and end.
    ///
    /// A missing bound is derived from the other one as
    /// `days_per_timestep * num_timesteps` days away.
    ///
    /// # Errors
    ///
    /// Returns [`GeoExportError::InvalidParameter`] if both bounds are missing
    /// or the resulting range is empty.
    pub fn resolve(
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        days_per_timestep: u32,
        num_timesteps: u32,
    ) -> Result<Self> {
        let span = Duration::days(i64::from(days_per_timestep) * i64::from(num_timesteps));
        match (start, end) {
            (Some(start), Some(end)) => Self::new(start, end),
            (Some(start), None) => Self::new(start, start + span),
            (None, Some(end)) => Self::new(end - span, end),
            (None, None) => Err(GeoExportError::InvalidParameter(
                "unable to determine date range: a start date, an end date or a season is required"
                    .to_string(),
            )),
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Fails with [`GeoExportError::InvalidDateRange`] if the range ends after `today`
    pub fn ensure_not_future(&self, today: NaiveDate) -> Result<()> {
        if self.end > today {
            return Err(GeoExportError::InvalidDateRange(format!(
                "end date {} is in the future (today is {today})",
                self.end
            )));
        }
        Ok(())
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.start, self.end)
    }
}
