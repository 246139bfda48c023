//! Domain identifier types
//!
//! [`ExportIdentifier`] is the idempotency key of an export. It must be
//! bit-exact across runs and across processes, so its derivation is a pure
//! function of the rounded bounding box and the date range.

use super::geometry::BoundingBox;
use super::time::DateRange;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum length of a remote job description
pub const MAX_DESCRIPTION_LEN: usize = 100;

const DRY_RUN_JOB: &str = "dry-run";

/// Rounds to four decimal places and prints the shortest text, always
/// keeping a decimal point (`1.0`, `-0.0`, `36.8`).
///
/// Rounding is on the exact binary value: `53.60595` is stored just below
/// the tie and prints as `53.6059`.
pub fn format_coordinate(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let fixed = format!("{value:.4}");
    let trimmed = fixed.trim_end_matches('0');
    if trimmed.ends_with('.') {
        format!("{trimmed}0")
    } else {
        trimmed.to_string()
    }
}

/// Export identifier newtype wrapper
///
/// Format: `min_lat={v}_min_lon={v}_max_lat={v}_max_lon={v}_dates={start}_{end}`
///
/// # Examples
///
/// ```
/// use geoexport::domain::{BoundingBox, DateRange, ExportIdentifier};
/// use chrono::NaiveDate;
///
/// let bbox = BoundingBox::new(-0.00072, 0.00072, 36.8, 36.80146).unwrap();
/// let dates = DateRange::new(
///     NaiveDate::from_ymd_opt(2020, 4, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2021, 4, 1).unwrap(),
/// ).unwrap();
///
/// let id = ExportIdentifier::derive(&bbox, &dates);
/// assert_eq!(
///     id.as_str(),
///     "min_lat=-0.0007_min_lon=36.8_max_lat=0.0007_max_lon=36.8015_dates=2020-04-01_2021-04-01"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExportIdentifier(String);

impl ExportIdentifier {
    /// Derives the identifier for a box and date range
    pub fn derive(bbox: &BoundingBox, dates: &DateRange) -> Self {
        Self(format!(
            "min_lat={}_min_lon={}_max_lat={}_max_lon={}_dates={}_{}",
            format_coordinate(bbox.min_lat()),
            format_coordinate(bbox.min_lon()),
            format_coordinate(bbox.max_lat()),
            format_coordinate(bbox.max_lon()),
            dates.start(),
            dates.end()
        ))
    }

    /// Creates an identifier from an existing string
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Export identifier cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Remote job description for this identifier.
    ///
    /// The remote service does not accept `.` or `=` in descriptions; both are
    /// replaced by `-` and the result is cut to [`MAX_DESCRIPTION_LEN`] characters.
    pub fn description(&self) -> String {
        self.0
            .chars()
            .map(|c| if c == '.' || c == '=' { '-' } else { c })
            .take(MAX_DESCRIPTION_LEN)
            .collect()
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ExportIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ExportIdentifier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for ExportIdentifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Remote job handle newtype wrapper
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobHandle(String);

impl JobHandle {
    /// Creates a new JobHandle
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Job handle cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Placeholder handle recorded for submissions skipped by a dry run
    pub fn dry_run() -> Self {
        Self(DRY_RUN_JOB.to_string())
    }

    pub fn is_dry_run(&self) -> bool {
        self.0 == DRY_RUN_JOB
    }

    /// Returns the job id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for JobHandle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
