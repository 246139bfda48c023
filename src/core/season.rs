//! Agricultural season calendar
//!
//! Seasons run from 1 April to 1 April. Region exports are usually run for
//! the season in progress or for the last complete one.

use crate::domain::{DateRange, GeoExportError, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Month and day a season starts on
pub const SEASON_START: (u32, u32) = (4, 1);

/// Which season a region export covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    /// From the start of the current season up to today
    InSeason,
    /// The last complete season
    PostSeason,
}

impl Season {
    /// Date range covered by this season as of `today`
    ///
    /// # Examples
    ///
    /// ```
    /// use geoexport::core::season::Season;
    /// use chrono::NaiveDate;
    ///
    /// let today = NaiveDate::from_ymd_opt(2021, 1, 23).unwrap();
    /// let range = Season::PostSeason.date_range(today).unwrap();
    /// assert_eq!(range.start(), NaiveDate::from_ymd_opt(2019, 4, 1).unwrap());
    /// assert_eq!(range.end(), NaiveDate::from_ymd_opt(2020, 4, 1).unwrap());
    /// ```
    pub fn date_range(self, today: NaiveDate) -> Result<DateRange> {
        let this_year = season_start(today.year())?;
        let latest_start = if today > this_year {
            this_year
        } else {
            season_start(today.year() - 1)?
        };

        match self {
            Season::InSeason => DateRange::new(latest_start, today),
            Season::PostSeason => {
                let previous = season_start(latest_start.year() - 1)?;
                DateRange::new(previous, latest_start)
            }
        }
    }
}

fn season_start(year: i32) -> Result<NaiveDate> {
    let (month, day) = SEASON_START;
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        GeoExportError::InvalidParameter(format!("no season start date for year {year}"))
    })
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Season::InSeason => f.write_str("in_season"),
            Season::PostSeason => f.write_str("post_season"),
        }
    }
}

impl FromStr for Season {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "in" | "in_season" | "in-season" => Ok(Season::InSeason),
            "post" | "post_season" | "post-season" => Ok(Season::PostSeason),
            other => Err(format!(
                "Invalid season '{other}', expected 'in' or 'post'"
            )),
        }
    }
}
