//! Time-step decomposition
//!
//! A date range is cut into consecutive fixed-length windows starting at the
//! range start. A trailing period shorter than one step is dropped, so the
//! windows may end before the range does.

use crate::domain::{GeoExportError, Result, TimeWindow};
use chrono::{Duration, NaiveDate};

/// Splits `[start, end)` into consecutive windows of `days_per_step` days.
///
/// # Errors
///
/// Returns [`GeoExportError::InvalidParameter`] if `end <= start` or
/// `days_per_step` is not positive.
///
/// # Examples
///
/// ```
/// use geoexport::core::windows::windows;
/// use chrono::NaiveDate;
///
/// let start = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
/// let end = NaiveDate::from_ymd_opt(2021, 1, 25).unwrap();
///
/// let steps = windows(start, end, 10).unwrap();
/// assert_eq!(steps.len(), 2);
/// assert_eq!(steps[1].end, NaiveDate::from_ymd_opt(2021, 1, 21).unwrap());
/// ```
pub fn windows(start: NaiveDate, end: NaiveDate, days_per_step: i64) -> Result<Vec<TimeWindow>> {
    if end <= start {
        return Err(GeoExportError::InvalidParameter(format!(
            "window range end {end} must be after start {start}"
        )));
    }
    if days_per_step <= 0 {
        return Err(GeoExportError::InvalidParameter(format!(
            "days per step must be positive, got {days_per_step}"
        )));
    }

    let step = Duration::days(days_per_step);
    let mut result = Vec::new();
    let mut cursor = start;
    while cursor + step <= end {
        result.push(TimeWindow::new(cursor, cursor + step));
        cursor += step;
    }

    if cursor < end {
        tracing::debug!(
            dropped_from = %cursor,
            dropped_to = %end,
            "Dropping trailing partial time step"
        );
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_trailing_partial_window_dropped() {
        let steps = windows(date(2021, 1, 1), date(2021, 1, 25), 10).unwrap();
        assert_eq!(
            steps,
            vec![
                TimeWindow::new(date(2021, 1, 1), date(2021, 1, 11)),
                TimeWindow::new(date(2021, 1, 11), date(2021, 1, 21)),
            ]
        );
    }

    #[test]
    fn test_exact_fit() {
        let steps = windows(date(2021, 1, 1), date(2021, 1, 31), 10).unwrap();
        assert_eq!(steps.len(), 3);
        assert_eq!(steps[2].end, date(2021, 1, 31));
    }

    #[test]
    fn test_range_shorter_than_step() {
        let steps = windows(date(2021, 1, 1), date(2021, 1, 5), 10).unwrap();
        assert!(steps.is_empty());
    }

    #[test_case(date(2020, 4, 1), date(2021, 4, 1), 30 ; "one year of months")]
    #[test_case(date(2021, 1, 1), date(2021, 12, 27), 30 ; "default range")]
    #[test_case(date(2020, 2, 20), date(2020, 3, 10), 1 ; "daily across leap day")]
    fn test_windows_are_contiguous(start: NaiveDate, end: NaiveDate, step: i64) {
        let steps = windows(start, end, step).unwrap();
        assert_eq!(steps[0].start, start);
        for pair in steps.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
        for w in &steps {
            assert_eq!(w.len_days(), step);
        }
        let total: i64 = steps.iter().map(TimeWindow::len_days).sum();
        assert!(total <= (end - start).num_days());
        assert!((end - start).num_days() - total < step);
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(windows(date(2021, 1, 1), date(2021, 1, 1), 10).is_err());
        assert!(windows(date(2021, 1, 2), date(2021, 1, 1), 10).is_err());
        assert!(matches!(
            windows(date(2021, 1, 1), date(2021, 2, 1), 0),
            Err(GeoExportError::InvalidParameter(_))
        ));
    }
}
