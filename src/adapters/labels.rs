//! Label file loading
//!
//! Labels are `{lat, lon, start_date, end_date}` rows stored either as a JSON
//! array or as JSON Lines (`.jsonl` / `.ndjson`, one object per line).

use crate::domain::{DateRange, GeoExportError, Result, ScheduleInput};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One labelled point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelRow {
    pub lat: f64,
    pub lon: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl LabelRow {
    /// Converts the row into a point scheduling input
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if `end_date <= start_date`.
    pub fn to_input(&self) -> Result<ScheduleInput> {
        Ok(ScheduleInput::Point {
            lat: self.lat,
            lon: self.lon,
            dates: DateRange::new(self.start_date, self.end_date)?,
        })
    }
}

fn is_json_lines(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("jsonl") | Some("ndjson")
    )
}

/// Parses label rows from file contents
pub fn parse_labels(content: &str, json_lines: bool) -> Result<Vec<LabelRow>> {
    if !json_lines {
        return serde_json::from_str(content)
            .map_err(|e| GeoExportError::Serialization(format!("invalid label file: {e}")));
    }

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str(line).map_err(|e| {
                GeoExportError::Serialization(format!("invalid label on line {}: {e}", index + 1))
            })
        })
        .collect()
}

/// Loads label rows from a JSON or JSON Lines file
///
/// # Errors
///
/// Returns an I/O error if the file cannot be read and a serialization error
/// if any row is malformed.
pub async fn load_labels(path: impl AsRef<Path>) -> Result<Vec<LabelRow>> {
    let path = path.as_ref();
    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        GeoExportError::Io(format!("failed to read labels {}: {e}", path.display()))
    })?;
    let rows = parse_labels(&content, is_json_lines(path))?;
    tracing::info!(path = %path.display(), count = rows.len(), "Loaded labels");
    Ok(rows)
}
