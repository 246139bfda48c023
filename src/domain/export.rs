//! Export requests, scheduling inputs and outcomes

use super::geometry::{BoundingBox, Polygon};
use super::ids::{ExportIdentifier, JobHandle};
use super::imagery::JobState;
use super::time::DateRange;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// File extension of exported rasters
pub const OUTPUT_EXTENSION: &str = ".tif";

/// One exportable unit of work
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRequest {
    /// Idempotency key derived from the rounded box and the dates
    pub identifier: ExportIdentifier,

    /// Extent of the export
    pub bbox: BoundingBox,

    /// Region submitted to the imagery service
    pub polygon: Polygon,

    /// Date range covered by the export
    pub dates: DateRange,

    /// Destination path prefix, without extension
    pub destination_path: String,
}

impl ExportRequest {
    /// Creates a request for a box, deriving the identifier and polygon
    pub fn new(bbox: BoundingBox, dates: DateRange, destination_dir: &str) -> Self {
        let identifier = ExportIdentifier::derive(&bbox, &dates);
        let destination_path = join_path(destination_dir, identifier.as_str());
        Self {
            polygon: bbox.to_polygon(),
            identifier,
            bbox,
            dates,
            destination_path,
        }
    }

    pub fn start_date(&self) -> NaiveDate {
        self.dates.start()
    }

    pub fn end_date(&self) -> NaiveDate {
        self.dates.end()
    }

    /// Canonical path of the materialised output in durable storage
    pub fn output_path(&self) -> String {
        format!("{}{}", self.destination_path, OUTPUT_EXTENSION)
    }

    /// Description used for the remote job
    pub fn description(&self) -> String {
        self.identifier.description()
    }
}

/// Joins path segments with `/`, ignoring empty segments and stray separators
pub fn join_path(prefix: &str, name: &str) -> String {
    let prefix = prefix.trim_matches('/');
    let name = name.trim_start_matches('/');
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}/{name}")
    }
}

/// Result of evaluating one [`ExportRequest`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ExportOutcome {
    /// Output already exists in durable storage
    SkippedExists,
    /// A job with the same description is queued or running
    SkippedPending,
    /// The remote concurrent-job ceiling was reached
    SkippedQuotaCapped,
    /// The job was submitted; `final_state` is set when it was monitored to completion
    Submitted {
        job: JobHandle,
        final_state: Option<JobState>,
    },
    /// Compositing or submission was rejected
    SubmitFailed { reason: String },
}

impl ExportOutcome {
    pub fn is_skipped(&self) -> bool {
        matches!(
            self,
            ExportOutcome::SkippedExists
                | ExportOutcome::SkippedPending
                | ExportOutcome::SkippedQuotaCapped
        )
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ExportOutcome::SubmitFailed { .. })
    }

    /// Short label for reports
    pub fn label(&self) -> &'static str {
        match self {
            ExportOutcome::SkippedExists => "skipped-exists",
            ExportOutcome::SkippedPending => "skipped-pending",
            ExportOutcome::SkippedQuotaCapped => "skipped-quota-capped",
            ExportOutcome::Submitted { .. } => "submitted",
            ExportOutcome::SubmitFailed { .. } => "submit-failed",
        }
    }
}

impl fmt::Display for ExportOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportOutcome::Submitted {
                job,
                final_state: Some(state),
            } => write!(f, "submitted ({job}, {state})"),
            ExportOutcome::Submitted { job, .. } => write!(f, "submitted ({job})"),
            ExportOutcome::SubmitFailed { reason } => write!(f, "submit-failed: {reason}"),
            other => f.write_str(other.label()),
        }
    }
}

/// One scheduling input: a labelled point or a named region, with its dates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ScheduleInput {
    /// A buffer of `surrounding_metres` around a labelled point
    Point {
        lat: f64,
        lon: f64,
        dates: DateRange,
    },
    /// A region, optionally tiled into patches of `metres_per_polygon`
    Region {
        name: String,
        bbox: BoundingBox,
        dates: DateRange,
        metres_per_polygon: Option<f64>,
    },
}

impl ScheduleInput {
    pub fn dates(&self) -> &DateRange {
        match self {
            ScheduleInput::Point { dates, .. } | ScheduleInput::Region { dates, .. } => dates,
        }
    }
}

impl fmt::Display for ScheduleInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleInput::Point { lat, lon, dates } => {
                write!(f, "point ({lat}, {lon}) {dates}")
            }
            ScheduleInput::Region { name, dates, .. } => write!(f, "region {name} {dates}"),
        }
    }
}
