//! Scheduling pass report
//!
//! Every expanded request ends with exactly one [`ExportOutcome`]; inputs
//! that could not be expanded are listed separately as [`RejectedInput`]s.

use crate::domain::{ExportOutcome, ExportRequest, JobState, ScheduleInput};
use serde::Serialize;
use std::time::Duration;
use uuid::Uuid;

/// One request and what happened to it
#[derive(Debug, Clone, Serialize)]
pub struct ScheduledExport {
    pub request: ExportRequest,
    pub outcome: ExportOutcome,
}

/// An input rejected before any remote call
#[derive(Debug, Clone, Serialize)]
pub struct RejectedInput {
    pub input: ScheduleInput,
    pub reason: String,
}

/// Result of one scheduling pass
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleReport {
    /// Identifier attached to every log line of the pass
    pub run_id: Uuid,

    /// Outcomes in evaluation order
    pub outcomes: Vec<ScheduledExport>,

    /// Inputs with invalid geometry or dates
    pub rejected: Vec<RejectedInput>,

    /// A shutdown signal stopped the pass early
    pub interrupted: bool,

    /// Submissions were only simulated
    pub dry_run: bool,

    /// Wall-clock duration of the pass
    pub duration: Duration,
}

impl ScheduleReport {
    pub fn new(run_id: Uuid, dry_run: bool) -> Self {
        Self {
            run_id,
            outcomes: Vec::new(),
            rejected: Vec::new(),
            interrupted: false,
            dry_run,
            duration: Duration::from_secs(0),
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn record(&mut self, request: ExportRequest, outcome: ExportOutcome) {
        self.outcomes.push(ScheduledExport { request, outcome });
    }

    pub fn reject(&mut self, input: ScheduleInput, reason: String) {
        self.rejected.push(RejectedInput { input, reason });
    }

    /// Number of requests that reached evaluation
    pub fn total_requests(&self) -> usize {
        self.outcomes.len()
    }

    fn count(&self, predicate: impl Fn(&ExportOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|e| predicate(&e.outcome)).count()
    }

    pub fn submitted(&self) -> usize {
        self.count(|o| matches!(o, ExportOutcome::Submitted { .. }))
    }

    pub fn skipped_exists(&self) -> usize {
        self.count(|o| matches!(o, ExportOutcome::SkippedExists))
    }

    pub fn skipped_pending(&self) -> usize {
        self.count(|o| matches!(o, ExportOutcome::SkippedPending))
    }

    pub fn skipped_quota_capped(&self) -> usize {
        self.count(|o| matches!(o, ExportOutcome::SkippedQuotaCapped))
    }

    pub fn submit_failed(&self) -> usize {
        self.count(ExportOutcome::is_failure)
    }

    /// Monitored jobs that ended failed or cancelled
    pub fn failed_jobs(&self) -> usize {
        self.count(|o| {
            matches!(
                o,
                ExportOutcome::Submitted {
                    final_state: Some(JobState::Failed | JobState::Cancelled),
                    ..
                }
            )
        })
    }

    /// No failed submission, failed job or rejected input
    pub fn is_successful(&self) -> bool {
        self.submit_failed() == 0 && self.failed_jobs() == 0 && self.rejected.is_empty()
    }

    /// Process exit status for this report
    ///
    /// - `130` when interrupted
    /// - `1` when any submission, monitored job or input failed
    /// - `0` otherwise
    pub fn exit_code(&self) -> i32 {
        if self.interrupted {
            130
        } else if !self.is_successful() {
            1
        } else {
            0
        }
    }

    /// Log the report
    pub fn log_summary(&self) {
        tracing::info!(
            run_id = %self.run_id,
            total = self.total_requests(),
            submitted = self.submitted(),
            skipped_exists = self.skipped_exists(),
            skipped_pending = self.skipped_pending(),
            skipped_quota_capped = self.skipped_quota_capped(),
            submit_failed = self.submit_failed(),
            rejected = self.rejected.len(),
            dry_run = self.dry_run,
            interrupted = self.interrupted,
            duration_secs = self.duration.as_secs(),
            "Scheduling summary"
        );

        for rejected in &self.rejected {
            tracing::warn!(input = %rejected.input, reason = %rejected.reason, "Rejected input");
        }
        for entry in self.outcomes.iter().filter(|e| e.outcome.is_failure()) {
            tracing::warn!(
                identifier = %entry.request.identifier,
                outcome = %entry.outcome,
                "Export not submitted"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BoundingBox, DateRange, JobHandle};
    use chrono::NaiveDate;

    fn dates() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2021, 2, 1).unwrap(),
        )
        .unwrap()
    }

    fn request() -> ExportRequest {
        ExportRequest::new(BoundingBox::new(0.0, 0.1, 0.0, 0.1).unwrap(), dates(), "tifs")
    }

    fn submitted(final_state: Option<JobState>) -> ExportOutcome {
        ExportOutcome::Submitted {
            job: JobHandle::new("job-1").unwrap(),
            final_state,
        }
    }

    #[test]
    fn test_empty_report_succeeds() {
        let report = ScheduleReport::new(Uuid::new_v4(), false);
        assert!(report.is_successful());
        assert_eq!(report.exit_code(), 0);
        assert_eq!(report.total_requests(), 0);
    }

    #[test]
    fn test_counters() {
        let mut report = ScheduleReport::new(Uuid::new_v4(), false);
        report.record(request(), ExportOutcome::SkippedExists);
        report.record(request(), ExportOutcome::SkippedPending);
        report.record(request(), ExportOutcome::SkippedQuotaCapped);
        report.record(request(), submitted(None));

        assert_eq!(report.total_requests(), 4);
        assert_eq!(report.skipped_exists(), 1);
        assert_eq!(report.skipped_pending(), 1);
        assert_eq!(report.skipped_quota_capped(), 1);
        assert_eq!(report.submitted(), 1);
        assert_eq!(report.exit_code(), 0);
    }

    #[test]
    fn test_submit_failure_exit_code() {
        let mut report = ScheduleReport::new(Uuid::new_v4(), false);
        report.record(request(), submitted(None));
        report.record(
            request(),
            ExportOutcome::SubmitFailed {
                reason: "rejected".to_string(),
            },
        );

        assert_eq!(report.submit_failed(), 1);
        assert_eq!(report.exit_code(), 1);
    }

    #[test]
    fn test_failed_job_exit_code() {
        let mut report = ScheduleReport::new(Uuid::new_v4(), false);
        report.record(request(), submitted(Some(JobState::Completed)));
        assert_eq!(report.exit_code(), 0);

        report.record(request(), submitted(Some(JobState::Failed)));
        assert_eq!(report.failed_jobs(), 1);
        assert_eq!(report.exit_code(), 1);
    }

    #[test]
    fn test_rejected_input_exit_code() {
        let mut report = ScheduleReport::new(Uuid::new_v4(), false);
        report.reject(
            ScheduleInput::Point {
                lat: 0.0,
                lon: 0.0,
                dates: dates(),
            },
            "end date in the future".to_string(),
        );
        assert_eq!(report.exit_code(), 1);
    }

    #[test]
    fn test_interrupted_exit_code_wins() {
        let mut report = ScheduleReport::new(Uuid::new_v4(), false);
        report.record(
            request(),
            ExportOutcome::SubmitFailed {
                reason: "rejected".to_string(),
            },
        );
        report.interrupted = true;
        assert_eq!(report.exit_code(), 130);
    }
}
