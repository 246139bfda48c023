//! Export scheduling
//!
//! The [`ExportScheduler`] turns scheduling inputs (labelled points and named
//! regions) into export requests, gates each one through a
//! [`LedgerSnapshot`](crate::core::ledger::LedgerSnapshot) and submits only
//! the missing ones.
//!
//! # Workflow
//!
//! 1. **Expand**: points become one buffered box, regions are tiled
//! 2. **Snapshot**: one ledger snapshot for the whole pass
//! 3. **Gate**: exists, then pending, then capacity
//! 4. **Submit**: composite every time step, stack, submit
//! 5. **Monitor** (optional): poll until the job leaves `queued`/`running`
//!
//! Requests are handled one at a time in input order. A rejected submission
//! is recorded and the pass moves on; missing credentials abort it.

pub mod report;

pub use report::{RejectedInput, ScheduleReport, ScheduledExport};

use crate::adapters::imagery::{ExportOptions, ImageryService};
use crate::config::GeoExportConfig;
use crate::core::composite::{combine, Compositor};
use crate::core::ledger::{ExportLedger, LedgerSnapshot};
use crate::core::tiling::{self, GridRounding};
use crate::core::windows::windows;
use crate::domain::export::join_path;
use crate::domain::{
    ExportOutcome, ExportRequest, GeoExportError, JobHandle, JobState, Result, ScheduleInput,
};
use crate::{log_batch_processing, log_error_with_context, log_export_outcome};
use chrono::{NaiveDate, Utc};
use std::collections::HashSet;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::Instrument;
use uuid::Uuid;

/// Scheduler settings
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Storage prefix outputs are written under and listed from
    pub storage_prefix: String,

    /// Half-width of the box exported around a labelled point
    pub surrounding_metres: f64,

    /// Length of one mosaic period
    pub days_per_timestep: i64,

    /// Grid rounding for region tiling
    pub rounding: GridRounding,

    /// Remote concurrent-job ceiling
    pub max_pending_jobs: usize,

    /// Consult durable storage before submitting
    pub check_storage: bool,

    /// Consult the remote job list before submitting
    pub check_pending: bool,

    /// Wait for every submitted job to finish
    pub monitor: bool,

    /// Delay between job state polls
    pub poll_interval: Duration,

    /// Evaluate without compositing or submitting
    pub dry_run: bool,

    /// Raster export parameters
    pub export_options: ExportOptions,
}

impl SchedulerConfig {
    /// Builds scheduler settings from the loaded configuration
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `tiling.rounding` is not recognised.
    pub fn from_config(config: &GeoExportConfig) -> Result<Self> {
        let rounding =
            GridRounding::from_str(&config.tiling.rounding).map_err(GeoExportError::Configuration)?;

        Ok(Self {
            storage_prefix: config.storage.prefix.clone(),
            surrounding_metres: config.export.surrounding_metres,
            days_per_timestep: i64::from(config.export.days_per_timestep),
            rounding,
            max_pending_jobs: config.export.max_pending_jobs,
            check_storage: config.export.check_storage,
            check_pending: config.export.check_pending,
            monitor: config.export.monitor,
            poll_interval: Duration::from_secs(config.export.poll_interval_seconds),
            dry_run: config.export.dry_run,
            export_options: ExportOptions {
                bucket: config.storage.bucket.clone(),
                scale: config.export.scale,
                max_pixels: config.export.max_pixels,
                file_dimensions: config.export.file_dimensions,
            },
        })
    }
}

/// How monitoring a job ended
enum MonitorResult {
    Finished(JobState),
    Interrupted,
}

/// Export scheduler
pub struct ExportScheduler {
    config: SchedulerConfig,
    imagery: Arc<dyn ImageryService>,
    compositor: Arc<dyn Compositor>,
    ledger: Arc<ExportLedger>,
    shutdown: watch::Receiver<bool>,
    today: NaiveDate,
}

impl ExportScheduler {
    /// Create a new scheduler
    ///
    /// `shutdown` is checked between requests and at every monitor poll.
    pub fn new(
        config: SchedulerConfig,
        imagery: Arc<dyn ImageryService>,
        compositor: Arc<dyn Compositor>,
        ledger: Arc<ExportLedger>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            config,
            imagery,
            compositor,
            ledger,
            shutdown,
            today: Utc::now().date_naive(),
        }
    }

    /// Overrides the date future end dates are checked against
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Evaluates every input and submits the exports that are missing
    ///
    /// # Errors
    ///
    /// Returns an error only for failures that abort the whole pass: missing
    /// or rejected credentials and ledger listing failures. Everything else
    /// is recorded in the report.
    pub async fn plan_and_submit(&self, inputs: &[ScheduleInput]) -> Result<ScheduleReport> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("schedule", run_id = %run_id);
        self.run(run_id, inputs).instrument(span).await
    }

    async fn run(&self, run_id: Uuid, inputs: &[ScheduleInput]) -> Result<ScheduleReport> {
        let start_time = Instant::now();
        let mut report = ScheduleReport::new(run_id, self.config.dry_run);
        let mut shutdown = self.shutdown.clone();

        tracing::info!(
            inputs = inputs.len(),
            dry_run = self.config.dry_run,
            monitor = self.config.monitor,
            strategy = %self.compositor.strategy(),
            "Starting scheduling pass"
        );

        let mut requests = Vec::new();
        for input in inputs {
            match self.expand(input) {
                Ok(expanded) => requests.extend(expanded),
                Err(e) => {
                    tracing::warn!(input = %input, error = %e, "Rejecting input");
                    report.reject(input.clone(), e.to_string());
                }
            }
        }

        if requests.is_empty() {
            tracing::info!("No export requests to evaluate");
            return Ok(report.with_duration(start_time.elapsed()));
        }

        let snapshot = self
            .ledger
            .snapshot(
                &self.config.storage_prefix,
                self.config.check_storage,
                self.config.check_pending,
            )
            .await?;

        let total = requests.len();
        let mut submitted: HashSet<String> = HashSet::new();

        for (index, request) in requests.into_iter().enumerate() {
            if *shutdown.borrow() {
                tracing::warn!(remaining = total - index, "Shutdown requested, stopping pass");
                report.interrupted = true;
                break;
            }

            log_batch_processing!(index + 1, total);

            let (outcome, interrupted) = self
                .evaluate(&request, &snapshot, &mut submitted, &mut shutdown)
                .await?;

            log_export_outcome!(request.identifier, outcome);
            report.record(request, outcome);

            if interrupted {
                report.interrupted = true;
                break;
            }
        }

        let report = report.with_duration(start_time.elapsed());
        crate::log_schedule_complete!(report.total_requests(), report.duration);
        Ok(report)
    }

    /// Derives the export requests for one input
    fn expand(&self, input: &ScheduleInput) -> Result<Vec<ExportRequest>> {
        let dates = *input.dates();
        dates.ensure_not_future(self.today)?;

        if windows(dates.start(), dates.end(), self.config.days_per_timestep)?.is_empty() {
            return Err(GeoExportError::InvalidParameter(format!(
                "date range {dates} is shorter than one time step of {} days",
                self.config.days_per_timestep
            )));
        }

        match input {
            ScheduleInput::Point { lat, lon, .. } => {
                let bbox = tiling::from_centre(*lat, *lon, self.config.surrounding_metres)?;
                Ok(vec![ExportRequest::new(
                    bbox,
                    dates,
                    &self.config.storage_prefix,
                )])
            }
            ScheduleInput::Region {
                name,
                bbox,
                metres_per_polygon,
                ..
            } => {
                let tiles = match metres_per_polygon {
                    Some(metres) => tiling::tile_with(bbox, *metres, self.config.rounding)?,
                    None => vec![*bbox],
                };
                let region_dir = join_path(&self.config.storage_prefix, name);

                tracing::info!(region = %name, tiles = tiles.len(), "Region tiled");

                Ok(tiles
                    .into_iter()
                    .enumerate()
                    .map(|(i, tile)| {
                        let batch_dir = join_path(&region_dir, &format!("batch_{i}"));
                        ExportRequest::new(tile, dates, &batch_dir)
                    })
                    .collect())
            }
        }
    }

    /// Gates one request and submits it when nothing covers it yet.
    /// The flag is true when a shutdown interrupted monitoring.
    async fn evaluate(
        &self,
        request: &ExportRequest,
        snapshot: &LedgerSnapshot,
        submitted: &mut HashSet<String>,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Result<(ExportOutcome, bool)> {
        let description = request.description();

        if snapshot.exists(request) {
            return Ok((ExportOutcome::SkippedExists, false));
        }
        if snapshot.is_pending(request) || submitted.contains(&description) {
            return Ok((ExportOutcome::SkippedPending, false));
        }
        if snapshot.at_capacity(self.config.max_pending_jobs) {
            return Ok((ExportOutcome::SkippedQuotaCapped, false));
        }

        if self.config.dry_run {
            tracing::info!(destination = %request.destination_path, "Dry run, not submitting");
            submitted.insert(description);
            return Ok((
                ExportOutcome::Submitted {
                    job: JobHandle::dry_run(),
                    final_state: None,
                },
                false,
            ));
        }

        let job = match self.submit(request).await {
            Ok(job) => job,
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                log_error_with_context!(&e, "Export submission failed");
                return Ok((
                    ExportOutcome::SubmitFailed {
                        reason: e.to_string(),
                    },
                    false,
                ));
            }
        };
        submitted.insert(description);

        tracing::info!(job = %job, destination = %request.destination_path, "Export submitted");

        if !self.config.monitor {
            return Ok((
                ExportOutcome::Submitted {
                    job,
                    final_state: None,
                },
                false,
            ));
        }

        match self.monitor(&job, shutdown).await {
            Ok(MonitorResult::Finished(state)) => Ok((
                ExportOutcome::Submitted {
                    job,
                    final_state: Some(state),
                },
                false,
            )),
            Ok(MonitorResult::Interrupted) => Ok((
                ExportOutcome::Submitted {
                    job,
                    final_state: None,
                },
                true,
            )),
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                log_error_with_context!(&e, "Stopped monitoring job");
                Ok((
                    ExportOutcome::Submitted {
                        job,
                        final_state: None,
                    },
                    false,
                ))
            }
        }
    }

    /// Composites every time step, stacks them and starts the export job
    async fn submit(&self, request: &ExportRequest) -> Result<JobHandle> {
        let steps = windows(
            request.start_date(),
            request.end_date(),
            self.config.days_per_timestep,
        )?;

        let mut mosaics = Vec::with_capacity(steps.len());
        for window in &steps {
            mosaics.push(self.compositor.composite(&request.polygon, window).await?);
        }
        let image = combine(mosaics)?;

        tracing::debug!(
            identifier = %request.identifier,
            timesteps = steps.len(),
            bands = image.band_count(),
            "Submitting export"
        );

        self.imagery
            .submit_export(
                &image,
                &request.polygon,
                &request.destination_path,
                &request.description(),
                &self.config.export_options,
            )
            .await
    }

    /// Polls the job until it is no longer queued or running
    async fn monitor(
        &self,
        job: &JobHandle,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Result<MonitorResult> {
        let mut signal_open = true;

        loop {
            let state = self.imagery.job_state(job).await?;
            if state.is_terminal() {
                tracing::info!(job = %job, state = %state, "Job finished");
                return Ok(MonitorResult::Finished(state));
            }

            tracing::debug!(job = %job, state = %state, "Job in progress");

            if *shutdown.borrow() {
                return Ok(MonitorResult::Interrupted);
            }

            if signal_open {
                tokio::select! {
                    _ = tokio::time::sleep(self.config.poll_interval) => {}
                    changed = shutdown.changed() => {
                        match changed {
                            Ok(()) if *shutdown.borrow() => {
                                tracing::warn!(job = %job, "Shutdown requested, stopping monitor");
                                return Ok(MonitorResult::Interrupted);
                            }
                            Ok(()) => {}
                            // Sender dropped: nobody can signal shutdown anymore.
                            Err(_) => signal_open = false,
                        }
                    }
                }
            } else {
                tokio::time::sleep(self.config.poll_interval).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeoExportConfig;

    fn config() -> GeoExportConfig {
        let toml = r#"
[imagery]
project = "crop-mask"

[export]
days_per_timestep = 15
poll_interval_seconds = 5
file_dimensions = 256

[tiling]
rounding = "ceil"
"#;
        toml::from_str(toml).unwrap()
    }

    #[test]
    fn test_scheduler_config_from_config() {
        let scheduler_config = SchedulerConfig::from_config(&config()).unwrap();

        assert_eq!(scheduler_config.storage_prefix, "tifs");
        assert_eq!(scheduler_config.days_per_timestep, 15);
        assert_eq!(scheduler_config.rounding, GridRounding::Ceil);
        assert_eq!(scheduler_config.poll_interval, Duration::from_secs(5));
        assert_eq!(scheduler_config.max_pending_jobs, 3000);
        assert_eq!(scheduler_config.export_options.bucket, "crop-mask-tifs");
        assert_eq!(scheduler_config.export_options.file_dimensions, Some(256));
    }

    #[test]
    fn test_scheduler_config_rejects_unknown_rounding() {
        let mut config = config();
        config.tiling.rounding = "round".to_string();
        assert!(matches!(
            SchedulerConfig::from_config(&config),
            Err(GeoExportError::Configuration(_))
        ));
    }
}
