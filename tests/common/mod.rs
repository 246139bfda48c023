//! In-memory imagery service and output store shared by integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use geoexport::adapters::imagery::{CompositeRequest, ExportOptions, ImageryService};
use geoexport::adapters::storage::OutputStore;
use geoexport::core::composite::{build_compositor, CompositeStrategy};
use geoexport::core::ledger::ExportLedger;
use geoexport::core::scheduler::{ExportScheduler, SchedulerConfig};
use geoexport::core::tiling::GridRounding;
use geoexport::domain::{
    ActiveJob, DateRange, GeoExportError, JobHandle, JobState, MosaicHandle, Polygon, Result,
    ScheduleInput,
};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;

/// A job accepted by [`FakeImagery`]
#[derive(Debug, Clone)]
pub struct SubmittedJob {
    pub id: JobHandle,
    pub destination: String,
    pub description: String,
    pub bands: Vec<String>,
}

/// Imagery service that keeps every job in memory
#[derive(Default)]
pub struct FakeImagery {
    pub active: Mutex<Vec<ActiveJob>>,
    pub submitted: Mutex<Vec<SubmittedJob>>,
    pub composites: AtomicUsize,
    pub list_calls: AtomicUsize,
    pub state_polls: AtomicUsize,
    pub cancelled: Mutex<Vec<JobHandle>>,
    /// Destinations whose submission is rejected
    pub reject_destinations: Mutex<HashSet<String>>,
    /// States returned by successive polls, per job; the last one repeats
    pub state_script: Mutex<HashMap<String, VecDeque<JobState>>>,
    pub default_state: Mutex<Option<JobState>>,
    pub unauthenticated: bool,
}

impl FakeImagery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unauthenticated() -> Self {
        Self {
            unauthenticated: true,
            ..Self::default()
        }
    }

    /// Adds `count` running jobs with distinct descriptions
    pub fn with_running_jobs(self, count: usize) -> Self {
        {
            let mut active = self.active.lock().unwrap();
            for i in 0..count {
                active.push(ActiveJob {
                    id: JobHandle::new(format!("existing-{i}")).unwrap(),
                    description: format!("unrelated-export-{i}"),
                    state: JobState::Running,
                });
            }
        }
        self
    }

    pub fn with_active_job(self, description: &str, state: JobState) -> Self {
        {
            let mut active = self.active.lock().unwrap();
            let id = JobHandle::new(format!("active-{}", active.len())).unwrap();
            active.push(ActiveJob {
                id,
                description: description.to_string(),
                state,
            });
        }
        self
    }

    pub fn reject_destination(&self, destination: &str) {
        self.reject_destinations
            .lock()
            .unwrap()
            .insert(destination.to_string());
    }

    /// Every job reports `state` unless scripted otherwise
    pub fn report_state(&self, state: JobState) {
        *self.default_state.lock().unwrap() = Some(state);
    }

    pub fn script_states(&self, job: &str, states: Vec<JobState>) {
        self.state_script
            .lock()
            .unwrap()
            .insert(job.to_string(), states.into_iter().collect());
    }

    pub fn submitted(&self) -> Vec<SubmittedJob> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn composite_calls(&self) -> usize {
        self.composites.load(Ordering::SeqCst)
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    fn check_auth(&self) -> Result<()> {
        if self.unauthenticated {
            return Err(GeoExportError::AuthenticationRequired(
                "no credentials".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl ImageryService for FakeImagery {
    async fn authenticate(&self) -> Result<()> {
        self.check_auth()
    }

    async fn composite(&self, request: &CompositeRequest) -> Result<MosaicHandle> {
        self.check_auth()?;
        let n = self.composites.fetch_add(1, Ordering::SeqCst);
        Ok(MosaicHandle::remote(
            format!("mosaic-{n}"),
            request.bands.clone(),
        ))
    }

    async fn submit_export(
        &self,
        image: &MosaicHandle,
        _region: &Polygon,
        destination: &str,
        description: &str,
        _options: &ExportOptions,
    ) -> Result<JobHandle> {
        self.check_auth()?;
        if self.reject_destinations.lock().unwrap().contains(destination) {
            return Err(GeoExportError::UpstreamUnavailable(format!(
                "export to {destination} rejected"
            )));
        }

        let mut submitted = self.submitted.lock().unwrap();
        let id = JobHandle::new(format!("job-{}", submitted.len())).unwrap();
        submitted.push(SubmittedJob {
            id: id.clone(),
            destination: destination.to_string(),
            description: description.to_string(),
            bands: image.bands.clone(),
        });
        self.active.lock().unwrap().push(ActiveJob {
            id: id.clone(),
            description: description.to_string(),
            state: JobState::Queued,
        });
        Ok(id)
    }

    async fn job_state(&self, job: &JobHandle) -> Result<JobState> {
        self.state_polls.fetch_add(1, Ordering::SeqCst);
        let mut script = self.state_script.lock().unwrap();
        if let Some(states) = script.get_mut(job.as_str()) {
            let state = if states.len() > 1 {
                states.pop_front()
            } else {
                states.front().copied()
            };
            if let Some(state) = state {
                return Ok(state);
            }
        }
        Ok(self.default_state.lock().unwrap().unwrap_or(JobState::Running))
    }

    async fn list_active_jobs(&self) -> Result<Vec<ActiveJob>> {
        self.check_auth()?;
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .active
            .lock()
            .unwrap()
            .iter()
            .filter(|job| job.state.is_active())
            .cloned()
            .collect())
    }

    async fn cancel_job(&self, job: &JobHandle) -> Result<()> {
        self.cancelled.lock().unwrap().push(job.clone());
        Ok(())
    }
}

/// Output store backed by a set of object paths
#[derive(Default)]
pub struct MemoryStore {
    pub objects: Mutex<HashSet<String>>,
    pub list_calls: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_objects<I: IntoIterator<Item = String>>(objects: I) -> Self {
        Self {
            objects: Mutex::new(objects.into_iter().collect()),
            list_calls: AtomicUsize::new(0),
        }
    }

    pub fn add(&self, path: impl Into<String>) {
        self.objects.lock().unwrap().insert(path.into());
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OutputStore for MemoryStore {
    async fn list_outputs(&self, prefix: &str) -> Result<Vec<String>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .objects
            .lock()
            .unwrap()
            .iter()
            .filter(|path| path.starts_with(prefix))
            .cloned()
            .collect())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Fixed "today" so future-date checks do not depend on the clock
pub fn today() -> NaiveDate {
    date(2024, 6, 1)
}

/// A year of dates, twelve 30-day steps
pub fn year() -> DateRange {
    DateRange::new(date(2021, 1, 1), date(2021, 12, 27)).unwrap()
}

pub fn point(lat: f64, lon: f64) -> ScheduleInput {
    ScheduleInput::Point {
        lat,
        lon,
        dates: year(),
    }
}

pub fn scheduler_config() -> SchedulerConfig {
    SchedulerConfig {
        storage_prefix: "tifs".to_string(),
        surrounding_metres: 80.0,
        days_per_timestep: 30,
        rounding: GridRounding::Truncate,
        max_pending_jobs: 3000,
        check_storage: true,
        check_pending: true,
        monitor: false,
        poll_interval: Duration::from_millis(10),
        dry_run: false,
        export_options: ExportOptions::new("crop-mask-tifs"),
    }
}

/// Scheduler wired to the given fakes with the fast compositor
pub fn scheduler(
    config: SchedulerConfig,
    imagery: Arc<FakeImagery>,
    store: Arc<MemoryStore>,
    shutdown: watch::Receiver<bool>,
) -> ExportScheduler {
    let ledger = Arc::new(ExportLedger::new(imagery.clone(), store));
    let compositor = build_compositor(CompositeStrategy::Fast, imagery.clone());
    ExportScheduler::new(config, imagery, compositor, ledger, shutdown).with_today(today())
}
