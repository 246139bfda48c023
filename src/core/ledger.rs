//! Export ledger: what already exists and what is already queued
//!
//! The ledger enumerates durable storage and the remote job list and freezes
//! the result into a [`LedgerSnapshot`] that a scheduling pass consults before
//! every submission. Enumerations are memoised inside the ledger value, so a
//! ledger shared across passes queries each source at most once until
//! [`ExportLedger::invalidate`] is called.
//!
//! A snapshot can be stale by the time a request is submitted. Under
//! concurrent external submission this can lead to a duplicate job; that risk
//! is accepted.

use crate::adapters::imagery::ImageryService;
use crate::adapters::storage::OutputStore;
use crate::domain::{ExportRequest, Result};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Remote concurrent-job ceiling of the imagery service
pub const DEFAULT_MAX_PENDING_JOBS: usize = 3000;

/// Immutable view of storage and the remote job queue for one pass
#[derive(Debug, Clone)]
pub struct LedgerSnapshot {
    existing_outputs: HashSet<String>,
    pending_jobs: HashSet<String>,
    pending_count: usize,
    storage_checked: bool,
    pending_checked: bool,
    taken_at: DateTime<Utc>,
}

impl LedgerSnapshot {
    /// A snapshot in which nothing exists and nothing is pending
    pub fn empty() -> Self {
        Self {
            existing_outputs: HashSet::new(),
            pending_jobs: HashSet::new(),
            pending_count: 0,
            storage_checked: false,
            pending_checked: false,
            taken_at: Utc::now(),
        }
    }

    /// Builds a snapshot from output paths and pending job descriptions
    ///
    /// Every description counts towards capacity, duplicates included.
    pub fn from_parts<O, P>(existing_outputs: O, pending_descriptions: P) -> Self
    where
        O: IntoIterator<Item = String>,
        P: IntoIterator<Item = String>,
    {
        let mut pending_jobs = HashSet::new();
        let mut pending_count = 0;
        for description in pending_descriptions {
            pending_jobs.insert(description);
            pending_count += 1;
        }

        Self {
            existing_outputs: existing_outputs.into_iter().collect(),
            pending_jobs,
            pending_count,
            storage_checked: true,
            pending_checked: true,
            taken_at: Utc::now(),
        }
    }

    /// Whether the request's output is already in durable storage
    pub fn exists(&self, request: &ExportRequest) -> bool {
        self.existing_outputs.contains(&request.output_path())
    }

    /// Whether a job with the request's description is queued or running
    pub fn is_pending(&self, request: &ExportRequest) -> bool {
        self.pending_jobs.contains(&request.description())
    }

    /// Whether the number of active remote jobs has reached `cap`
    pub fn at_capacity(&self, cap: usize) -> bool {
        self.pending_count >= cap
    }

    pub fn existing_output_count(&self) -> usize {
        self.existing_outputs.len()
    }

    /// Number of active remote jobs when the snapshot was taken
    pub fn pending_count(&self) -> usize {
        self.pending_count
    }

    pub fn storage_checked(&self) -> bool {
        self.storage_checked
    }

    pub fn pending_checked(&self) -> bool {
        self.pending_checked
    }

    pub fn taken_at(&self) -> DateTime<Utc> {
        self.taken_at
    }
}

impl Default for LedgerSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}

#[derive(Debug, Default)]
struct Memo {
    outputs: HashMap<String, HashSet<String>>,
    pending: Option<(HashSet<String>, usize)>,
}

/// Builds [`LedgerSnapshot`]s from an output store and the imagery service
pub struct ExportLedger {
    imagery: Arc<dyn ImageryService>,
    store: Arc<dyn OutputStore>,
    memo: Mutex<Memo>,
}

impl ExportLedger {
    pub fn new(imagery: Arc<dyn ImageryService>, store: Arc<dyn OutputStore>) -> Self {
        Self {
            imagery,
            store,
            memo: Mutex::new(Memo::default()),
        }
    }

    /// Takes a snapshot
    ///
    /// Storage listings are memoised per prefix and the pending-job listing
    /// once per ledger. A disabled check leaves the matching set empty.
    ///
    /// # Errors
    ///
    /// Propagates listing failures. `AuthenticationRequired` from either
    /// source must abort the run.
    pub async fn snapshot(
        &self,
        storage_prefix: &str,
        include_storage_check: bool,
        include_pending_check: bool,
    ) -> Result<LedgerSnapshot> {
        let mut memo = self.memo.lock().await;
        let mut snapshot = LedgerSnapshot::empty();

        if include_storage_check {
            let outputs = match memo.outputs.get(storage_prefix).cloned() {
                Some(outputs) => outputs,
                None => {
                    tracing::info!(
                        location = %self.store.location(),
                        prefix = storage_prefix,
                        "Listing existing outputs"
                    );
                    let listed: HashSet<String> = self
                        .store
                        .list_outputs(storage_prefix)
                        .await?
                        .into_iter()
                        .collect();
                    memo.outputs.insert(storage_prefix.to_string(), listed.clone());
                    listed
                }
            };
            snapshot.existing_outputs = outputs;
            snapshot.storage_checked = true;
        }

        if include_pending_check {
            let (pending, count) = match memo.pending.clone() {
                Some(pending) => pending,
                None => {
                    tracing::info!("Listing active export jobs");
                    let jobs = self.imagery.list_active_jobs().await?;
                    let count = jobs.iter().filter(|j| j.state.is_active()).count();
                    let descriptions: HashSet<String> = jobs
                        .into_iter()
                        .filter(|j| j.state.is_active())
                        .map(|j| j.description)
                        .collect();
                    memo.pending = Some((descriptions.clone(), count));
                    (descriptions, count)
                }
            };
            snapshot.pending_jobs = pending;
            snapshot.pending_count = count;
            snapshot.pending_checked = true;
        }

        tracing::debug!(
            existing_outputs = snapshot.existing_outputs.len(),
            pending_jobs = snapshot.pending_count,
            "Ledger snapshot taken"
        );

        Ok(snapshot)
    }

    /// Drops memoised listings so the next snapshot enumerates again
    pub async fn invalidate(&self) {
        let mut memo = self.memo.lock().await;
        *memo = Memo::default();
    }
}
