//! Types exchanged with the remote imagery service

use super::ids::JobHandle;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a remote export job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    /// Accepted but not yet started
    Queued,
    /// Currently executing
    Running,
    /// Finished and the output was written
    Completed,
    /// Finished with an error
    Failed,
    /// Cancelled before completion
    Cancelled,
}

impl JobState {
    /// Queued or running
    pub fn is_active(&self) -> bool {
        matches!(self, JobState::Queued | JobState::Running)
    }

    /// Completed, failed or cancelled
    pub fn is_terminal(&self) -> bool {
        !self.is_active()
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobState::Queued => "queued",
            JobState::Running => "running",
            JobState::Completed => "completed",
            JobState::Failed => "failed",
            JobState::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// A job as listed by the imagery service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveJob {
    pub id: JobHandle,
    pub description: String,
    pub state: JobState,
}

/// Reference to an image held by the imagery service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageRef {
    /// A single image materialised remotely
    Remote(String),
    /// Images whose bands are concatenated in order
    Stack(Vec<ImageRef>),
}

/// Opaque handle to a mosaic understood by the imagery service.
///
/// `bands` lists the band names in output order; it is what downstream
/// consumers slice positionally into per-timestep groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MosaicHandle {
    pub image: ImageRef,
    pub bands: Vec<String>,
}

impl MosaicHandle {
    /// Handle to a single remote image
    pub fn remote(reference: impl Into<String>, bands: Vec<String>) -> Self {
        Self {
            image: ImageRef::Remote(reference.into()),
            bands,
        }
    }

    pub fn band_count(&self) -> usize {
        self.bands.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_state_activity() {
        assert!(JobState::Queued.is_active());
        assert!(JobState::Running.is_active());
        assert!(JobState::Completed.is_terminal());
        assert!(JobState::Failed.is_terminal());
        assert!(JobState::Cancelled.is_terminal());
    }

    #[test]
    fn test_job_state_serialization() {
        assert_eq!(serde_json::to_string(&JobState::Running).unwrap(), "\"running\"");
        let state: JobState = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(state, JobState::Cancelled);
    }

    #[test]
    fn test_image_ref_serialization() {
        let stack = ImageRef::Stack(vec![
            ImageRef::Remote("a".to_string()),
            ImageRef::Remote("b".to_string()),
        ]);
        let json = serde_json::to_value(&stack).unwrap();
        assert_eq!(json["stack"][1]["remote"], "b");
    }
}
