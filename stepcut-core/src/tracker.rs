//! Last-known view of a single job
//!
//! Job status only moves forward on the service, but responses can arrive
//! late or out of order. The tracker keeps the newest snapshot it has seen
//! and refuses snapshots whose status is behind it.

use serde::Serialize;

use crate::domain::job::{Job, JobStatus};

/// Monotonic holder of the latest job snapshot
///
/// Serializes as the snapshot itself, or `null` before anything was seen.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct JobTracker {
    current: Option<Job>,
}

impl JobTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an already known snapshot (e.g. the creation response)
    pub fn with_snapshot(job: Job) -> Self {
        Self { current: Some(job) }
    }

    /// Records a freshly fetched snapshot
    ///
    /// Returns `false` and keeps the cached snapshot when `job` reports an
    /// earlier lifecycle stage than what was already observed. A snapshot
    /// with the same status replaces the cached one.
    pub fn observe(&mut self, job: Job) -> bool {
        if let Some(current) = &self.current {
            if job.status.rank() < current.status.rank() {
                return false;
            }
        }

        self.current = Some(job);
        true
    }

    pub fn current(&self) -> Option<&Job> {
        self.current.as_ref()
    }

    pub fn status(&self) -> Option<JobStatus> {
        self.current.as_ref().map(|job| job.status)
    }

}
