//! Job status poller
//!
//! Re-fetches a single job on a fixed interval until it reaches `DONE` or
//! `FAILED`, or until the caller stops it. Each snapshot is handed to the
//! caller's callback.
//!
//! The loop sleeps, fetches, and only then schedules the next sleep, so at
//! most one fetch is in flight per job. Failed fetches are logged and the
//! loop carries on at the next tick.

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use stepcut_core::JobTracker;
use stepcut_core::domain::job::{Job, JobStatus};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{self, Duration};
use tracing::{debug, error, info, warn};

use crate::ServiceClient;
use crate::error::{ClientError, Result};

/// Interval used by the CLI when none is configured
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1500);

/// Where the poller reads job snapshots from
#[async_trait]
pub trait JobSource: Send + Sync + 'static {
    /// Fetches the current snapshot of a job
    async fn fetch_job(&self, job_id: &str) -> Result<Job>;
}

#[async_trait]
impl JobSource for ServiceClient {
    async fn fetch_job(&self, job_id: &str) -> Result<Job> {
        self.get_job(job_id).await
    }
}

/// How a poll session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// The job reached `DONE` or `FAILED`
    Terminal(JobStatus),
    /// The caller stopped polling
    Stopped,
    /// The configured failure limit was hit
    GaveUp { failures: u32, last_error: String },
}

/// State shared between a poll task and its handles
#[derive(Debug)]
struct PollState {
    active: AtomicBool,
    wake: Notify,
}

impl PollState {
    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Returns `true` if this call is the one that deactivated the session
    fn deactivate(&self) -> bool {
        self.active.swap(false, Ordering::SeqCst)
    }
}

/// Cloneable handle that can stop a running poll session
///
/// Useful when the poller itself is borrowed elsewhere, e.g. while awaiting
/// [`JobPoller::wait`] next to a Ctrl-C handler.
#[derive(Debug, Clone)]
pub struct PollStopper {
    state: Arc<PollState>,
}

impl PollStopper {
    /// Stops the session. Calling it more than once is a no-op.
    pub fn stop(&self) {
        if self.state.deactivate() {
            self.state.wake.notify_one();
        }
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }
}

struct PollSession {
    job_id: String,
    stopper: PollStopper,
    task: JoinHandle<PollOutcome>,
}

/// Polls one job at a time until it finishes or is stopped
///
/// Dropping the poller stops any running session.
pub struct JobPoller<S: JobSource> {
    source: Arc<S>,
    failure_limit: Option<u32>,
    session: Option<PollSession>,
}

impl<S: JobSource> JobPoller<S> {
    /// Creates a poller that retries failed fetches forever
    pub fn new(source: Arc<S>) -> Self {
        Self {
            source,
            failure_limit: None,
            session: None,
        }
    }

    /// Gives up after `limit` consecutive failed fetches
    ///
    /// A successful fetch resets the count. `None` retries forever.
    pub fn with_failure_limit(mut self, limit: Option<u32>) -> Self {
        self.failure_limit = limit.filter(|limit| *limit > 0);
        self
    }

    /// Starts polling `job_id` every `interval`
    ///
    /// `on_update` receives every successfully fetched snapshot, whether or
    /// not its status changed. Polling stops by itself right after the
    /// callback has seen `DONE` or `FAILED`. A session that is already
    /// running is stopped first.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start<F>(
        &mut self,
        job_id: impl Into<String>,
        on_update: F,
        interval: Duration,
    ) -> Result<()>
    where
        F: FnMut(&Job) + Send + 'static,
    {
        self.spawn(job_id.into(), JobTracker::new(), on_update, interval)
    }

    /// Starts polling a job the caller already holds a snapshot of
    ///
    /// Same as [`start`](Self::start), but fetched snapshots whose status is
    /// behind `known` are dropped instead of delivered.
    pub fn start_from<F>(&mut self, known: Job, on_update: F, interval: Duration) -> Result<()>
    where
        F: FnMut(&Job) + Send + 'static,
    {
        let job_id = known.id.clone();
        self.spawn(job_id, JobTracker::with_snapshot(known), on_update, interval)
    }

    fn spawn<F>(
        &mut self,
        job_id: String,
        tracker: JobTracker,
        on_update: F,
        interval: Duration,
    ) -> Result<()>
    where
        F: FnMut(&Job) + Send + 'static,
    {
        if job_id.trim().is_empty() {
            return Err(ClientError::InvalidRequest(
                "job id cannot be empty".to_string(),
            ));
        }

        if interval.is_zero() {
            return Err(ClientError::InvalidRequest(
                "poll interval must be greater than 0".to_string(),
            ));
        }

        self.stop();

        info!("Polling job {} (interval: {:?})", job_id, interval);

        let state = Arc::new(PollState {
            active: AtomicBool::new(true),
            wake: Notify::new(),
        });

        let task = tokio::spawn(poll_loop(
            Arc::clone(&self.source),
            job_id.clone(),
            interval,
            self.failure_limit,
            tracker,
            Arc::clone(&state),
            on_update,
        ));

        self.session = Some(PollSession {
            job_id,
            stopper: PollStopper { state },
            task,
        });

        Ok(())
    }

    /// Stops polling
    ///
    /// A fetch already in flight is not aborted, but its result is dropped.
    /// Calling this when nothing is being polled is a no-op.
    ///
    /// On a multi-threaded runtime a callback that had already begun when
    /// this is called still runs to completion; no later one is started.
    pub fn stop(&mut self) {
        if let Some(session) = &self.session {
            if session.stopper.is_active() {
                debug!("Stopping poller for job {}", session.job_id);
            }
            session.stopper.stop();
        }
    }

    /// Whether a session is running and has not finished
    pub fn is_active(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|session| session.stopper.is_active())
    }

    /// Handle that stops the current session without borrowing the poller
    pub fn stopper(&self) -> Option<PollStopper> {
        self.session.as_ref().map(|session| session.stopper.clone())
    }

    /// Waits for the current session to end
    ///
    /// Returns `None` when nothing was started.
    pub async fn wait(&mut self) -> Option<PollOutcome> {
        let session = self.session.as_mut()?;

        let outcome = match (&mut session.task).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Poll task for job {} failed: {}", session.job_id, e);
                PollOutcome::Stopped
            }
        };

        self.session = None;
        Some(outcome)
    }
}

impl<S: JobSource> Drop for JobPoller<S> {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Body of a poll session
async fn poll_loop<S, F>(
    source: Arc<S>,
    job_id: String,
    interval: Duration,
    failure_limit: Option<u32>,
    mut tracker: JobTracker,
    state: Arc<PollState>,
    mut on_update: F,
) -> PollOutcome
where
    S: JobSource,
    F: FnMut(&Job) + Send + 'static,
{
    let mut failures: u32 = 0;

    loop {
        tokio::select! {
            _ = time::sleep(interval) => {}
            _ = state.wake.notified() => {}
        }

        if !state.is_active() {
            debug!("Poller for job {} stopped", job_id);
            return PollOutcome::Stopped;
        }

        debug!("Fetching job {}", job_id);
        let result = source.fetch_job(&job_id).await;

        if !state.is_active() {
            debug!("Discarding response for job {} received after stop", job_id);
            return PollOutcome::Stopped;
        }

        match result {
            Ok(job) => {
                failures = 0;
                let status = job.status;

                if !tracker.observe(job) {
                    warn!(
                        "Ignoring stale snapshot of job {}: {} is behind {:?}",
                        job_id,
                        status,
                        tracker.status()
                    );
                    continue;
                }

                let Some(current) = tracker.current() else {
                    continue;
                };

                // stop() may have landed while the snapshot was recorded
                if !state.is_active() {
                    debug!("Poller for job {} stopped before delivery", job_id);
                    return PollOutcome::Stopped;
                }

                on_update(current);

                if current.is_terminal() {
                    state.deactivate();
                    info!("Job {} finished with status {}", job_id, status);
                    return PollOutcome::Terminal(status);
                }
            }
            Err(e) => {
                failures = failures.saturating_add(1);
                warn!(
                    "Failed to fetch job {} ({} in a row): {}",
                    job_id, failures, e
                );

                if failure_limit.is_some_and(|limit| failures >= limit) {
                    state.deactivate();
                    error!("Giving up on job {} after {} failures", job_id, failures);
                    return PollOutcome::GaveUp {
                        failures,
                        last_error: e.to_string(),
                    };
                }
            }
        }
    }
}
