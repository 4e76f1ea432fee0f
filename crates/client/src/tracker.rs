use std::sync::Arc;

use tokio::sync::watch;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};
use ulid::Ulid;

use vidgen_core::backoff::{BackoffPolicy, RetryDecision};
use vidgen_core::error::{TrackFailure, TrackOutcome};
use vidgen_core::model::{JobId, JobStage, JobStatus};
use vidgen_core::now_ms;

use crate::status::StatusSource;

/// Tuning for a tracking session.
#[derive(Clone, Debug, Default)]
pub struct TrackerConfig {
    /// Retry/backoff policy; its `base_interval` is also the healthy
    /// polling cadence.
    pub backoff: BackoffPolicy,
}

type ProgressFn = Box<dyn Fn(&JobStatus) + Send>;
type TerminalFn = Box<dyn Fn(&TrackOutcome) + Send>;

/// Builder for one tracking session.
///
/// Register observers, then [`spawn`](Tracker::spawn) the polling task.
/// The first status read is issued immediately; afterwards reads follow the
/// configured cadence, with backoff applied across consecutive transport
/// failures. Reads are strictly sequential per session, so observers see
/// events in real-time order.
pub struct Tracker<S> {
    source: S,
    job_id: JobId,
    config: TrackerConfig,
    on_progress: Vec<ProgressFn>,
    on_terminal: Vec<TerminalFn>,
}

impl<S: StatusSource> Tracker<S> {
    /// Starts a session builder for `job_id` with the default config.
    pub fn new(source: S, job_id: JobId) -> Self {
        Self {
            source,
            job_id,
            config: TrackerConfig::default(),
            on_progress: Vec::new(),
            on_terminal: Vec::new(),
        }
    }

    /// Replaces the default config.
    pub fn with_config(mut self, config: TrackerConfig) -> Self {
        self.config = config;
        self
    }

    /// Registers a progress observer.
    ///
    /// Called on every successful status read with the full payload, in
    /// registration order. Reads repeating an identical progress value
    /// still fire; consumers must tolerate no-op updates. Progress values
    /// are forwarded exactly as the service reported them.
    pub fn on_progress(mut self, f: impl Fn(&JobStatus) + Send + 'static) -> Self {
        self.on_progress.push(Box::new(f));
        self
    }

    /// Registers a terminal observer. Called exactly once per session with
    /// the completed status or a structured failure. Cancelled sessions
    /// never call it.
    pub fn on_terminal(mut self, f: impl Fn(&TrackOutcome) + Send + 'static) -> Self {
        self.on_terminal.push(Box::new(f));
        self
    }

    /// Spawns the polling task and returns the session handle.
    ///
    /// Dropping every clone of the handle cancels the session.
    pub fn spawn(self) -> Arc<TrackerHandle> {
        self.spawn_with_cleanup(|_| {})
    }

    pub(crate) fn spawn_with_cleanup(
        self,
        cleanup: impl FnOnce(&str) + Send + 'static,
    ) -> Arc<TrackerHandle> {
        let (stop_tx, stop_rx) = watch::channel(false);
        let (done_tx, done_rx) = watch::channel(false);
        let session_id = Ulid::new().to_string();
        let handle = Arc::new(TrackerHandle {
            job_id: self.job_id.clone(),
            session_id: session_id.clone(),
            started_at_ms: now_ms(),
            stop: stop_tx,
            done: done_rx,
        });
        tokio::spawn(async move {
            run_session(self, stop_rx).await;
            cleanup(&session_id);
            let _ = done_tx.send(true);
        });
        handle
    }
}

/// Handle to a running tracking session.
pub struct TrackerHandle {
    job_id: JobId,
    session_id: String,
    started_at_ms: i64,
    stop: watch::Sender<bool>,
    done: watch::Receiver<bool>,
}

impl TrackerHandle {
    /// Job id this session polls for.
    pub fn job_id(&self) -> &JobId {
        &self.job_id
    }

    /// Unique id of this tracking session (not the job).
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Unix millis when polling began.
    pub fn started_at_ms(&self) -> i64 {
        self.started_at_ms
    }

    /// Requests cancellation.
    ///
    /// Idempotent and safe after termination. A cancelled session clears
    /// its timers, discards any in-flight read, and fires no further
    /// events.
    pub fn cancel(&self) {
        let _ = self.stop.send(true);
    }

    /// True once the session has ended (terminal event dispatched, or
    /// cancelled).
    pub fn is_finished(&self) -> bool {
        *self.done.borrow()
    }

    /// Waits until the session has ended.
    pub async fn wait(&self) {
        let mut done = self.done.clone();
        // An error here means the task is gone, which also means finished.
        let _ = done.wait_for(|d| *d).await;
    }
}

/// Per-session mutable record. Single-writer: only the session's own
/// polling loop touches it.
struct TrackingSession {
    stage: Option<JobStage>,
    consecutive_failures: u32,
    last_status: Option<JobStatus>,
    started: Instant,
}

async fn run_session<S: StatusSource>(t: Tracker<S>, mut stop: watch::Receiver<bool>) {
    let job_id = t.job_id.clone();
    debug!("job {job_id}: tracking started");

    let mut session = TrackingSession {
        stage: None,
        consecutive_failures: 0,
        last_status: None,
        started: Instant::now(),
    };

    let outcome: Option<TrackOutcome> = loop {
        // A cancel can land while a read is in flight; the read future is
        // dropped with its select arm, so a late result is never dispatched.
        let read = tokio::select! {
            _ = stop.changed() => break None,
            res = t.source.fetch_status(&job_id) => res,
        };

        match read {
            Ok(status) => {
                session.consecutive_failures = 0;
                let prev = session.stage;
                session.stage = Some(status.status);
                if prev != Some(status.status) {
                    info!("job {job_id}: stage {}", status.status);
                }
                for f in &t.on_progress {
                    f(&status);
                }
                session.last_status = Some(status.clone());
                match status.status {
                    JobStage::Completed => break Some(TrackOutcome::Completed(status)),
                    JobStage::Failed => {
                        let message = status
                            .error
                            .clone()
                            .unwrap_or_else(|| "unknown error".to_string());
                        break Some(TrackOutcome::Failed(TrackFailure::Reported { message }));
                    }
                    JobStage::Queued | JobStage::Running => {}
                }
            }
            Err(e) => {
                session.consecutive_failures += 1;
                warn!(
                    "job {job_id}: status read failed ({e}); {} consecutive failure(s)",
                    session.consecutive_failures
                );
            }
        }

        match t.config.backoff.next(session.consecutive_failures) {
            RetryDecision::RetryAfter(delay) => {
                tokio::select! {
                    _ = stop.changed() => break None,
                    _ = sleep(delay) => {}
                }
            }
            RetryDecision::GiveUp => {
                break Some(TrackOutcome::Failed(TrackFailure::Timeout {
                    attempts: session.consecutive_failures,
                }));
            }
        }
    };

    match outcome {
        Some(outcome) => {
            match &outcome {
                TrackOutcome::Completed(_) => {
                    info!(
                        "job {job_id}: completed after {:?}",
                        session.started.elapsed()
                    );
                }
                TrackOutcome::Failed(f) => {
                    warn!("job {job_id}: failed after {:?}: {f}", session.started.elapsed());
                }
            }
            for f in &t.on_terminal {
                f(&outcome);
            }
        }
        None => debug!(
            "job {job_id}: tracking cancelled (last known stage: {:?})",
            session.last_status.as_ref().map(|s| s.status)
        ),
    }
}
