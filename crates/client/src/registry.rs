use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

use tracing::debug;

use vidgen_core::model::JobId;

use crate::status::StatusSource;
use crate::tracker::{Tracker, TrackerConfig, TrackerHandle};

type ActiveMap = Mutex<HashMap<JobId, Arc<TrackerHandle>>>;

/// At most one live tracking session per job id.
///
/// [`track`](TrackerRegistry::track) is idempotent: while a session for the
/// id is live, the existing handle is returned and no second polling loop
/// starts. A session removes its own entry once it reaches a terminal state
/// or is cancelled, freeing the id for a later re-generation of the same
/// question.
pub struct TrackerRegistry<S> {
    source: S,
    config: TrackerConfig,
    active: Arc<ActiveMap>,
}

impl<S: StatusSource + Clone> TrackerRegistry<S> {
    /// Registry with the default tracker config.
    pub fn new(source: S) -> Self {
        Self::with_config(source, TrackerConfig::default())
    }

    /// Registry applying `config` to every session it starts.
    pub fn with_config(source: S, config: TrackerConfig) -> Self {
        Self {
            source,
            config,
            active: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Starts tracking `job_id`, or joins the session already live for it.
    ///
    /// `build` registers observers on a fresh session; it is not called
    /// when an existing session is joined, so observers registered by the
    /// first caller are the ones that fire.
    pub fn track(
        &self,
        job_id: JobId,
        build: impl FnOnce(Tracker<S>) -> Tracker<S>,
    ) -> Arc<TrackerHandle> {
        let mut active = self.active.lock().expect("registry mutex poisoned");
        if let Some(existing) = active.get(&job_id) {
            if !existing.is_finished() {
                debug!("job {job_id}: tracker already active; joining");
                return existing.clone();
            }
        }

        let map: Weak<ActiveMap> = Arc::downgrade(&self.active);
        let cleanup_id = job_id.clone();
        let tracker = build(
            Tracker::new(self.source.clone(), job_id.clone()).with_config(self.config.clone()),
        );
        // The session removes its own entry on exit. The session id guard
        // keeps a slow cleanup from evicting a successor session for the
        // same job id.
        let handle = tracker.spawn_with_cleanup(move |session_id| {
            if let Some(map) = map.upgrade() {
                if let Ok(mut m) = map.lock() {
                    if m.get(&cleanup_id).is_some_and(|h| h.session_id() == session_id) {
                        m.remove(&cleanup_id);
                    }
                }
            }
        });
        active.insert(job_id, handle.clone());
        handle
    }

    /// Handle for the live session tracking `job_id`, if any.
    pub fn get(&self, job_id: &JobId) -> Option<Arc<TrackerHandle>> {
        let active = self.active.lock().expect("registry mutex poisoned");
        active
            .get(job_id)
            .filter(|h| !h.is_finished())
            .cloned()
    }

    /// Number of live sessions.
    pub fn active_count(&self) -> usize {
        let active = self.active.lock().expect("registry mutex poisoned");
        active.values().filter(|h| !h.is_finished()).count()
    }

    /// Cancels every live session. Safe to call at shutdown; sessions that
    /// already ended are ignored.
    pub fn cancel_all(&self) {
        let active = self.active.lock().expect("registry mutex poisoned");
        for handle in active.values() {
            handle.cancel();
        }
    }
}
