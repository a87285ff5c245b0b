//! Debounced, version-stamped validation scheduling.
//!
//! Every edit restarts a per-platform quiet-period timer. When a timer fires
//! the draft and its edit version are captured together and sent to the
//! [`ValidationService`]; the response is merged only if the version is still
//! live. In-flight calls are never aborted, late answers are just dropped.

use crate::api::traits::{ValidationRequest, ValidationService};
use crate::content::PlatformKey;
use crate::review::store::ContentStore;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

pub type SharedStore = Arc<Mutex<ContentStore>>;

pub(crate) fn lock_store(store: &Mutex<ContentStore>) -> MutexGuard<'_, ContentStore> {
    store.lock().unwrap_or_else(PoisonError::into_inner)
}

struct PendingTimer {
    ticket: u64,
    handle: JoinHandle<()>,
}

struct Inner {
    store: SharedStore,
    validator: Arc<dyn ValidationService>,
    quiet_period: Duration,
    timers: Mutex<HashMap<PlatformKey, PendingTimer>>,
    next_ticket: AtomicU64,
    active: AtomicUsize,
    idle: Notify,
}

/// Decrements the active-task count when a task finishes or is aborted.
struct ActiveTask(Arc<Inner>);

impl ActiveTask {
    fn start(inner: &Arc<Inner>) -> Self {
        inner.active.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(inner))
    }
}

impl Drop for ActiveTask {
    fn drop(&mut self) {
        if self.0.active.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.0.idle.notify_waiters();
        }
    }
}

impl Inner {
    fn timers(&self) -> MutexGuard<'_, HashMap<PlatformKey, PendingTimer>> {
        self.timers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Claim the timer slot for `platform` if `ticket` still owns it.
    fn fire(&self, platform: &PlatformKey, ticket: u64) -> bool {
        let mut timers = self.timers();
        if timers.get(platform).is_some_and(|timer| timer.ticket == ticket) {
            timers.remove(platform);
            true
        } else {
            false
        }
    }

    fn cancel_timer(&self, platform: &PlatformKey) {
        if let Some(timer) = self.timers().remove(platform) {
            timer.handle.abort();
        }
    }

    /// Validate the live draft of `platform` and merge the answer if it is
    /// still current. Returns whether a result was merged.
    async fn run(&self, platform: &PlatformKey) -> bool {
        let snapshot = lock_store(&self.store).snapshot(platform);
        let Some((draft, version)) = snapshot else {
            tracing::debug!(%platform, "skipping validation for platform without draft");
            return false;
        };
        let request = ValidationRequest::from_draft(&draft);

        match self.validator.validate(&request).await {
            Ok(result) => {
                let merged = lock_store(&self.store).merge_validation_result(platform, version, result);
                tracing::debug!(%platform, %version, merged, "validation completed");
                merged
            }
            Err(error) => {
                tracing::warn!(%platform, %version, %error, "validation failed; keeping last result");
                lock_store(&self.store).record_validation_failure(platform, version, error.to_string());
                false
            }
        }
    }
}

#[derive(Clone)]
pub struct ValidationOrchestrator {
    inner: Arc<Inner>,
}

impl ValidationOrchestrator {
    pub fn new(
        store: SharedStore,
        validator: Arc<dyn ValidationService>,
        quiet_period: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                validator,
                quiet_period,
                timers: Mutex::new(HashMap::new()),
                next_ticket: AtomicU64::new(0),
                active: AtomicUsize::new(0),
                idle: Notify::new(),
            }),
        }
    }

    pub fn quiet_period(&self) -> Duration {
        self.inner.quiet_period
    }

    /// (Re)start the quiet-period timer for `platform`. A pending timer for
    /// the same platform is replaced, never stacked.
    pub fn schedule(&self, platform: &PlatformKey) {
        let ticket = self.inner.next_ticket.fetch_add(1, Ordering::Relaxed);
        let guard = ActiveTask::start(&self.inner);
        let inner = Arc::clone(&self.inner);
        let key = platform.clone();

        let mut timers = self.inner.timers();
        let handle = tokio::spawn(async move {
            let _guard = guard;
            tokio::time::sleep(inner.quiet_period).await;
            if inner.fire(&key, ticket) {
                inner.run(&key).await;
            }
        });
        if let Some(previous) = timers.insert(platform.clone(), PendingTimer { ticket, handle }) {
            previous.handle.abort();
        }
    }

    /// Validate `platform` immediately, skipping the quiet period.
    pub async fn validate_now(&self, platform: &PlatformKey) -> bool {
        self.inner.cancel_timer(platform);
        let _guard = ActiveTask::start(&self.inner);
        self.inner.run(platform).await
    }

    /// Kick off an immediate validation of every draft in the background.
    pub fn validate_all(&self) {
        let platforms: Vec<PlatformKey> = lock_store(&self.inner.store).platforms().cloned().collect();
        for platform in platforms {
            self.inner.cancel_timer(&platform);
            let guard = ActiveTask::start(&self.inner);
            let inner = Arc::clone(&self.inner);
            tokio::spawn(async move {
                let _guard = guard;
                inner.run(&platform).await;
            });
        }
    }

    /// Drop every pending timer. In-flight calls finish and are discarded by
    /// version if the state moved on.
    pub fn cancel_all(&self) {
        for (_, timer) in self.inner.timers().drain() {
            timer.handle.abort();
        }
    }

    pub fn pending_timers(&self) -> usize {
        self.inner.timers().len()
    }

    pub fn is_idle(&self) -> bool {
        self.inner.active.load(Ordering::SeqCst) == 0
    }

    /// Wait until no timer is pending and no validation call is in flight.
    pub async fn settle(&self) {
        loop {
            let notified = self.inner.idle.notified();
            if self.is_idle() {
                return;
            }
            notified.await;
        }
    }
}
