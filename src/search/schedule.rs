//! One-shot poll timer armed at a server-given wall-clock time.
//!
//! Arms exactly one timer per distinct target time:
//! - re-arming with the same target is a no-op
//! - a new target replaces the pending timer; teardown aborts it
//! - a timer whose fire routine already started is left to finish, since
//!   stale outcomes are discarded by the sequence guard

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::{ApiError, SearchError};
use crate::search::retry::run_with_retry;

struct PendingTimer {
    handle: JoinHandle<()>,
    fired: Arc<AtomicBool>,
}

/// Schedules the results poll for a search job.
pub struct PollSchedule {
    /// Last armed target; kept across disarm so a repeat of the same target
    /// stays a no-op.
    armed: Mutex<Option<DateTime<Utc>>>,
    pending: Mutex<Option<PendingTimer>>,
    poll_retries: u32,
}

impl PollSchedule {
    pub fn new(poll_retries: u32) -> Self {
        Self {
            armed: Mutex::new(None),
            pending: Mutex::new(None),
            poll_retries,
        }
    }

    /// Arm the schedule for `target`.
    ///
    /// `None` cancels any pending timer. A target equal to the previously
    /// armed one is ignored. A now-or-past target runs the fire routine
    /// inline before returning; a future target spawns exactly one timer.
    /// The fire routine retries `fetch` and hands an exhausted failure to
    /// `on_error` instead of propagating it.
    pub async fn arm<F, Fut, G, GFut>(&self, target: Option<DateTime<Utc>>, fetch: F, on_error: G)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ApiError>> + Send + 'static,
        G: FnOnce(SearchError) -> GFut + Send + 'static,
        GFut: Future<Output = ()> + Send + 'static,
    {
        let Some(target) = target else {
            self.cancel_pending();
            return;
        };

        {
            let mut armed = self.armed.lock().expect("schedule lock poisoned");
            if *armed == Some(target) {
                debug!(%target, "poll already armed for target, ignoring");
                return;
            }
            *armed = Some(target);
        }
        self.cancel_pending();

        let retries = self.poll_retries;
        let delay = (target - Utc::now()).to_std().unwrap_or(Duration::ZERO);
        if delay.is_zero() {
            debug!(%target, "target already passed, polling now");
            Self::fire(fetch, on_error, retries).await;
            return;
        }

        debug!(%target, delay_ms = delay.as_millis() as u64, "poll timer armed");
        let fired = Arc::new(AtomicBool::new(false));
        let fired_flag = Arc::clone(&fired);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            fired_flag.store(true, Ordering::SeqCst);
            Self::fire(fetch, on_error, retries).await;
        });

        *self.pending.lock().expect("schedule lock poisoned") = Some(PendingTimer { handle, fired });
    }

    async fn fire<F, Fut, G, GFut>(fetch: F, on_error: G, retries: u32)
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<(), ApiError>>,
        G: FnOnce(SearchError) -> GFut,
        GFut: Future<Output = ()>,
    {
        if let Err(err) = run_with_retry(fetch, retries).await {
            on_error(SearchError::Exhausted(err)).await;
        }
    }

    /// Abort a pending timer, if any. A timer whose fire routine already
    /// started is left running.
    pub fn disarm(&self) {
        self.cancel_pending();
    }

    fn cancel_pending(&self) {
        if let Some(pending) = self.pending.lock().expect("schedule lock poisoned").take() {
            if !pending.fired.load(Ordering::SeqCst) {
                debug!("pending poll timer cancelled");
                pending.handle.abort();
            }
        }
    }
}

impl Drop for PollSchedule {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}
