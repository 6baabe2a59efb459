//! Latest-request sequencing.
//!
//! Each guarded call captures a monotonically increasing sequence token at
//! entry; when the call completes, its outcome is honored only if no newer
//! call (or explicit invalidation) bumped the counter in the meantime.
//! Starting order determines supersession, not completion order.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

/// Outcome of a guarded operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guarded<T> {
    /// The call was still the latest at completion; outcome propagates.
    Current(T),
    /// A newer call or an invalidation happened mid-flight; the outcome
    /// (success or failure) was discarded. Not an error.
    Superseded,
}

impl<T> Guarded<T> {
    pub fn is_superseded(&self) -> bool {
        matches!(self, Self::Superseded)
    }

    pub fn into_current(self) -> Option<T> {
        match self {
            Self::Current(value) => Some(value),
            Self::Superseded => None,
        }
    }
}

/// Issues sequence tokens and discards stale outcomes.
///
/// One guard per orchestrator instance; no global state.
#[derive(Debug, Default)]
pub struct SequenceGuard {
    seq: AtomicU64,
}

impl SequenceGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Void every in-flight guarded operation started before this call.
    pub fn invalidate(&self) {
        self.seq.fetch_add(1, Ordering::SeqCst);
    }

    /// Run `operation` under the guard. The call itself becomes the newest;
    /// its outcome is kept only if it is still the newest at completion.
    pub async fn run<F>(&self, operation: F) -> Guarded<F::Output>
    where
        F: Future,
    {
        let my_seq = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        let outcome = operation.await;
        if self.seq.load(Ordering::SeqCst) != my_seq {
            Guarded::Superseded
        } else {
            Guarded::Current(outcome)
        }
    }
}
