//! Price-search job subsystem.
//!
//! Core components:
//! - `retry` — fixed-count immediate retry for fallible async operations
//! - `guard` — latest-request sequencing; stale outcomes are discarded
//! - `schedule` — one-shot poll timer armed at a server-given wall-clock time
//! - `job` — search phase machine (Idle → Starting → Waiting → Polling → ...)
//! - `orchestrator` — composition root owning the job token and the commits

pub mod guard;
pub mod job;
pub mod orchestrator;
pub mod retry;
pub mod schedule;

pub use guard::{Guarded, SequenceGuard};
pub use job::SearchPhase;
pub use orchestrator::{SearchEvent, SearchOrchestrator};
pub use retry::{ExhaustedRetries, run_with_retry};
pub use schedule::PollSchedule;
