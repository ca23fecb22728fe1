//! # Scheduler trait.
//!
//! Provides [`Scheduler`], the "run this unit of work, possibly on another thread,
//! possibly later" capability used by `subscribe_on` and `observe_on`.
//!
//! ## Rules
//! - Each submission runs **at most once**.
//! - No ordering across submissions is promised by the trait; the
//!   [`SingleThreadScheduler`](super::SingleThreadScheduler) happens to run them FIFO.
//! - Submitted work cannot be cancelled.
//! - A panic inside a unit of work is caught at the worker and logged; the worker
//!   keeps running.
//!
//! ## Thread names
//! Every worker is named `<prefix>-<kind>-<pool>-<n>`, where `pool` is a
//! process-wide sequence assigned per scheduler instance and `n` counts threads
//! inside that pool.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use crate::error::SchedulerError;

/// Global pool counter for thread naming.
static POOL_SEQ: AtomicU64 = AtomicU64::new(0);

/// A unit of work accepted by [`Scheduler::submit`].
pub type Work = Box<dyn FnOnce() + Send + 'static>;

/// Shared handle to a scheduler (`Arc<dyn Scheduler>`).
pub type SchedulerRef = Arc<dyn Scheduler>;

/// Work-submission capability backed by scheduler-owned threads.
///
/// # Example
/// ```
/// use std::sync::mpsc;
/// use rxflow::{Scheduler, SingleThreadScheduler};
///
/// let single = SingleThreadScheduler::new().unwrap();
/// let (tx, rx) = mpsc::channel();
/// single
///     .submit(Box::new(move || {
///         let _ = tx.send(std::thread::current().name().map(str::to_owned));
///     }))
///     .unwrap();
///
/// let name = rx.recv().unwrap().unwrap();
/// assert!(name.starts_with("rxflow-single-"));
/// ```
pub trait Scheduler: Send + Sync + 'static {
    /// Queues `work` for asynchronous execution on a scheduler thread.
    ///
    /// Returns [`SchedulerError::Closed`] if no worker can take it.
    fn submit(&self, work: Work) -> Result<(), SchedulerError>;

    /// Returns the scheduler name used in logs and errors.
    ///
    /// The default uses `type_name::<Self>()`; built-in schedulers override it.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Runs one unit of work, catching and logging a panic.
pub(crate) fn run_isolated(scheduler: &'static str, work: Work) {
    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(work)) {
        tracing::error!(
            scheduler,
            panic = %panic_message(payload.as_ref()),
            "unit of work panicked"
        );
    }
}

/// Renders a panic payload as text.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Returns a thread-name generator for a new pool of the given kind.
pub(crate) fn thread_namer(
    prefix: &str,
    kind: &'static str,
) -> impl Fn() -> String + Send + Sync + 'static {
    let pool = POOL_SEQ.fetch_add(1, Ordering::Relaxed) + 1;
    let next = AtomicUsize::new(0);
    let prefix = prefix.to_owned();
    move || {
        let n = next.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{prefix}-{kind}-{pool}-{n}")
    }
}
