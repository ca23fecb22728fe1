//! # Runtime-backed worker pools.
//!
//! - [`ComputationScheduler`]: fixed worker count, for CPU-bound forwarding.
//! - [`IoScheduler`]: grows threads on demand and retires idle ones, for blocking work.
//!
//! Both own a dedicated tokio runtime. Dropping the scheduler releases the runtime
//! without waiting for queued work.
//!
//! ## Architecture
//! ```text
//! submit(work)
//!     │
//!     ├─ Computation ──► runtime.spawn(work)          ──► one of N fixed workers
//!     └─ Io          ──► runtime.spawn_blocking(work) ──► cached blocking thread
//!                                                         (spawned when all busy,
//!                                                          retired after keep-alive)
//! ```

use tokio::runtime::{self, Handle, Runtime};

use super::config::SchedulerConfig;
use super::scheduler::{Scheduler, Work, run_isolated, thread_namer};
use crate::error::SchedulerError;

const COMPUTATION: &str = "computation";
const IO: &str = "io";

/// Owned runtime released in the background on drop.
///
/// Dropping may happen on one of the runtime's own threads (the last handle can
/// live inside submitted work), where a blocking shutdown would panic.
struct OwnedRuntime {
    runtime: Option<Runtime>,
    handle: Handle,
}

impl OwnedRuntime {
    fn new(runtime: Runtime) -> Self {
        Self {
            handle: runtime.handle().clone(),
            runtime: Some(runtime),
        }
    }
}

impl Drop for OwnedRuntime {
    fn drop(&mut self) {
        if let Some(rt) = self.runtime.take() {
            rt.shutdown_background();
        }
    }
}

/// Bounded pool sized to available parallelism (or a caller-specified count).
pub struct ComputationScheduler {
    rt: OwnedRuntime,
    workers: usize,
}

impl ComputationScheduler {
    /// Creates a pool with one worker per available CPU.
    pub fn new() -> Result<Self, SchedulerError> {
        Self::with_config(&SchedulerConfig::default())
    }

    /// Creates a pool with exactly `threads` workers (`0` = available parallelism).
    pub fn with_threads(threads: usize) -> Result<Self, SchedulerError> {
        Self::with_config(&SchedulerConfig {
            computation_threads: threads,
            ..SchedulerConfig::default()
        })
    }

    /// Creates a pool from `cfg`.
    pub fn with_config(cfg: &SchedulerConfig) -> Result<Self, SchedulerError> {
        let workers = cfg.computation_workers();
        let runtime = runtime::Builder::new_multi_thread()
            .worker_threads(workers)
            .thread_name_fn(thread_namer(&cfg.name_prefix, COMPUTATION))
            .build()
            .map_err(|source| SchedulerError::Spawn {
                scheduler: COMPUTATION,
                source,
            })?;

        tracing::debug!(scheduler = COMPUTATION, workers, "scheduler started");
        Ok(Self {
            rt: OwnedRuntime::new(runtime),
            workers,
        })
    }

    /// Number of fixed workers.
    #[must_use]
    pub fn workers(&self) -> usize {
        self.workers
    }
}

impl Scheduler for ComputationScheduler {
    fn submit(&self, work: Work) -> Result<(), SchedulerError> {
        self.rt
            .handle
            .spawn(async move { run_isolated(COMPUTATION, work) });
        Ok(())
    }

    fn name(&self) -> &'static str {
        COMPUTATION
    }
}

/// Unbounded-growth pool for blocking work.
pub struct IoScheduler {
    rt: OwnedRuntime,
}

impl IoScheduler {
    /// Creates a pool with default limits.
    pub fn new() -> Result<Self, SchedulerError> {
        Self::with_config(&SchedulerConfig::default())
    }

    /// Creates a pool from `cfg`.
    pub fn with_config(cfg: &SchedulerConfig) -> Result<Self, SchedulerError> {
        // Only the blocking pool is used; a current-thread runtime starts no
        // async worker of its own.
        let mut builder = runtime::Builder::new_current_thread();
        builder
            .thread_keep_alive(cfg.io_keep_alive)
            .thread_name_fn(thread_namer(&cfg.name_prefix, IO));
        if let Some(limit) = cfg.io_thread_limit() {
            builder.max_blocking_threads(limit);
        }
        let runtime = builder.build().map_err(|source| SchedulerError::Spawn {
            scheduler: IO,
            source,
        })?;

        tracing::debug!(scheduler = IO, limit = ?cfg.io_thread_limit(), "scheduler started");
        Ok(Self {
            rt: OwnedRuntime::new(runtime),
        })
    }
}

impl Scheduler for IoScheduler {
    fn submit(&self, work: Work) -> Result<(), SchedulerError> {
        self.rt
            .handle
            .spawn_blocking(move || run_isolated(IO, work));
        Ok(())
    }

    fn name(&self) -> &'static str {
        IO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::{Arc, Barrier, mpsc};
    use std::time::Duration;

    fn current_name() -> String {
        std::thread::current().name().unwrap_or("").to_string()
    }

    #[test]
    fn test_computation_runs_off_caller_thread() {
        let sched = ComputationScheduler::with_threads(2).unwrap();
        let (tx, rx) = mpsc::channel();

        sched
            .submit(Box::new(move || tx.send(current_name()).unwrap()))
            .unwrap();

        let name = rx.recv_timeout(Duration::from_secs(1)).unwrap();
        assert!(name.contains("-computation-"), "unexpected name {name}");
        assert_ne!(name, current_name());
        assert_eq!(sched.workers(), 2);
    }

    #[test]
    fn test_computation_uses_at_most_configured_workers() {
        let sched = ComputationScheduler::with_threads(2).unwrap();
        let (tx, rx) = mpsc::channel();

        for _ in 0..64 {
            let tx = tx.clone();
            sched
                .submit(Box::new(move || tx.send(current_name()).unwrap()))
                .unwrap();
        }
        drop(tx);

        let names: HashSet<String> = (0..64)
            .map(|_| rx.recv_timeout(Duration::from_secs(1)).unwrap())
            .collect();
        assert!(!names.is_empty());
        assert!(names.len() <= 2, "saw {names:?}");
    }

    #[test]
    fn test_io_grows_for_blocking_work() {
        let sched = IoScheduler::new().unwrap();
        let barrier = Arc::new(Barrier::new(4));
        let (tx, rx) = mpsc::channel();

        // Four units that block until all four run at once.
        for _ in 0..4 {
            let barrier = Arc::clone(&barrier);
            let tx = tx.clone();
            sched
                .submit(Box::new(move || {
                    barrier.wait();
                    tx.send(current_name()).unwrap();
                }))
                .unwrap();
        }

        let names: HashSet<String> = (0..4)
            .map(|_| rx.recv_timeout(Duration::from_secs(2)).unwrap())
            .collect();
        assert_eq!(names.len(), 4);
        assert!(names.iter().all(|n| n.contains("-io-")));
    }

    #[test]
    fn test_io_first_thread_is_first_in_pool() {
        let sched = IoScheduler::new().unwrap();
        let (tx, rx) = mpsc::channel();

        sched
            .submit(Box::new(move || tx.send(current_name()).unwrap()))
            .unwrap();

        let name = rx.recv_timeout(Duration::from_secs(1)).unwrap();
        assert!(name.contains("-io-"), "unexpected name {name}");
        assert!(name.ends_with("-1"), "an idle worker took a name first: {name}");
    }

    #[test]
    fn test_worker_survives_panicking_work() {
        let sched = ComputationScheduler::with_threads(1).unwrap();
        let (tx, rx) = mpsc::channel();

        sched.submit(Box::new(|| panic!("boom"))).unwrap();
        sched.submit(Box::new(move || tx.send(7).unwrap())).unwrap();

        assert_eq!(rx.recv_timeout(Duration::from_secs(1)).unwrap(), 7);
    }

    #[test]
    fn test_distinct_pools_have_distinct_names() {
        let a = ComputationScheduler::with_threads(1).unwrap();
        let b = ComputationScheduler::with_threads(1).unwrap();
        let (tx, rx) = mpsc::channel();

        let tx_a = tx.clone();
        a.submit(Box::new(move || tx_a.send(current_name()).unwrap()))
            .unwrap();
        b.submit(Box::new(move || tx.send(current_name()).unwrap()))
            .unwrap();

        let first = rx.recv_timeout(Duration::from_secs(1)).unwrap();
        let second = rx.recv_timeout(Duration::from_secs(1)).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_drop_from_own_worker_does_not_panic() {
        let sched: Arc<ComputationScheduler> =
            Arc::new(ComputationScheduler::with_threads(1).unwrap());
        let (tx, rx) = mpsc::channel();

        let inner = Arc::clone(&sched);
        sched
            .submit(Box::new(move || {
                // Last handle is released on the worker itself.
                drop(inner);
                tx.send(()).unwrap();
            }))
            .unwrap();
        drop(sched);

        rx.recv_timeout(Duration::from_secs(1)).unwrap();
    }
}
