//! # Single dedicated worker.
//!
//! [`SingleThreadScheduler`] owns one OS thread draining an unbounded FIFO queue.
//!
//! ```text
//! submit(work) ──► [unbounded queue] ──► worker thread ──► work()
//!                                              └─────────► panic → logged, next work
//! ```
//!
//! ## Rules
//! - Submissions run in submission order, one at a time.
//! - Dropping the scheduler closes the queue; the worker exits after finishing
//!   what was already queued.

use std::thread;

use tokio::sync::mpsc;

use super::config::SchedulerConfig;
use super::scheduler::{Scheduler, Work, run_isolated, thread_namer};
use crate::error::SchedulerError;

const SINGLE: &str = "single";

/// Scheduler with exactly one worker thread.
pub struct SingleThreadScheduler {
    sender: mpsc::UnboundedSender<Work>,
    thread_name: String,
}

impl SingleThreadScheduler {
    /// Starts the worker with default naming.
    pub fn new() -> Result<Self, SchedulerError> {
        Self::with_config(&SchedulerConfig::default())
    }

    /// Starts the worker using `cfg.name_prefix` for its name.
    pub fn with_config(cfg: &SchedulerConfig) -> Result<Self, SchedulerError> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Work>();
        let thread_name = thread_namer(&cfg.name_prefix, SINGLE)();

        thread::Builder::new()
            .name(thread_name.clone())
            .spawn(move || {
                while let Some(work) = rx.blocking_recv() {
                    run_isolated(SINGLE, work);
                }
                tracing::debug!(scheduler = SINGLE, "worker exited: queue closed");
            })
            .map_err(|source| SchedulerError::Spawn {
                scheduler: SINGLE,
                source,
            })?;

        Ok(Self {
            sender: tx,
            thread_name,
        })
    }

    /// Name of the worker thread.
    #[must_use]
    pub fn thread_name(&self) -> &str {
        &self.thread_name
    }
}

impl Scheduler for SingleThreadScheduler {
    fn submit(&self, work: Work) -> Result<(), SchedulerError> {
        self.sender
            .send(work)
            .map_err(|_| SchedulerError::Closed { scheduler: SINGLE })
    }

    fn name(&self) -> &'static str {
        SINGLE
    }
}
