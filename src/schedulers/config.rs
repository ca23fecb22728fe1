//! # Scheduler configuration.
//!
//! Provides [`SchedulerConfig`], shared settings for building the built-in schedulers.
//!
//! ## Sentinel values
//! - `computation_threads = 0` → one worker per available CPU
//! - `io_max_threads = 0` → runtime default cap for the blocking pool

use std::num::NonZeroUsize;
use std::thread;
use std::time::Duration;

/// Settings used by the built-in schedulers.
///
/// ## Field semantics
/// - `name_prefix`: first segment of every worker thread name
/// - `computation_threads`: fixed computation pool size (`0` = available parallelism)
/// - `io_max_threads`: upper bound on IO threads (`0` = runtime default)
/// - `io_keep_alive`: how long an idle IO thread waits before exiting
///
/// ## Notes
/// All fields are public. Prefer the accessors to avoid sprinkling sentinel checks.
#[derive(Clone, Debug)]
pub struct SchedulerConfig {
    /// Prefix for worker thread names.
    pub name_prefix: String,

    /// Number of computation workers.
    ///
    /// - `0` = `std::thread::available_parallelism()` (falls back to 1)
    /// - `n > 0` = exactly `n` workers
    pub computation_threads: usize,

    /// Maximum number of IO threads alive at once.
    ///
    /// - `0` = runtime default
    /// - `n > 0` = at most `n` threads; extra work waits in the pool queue
    pub io_max_threads: usize,

    /// Idle time after which an IO thread exits.
    pub io_keep_alive: Duration,
}

impl SchedulerConfig {
    /// Returns the resolved computation worker count (always at least 1).
    #[inline]
    pub fn computation_workers(&self) -> usize {
        if self.computation_threads == 0 {
            thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1)
        } else {
            self.computation_threads
        }
    }

    /// Returns the IO thread cap as an `Option`.
    ///
    /// - `None` → runtime default
    /// - `Some(n)` → at most `n` threads
    #[inline]
    pub fn io_thread_limit(&self) -> Option<usize> {
        if self.io_max_threads == 0 {
            None
        } else {
            Some(self.io_max_threads)
        }
    }
}

impl Default for SchedulerConfig {
    /// Default configuration:
    ///
    /// - `name_prefix = "rxflow"`
    /// - `computation_threads = 0` (available parallelism)
    /// - `io_max_threads = 0` (runtime default)
    /// - `io_keep_alive = 60s`
    fn default() -> Self {
        Self {
            name_prefix: "rxflow".to_string(),
            computation_threads: 0,
            io_max_threads: 0,
            io_keep_alive: Duration::from_secs(60),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_threads_resolves_to_parallelism() {
        let cfg = SchedulerConfig::default();
        let expected = thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1);
        assert_eq!(cfg.computation_workers(), expected);
        assert!(cfg.computation_workers() >= 1);
    }

    #[test]
    fn test_explicit_threads_kept() {
        let cfg = SchedulerConfig {
            computation_threads: 3,
            ..SchedulerConfig::default()
        };
        assert_eq!(cfg.computation_workers(), 3);
    }

    #[test]
    fn test_io_limit_sentinel() {
        let mut cfg = SchedulerConfig::default();
        assert_eq!(cfg.io_thread_limit(), None);
        cfg.io_max_threads = 16;
        assert_eq!(cfg.io_thread_limit(), Some(16));
    }
}
