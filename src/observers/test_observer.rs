//! # TestObserver: recording consumer for tests and diagnostics
//!
//! [`TestObserver`] records everything it receives together with the name of the
//! thread each event arrived on, and lets the caller block until the stream ends.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use rxflow::{Stream, TestObserver};
//!
//! let obs = TestObserver::<i32>::new();
//! Stream::of(vec![1, 2, 3]).subscribe(obs.clone());
//!
//! assert!(obs.await_terminal(Duration::from_secs(1)));
//! assert_eq!(obs.values(), vec![1, 2, 3]);
//! assert_eq!(obs.completions(), 1);
//! ```

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::observer::{Observer, Signal};
use crate::error::StreamError;

struct Recorded<T> {
    events: Vec<Signal<T>>,
    threads: Vec<Option<String>>,
}

/// Observer that records events and delivery threads.
pub struct TestObserver<T> {
    state: Mutex<Recorded<T>>,
    changed: Condvar,
    token: CancellationToken,
}

impl<T: Send + 'static> TestObserver<T> {
    /// Creates an empty recorder.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(Recorded {
                events: Vec::new(),
                threads: Vec::new(),
            }),
            changed: Condvar::new(),
            token: CancellationToken::new(),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Recorded<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, signal: Signal<T>) {
        let name = thread::current().name().map(str::to_owned);
        let mut state = self.lock();
        state.events.push(signal);
        state.threads.push(name);
        drop(state);
        self.changed.notify_all();
    }

    /// Number of `on_complete` calls received.
    pub fn completions(&self) -> usize {
        self.lock()
            .events
            .iter()
            .filter(|s| matches!(s, Signal::Complete))
            .count()
    }

    /// Errors received, in order.
    pub fn errors(&self) -> Vec<StreamError> {
        self.lock()
            .events
            .iter()
            .filter_map(|s| match s {
                Signal::Error(e) => Some(e.clone()),
                _ => None,
            })
            .collect()
    }

    /// Number of `on_next` calls received.
    pub fn value_count(&self) -> usize {
        self.lock()
            .events
            .iter()
            .filter(|s| matches!(s, Signal::Next(_)))
            .count()
    }

    /// Thread name per received event, in arrival order.
    pub fn threads(&self) -> Vec<Option<String>> {
        self.lock().threads.clone()
    }

    /// Blocks until a terminal event arrives or `timeout` elapses.
    ///
    /// Returns `true` if the stream terminated in time.
    pub fn await_terminal(&self, timeout: Duration) -> bool {
        self.await_until(timeout, |state| state.events.iter().any(Signal::is_terminal))
    }

    /// Blocks until at least `count` events (of any kind) arrived.
    pub fn await_events(&self, count: usize, timeout: Duration) -> bool {
        self.await_until(timeout, |state| state.events.len() >= count)
    }

    fn await_until(&self, timeout: Duration, done: impl Fn(&Recorded<T>) -> bool) -> bool {
        let guard = self.lock();
        let (guard, _) = self
            .changed
            .wait_timeout_while(guard, timeout, |state| !done(state))
            .unwrap_or_else(PoisonError::into_inner);
        done(&guard)
    }
}

impl<T: Clone + Send + 'static> TestObserver<T> {
    /// Items received, in order.
    pub fn values(&self) -> Vec<T> {
        self.lock()
            .events
            .iter()
            .filter_map(|s| match s {
                Signal::Next(v) => Some(v.clone()),
                _ => None,
            })
            .collect()
    }

    /// Every event received, in order.
    pub fn events(&self) -> Vec<Signal<T>> {
        self.lock().events.clone()
    }
}

impl<T: Send + 'static> Observer<T> for TestObserver<T> {
    fn on_next(&self, item: T) {
        self.record(Signal::Next(item));
    }

    fn on_error(&self, err: StreamError) {
        self.record(Signal::Error(err));
    }

    fn on_complete(&self) {
        self.record(Signal::Complete);
    }

    fn cancel(&self) {
        self.token.cancel();
    }

    fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_in_order_with_threads() {
        let obs = TestObserver::<i32>::new();
        obs.on_next(1);
        obs.on_error(StreamError::failed("x"));

        assert_eq!(
            obs.events(),
            vec![Signal::Next(1), Signal::Error(StreamError::failed("x"))]
        );
        assert_eq!(obs.threads().len(), 2);
        assert_eq!(obs.value_count(), 1);
    }

    #[test]
    fn test_await_terminal_times_out() {
        let obs = TestObserver::<i32>::new();
        obs.on_next(1);
        assert!(!obs.await_terminal(Duration::from_millis(20)));
    }

    #[test]
    fn test_await_terminal_wakes_from_other_thread() {
        let obs = TestObserver::<i32>::new();
        let remote = Arc::clone(&obs);

        let handle = thread::spawn(move || remote.on_complete());

        assert!(obs.await_terminal(Duration::from_secs(1)));
        handle.join().unwrap();
        assert_eq!(obs.completions(), 1);
    }
}
