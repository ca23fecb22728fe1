//! # Closure-backed observer (`ObserverFn`)
//!
//! [`ObserverFn`] builds an [`Observer`] from closures, so call sites do not need a
//! dedicated type per consumer.
//!
//! - `on_next` is required.
//! - `on_error` defaults to logging the failure at `warn`.
//! - `on_complete` defaults to a no-op.
//! - The cancellation flag is a [`CancellationToken`]; pass your own with
//!   [`ObserverFn::with_token`] to cancel from inside a callback.
//!
//! ## Example
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use rxflow::{ObserverFn, Stream};
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = Arc::clone(&seen);
//!
//! Stream::of(1..=3).subscribe(ObserverFn::arc(move |v: i32| {
//!     sink.lock().unwrap().push(v);
//! }));
//!
//! assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3]);
//! ```

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::observer::Observer;
use crate::error::StreamError;

type NextFn<T> = Box<dyn Fn(T) + Send + Sync>;
type ErrorFn = Box<dyn Fn(StreamError) + Send + Sync>;
type CompleteFn = Box<dyn Fn() + Send + Sync>;

/// Function-backed observer implementation.
pub struct ObserverFn<T> {
    next: NextFn<T>,
    error: ErrorFn,
    complete: CompleteFn,
    token: CancellationToken,
}

impl<T: Send + 'static> ObserverFn<T> {
    /// Creates an observer that handles items with `on_next`.
    pub fn new(on_next: impl Fn(T) + Send + Sync + 'static) -> Self {
        Self {
            next: Box::new(on_next),
            error: Box::new(|err: StreamError| {
                tracing::warn!(label = err.as_label(), error = %err, "unhandled stream error");
            }),
            complete: Box::new(|| {}),
            token: CancellationToken::new(),
        }
    }

    /// Creates the observer and returns it as a shared handle.
    pub fn arc(on_next: impl Fn(T) + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self::new(on_next))
    }

    /// Sets the failure handler.
    #[must_use]
    pub fn with_error(mut self, on_error: impl Fn(StreamError) + Send + Sync + 'static) -> Self {
        self.error = Box::new(on_error);
        self
    }

    /// Sets the completion handler.
    #[must_use]
    pub fn with_complete(mut self, on_complete: impl Fn() + Send + Sync + 'static) -> Self {
        self.complete = Box::new(on_complete);
        self
    }

    /// Uses `token` as this observer's cancellation flag.
    #[must_use]
    pub fn with_token(mut self, token: CancellationToken) -> Self {
        self.token = token;
        self
    }
}

impl<T: Send + 'static> Observer<T> for ObserverFn<T> {
    fn on_next(&self, item: T) {
        (self.next)(item)
    }

    fn on_error(&self, err: StreamError) {
        (self.error)(err)
    }

    fn on_complete(&self) {
        (self.complete)()
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
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_callbacks_routed() {
        let nexts = Arc::new(AtomicUsize::new(0));
        let completes = Arc::new(AtomicUsize::new(0));
        let errors = Arc::new(AtomicUsize::new(0));

        let (n, c, e) = (nexts.clone(), completes.clone(), errors.clone());
        let obs = ObserverFn::new(move |_: u8| {
            n.fetch_add(1, Ordering::SeqCst);
        })
        .with_complete(move || {
            c.fetch_add(1, Ordering::SeqCst);
        })
        .with_error(move |_| {
            e.fetch_add(1, Ordering::SeqCst);
        });

        obs.on_next(1);
        obs.on_next(2);
        obs.on_error(StreamError::failed("x"));
        obs.on_complete();

        assert_eq!(nexts.load(Ordering::SeqCst), 2);
        assert_eq!(errors.load(Ordering::SeqCst), 1);
        assert_eq!(completes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_shared_token_cancels() {
        let token = CancellationToken::new();
        let obs = ObserverFn::new(|_: u8| {}).with_token(token.clone());

        assert!(!obs.is_cancelled());
        token.cancel();
        assert!(obs.is_cancelled());
    }
}
