//! # SafeObserver: the per-subscription disposal guard
//!
//! [`SafeObserver`] decorates an observer so that once cancelled, no further events
//! reach it. `Stream::subscribe` wraps every observer it is given, so each operator
//! layer in a chain gets its own guard with its own flag.
//!
//! ```text
//! producer ──► SafeObserver ──► wrapped observer
//!                 │
//!                 ├─ cancelled?   → drop event
//!                 ├─ terminated?  → drop event
//!                 └─ otherwise    → forward
//! ```
//!
//! ## Rules
//! - The flag is a [`CancellationToken`]: atomic, readable from any thread.
//! - Cancelling a guard does not cancel the wrapped observer, nor any other layer.
//! - The first `on_error`/`on_complete` closes the guard; later events are dropped.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio_util::sync::CancellationToken;

use super::observer::{Observer, ObserverRef};
use crate::error::StreamError;

/// Disposal guard around one observer.
pub struct SafeObserver<T> {
    downstream: ObserverRef<T>,
    token: CancellationToken,
    terminated: AtomicBool,
}

impl<T: Send + 'static> SafeObserver<T> {
    /// Wraps `downstream` with a fresh, uncancelled flag.
    pub fn new(downstream: ObserverRef<T>) -> Self {
        Self {
            downstream,
            token: CancellationToken::new(),
            terminated: AtomicBool::new(false),
        }
    }

    /// Wraps `downstream` and returns the guard as an [`ObserverRef`].
    pub fn wrap(downstream: ObserverRef<T>) -> ObserverRef<T> {
        Arc::new(Self::new(downstream))
    }

    /// The cancellation flag of this guard.
    ///
    /// Producers running inside an async context may await `token().cancelled()`
    /// instead of polling [`Observer::is_cancelled`].
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    #[inline]
    fn is_closed(&self) -> bool {
        self.token.is_cancelled() || self.terminated.load(Ordering::Acquire)
    }

    /// Returns `true` only for the first terminal event.
    #[inline]
    fn enter_terminal(&self) -> bool {
        !self.token.is_cancelled() && !self.terminated.swap(true, Ordering::AcqRel)
    }
}

impl<T: Send + 'static> Observer<T> for SafeObserver<T> {
    fn on_next(&self, item: T) {
        if self.is_closed() {
            return;
        }
        self.downstream.on_next(item);
    }

    fn on_error(&self, err: StreamError) {
        if self.enter_terminal() {
            self.downstream.on_error(err);
        } else {
            tracing::trace!(error = %err, "error dropped by closed guard");
        }
    }

    fn on_complete(&self) {
        if self.enter_terminal() {
            self.downstream.on_complete();
        }
    }

    fn cancel(&self) {
        self.token.cancel();
    }

    fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}
