//! # Observer: the consumer contract
//!
//! The [`Observer`] trait is the sink of a subscription. A stream's producer drives
//! it forward with three event callbacks; the observer also carries an idempotent
//! cancellation flag a producer may poll.
//!
//! # Contract
//! ```text
//!   on_next* (on_error | on_complete)?
//! ```
//! - After `on_error` or `on_complete`, a well-behaved producer calls nothing else.
//! - `cancel()` only sets a flag. It never interrupts a callback in progress and
//!   never stops a producer that does not poll `is_cancelled()`.
//!
//! # Example: custom observer
//! ```
//! use std::sync::Mutex;
//! use std::sync::atomic::{AtomicBool, Ordering};
//! use rxflow::{Observer, StreamError};
//!
//! #[derive(Default)]
//! struct Sum {
//!     total: Mutex<i64>,
//!     stopped: AtomicBool,
//! }
//!
//! impl Observer<i64> for Sum {
//!     fn on_next(&self, item: i64) {
//!         *self.total.lock().unwrap() += item;
//!     }
//!     fn on_error(&self, err: StreamError) {
//!         eprintln!("sum failed: {err}");
//!     }
//!     fn on_complete(&self) {}
//!     fn cancel(&self) {
//!         self.stopped.store(true, Ordering::Release);
//!     }
//!     fn is_cancelled(&self) -> bool {
//!         self.stopped.load(Ordering::Acquire)
//!     }
//! }
//! ```

use std::sync::Arc;

use crate::error::StreamError;

/// Shared handle to an observer (`Arc<dyn Observer<T>>`).
pub type ObserverRef<T> = Arc<dyn Observer<T>>;

/// # Receiver of a stream's events.
///
/// Callbacks take `&self`: the same observer may be reached from the subscribing
/// thread and from scheduler threads, so implementations use interior mutability.
pub trait Observer<T>: Send + Sync + 'static {
    /// Receives the next item.
    fn on_next(&self, item: T);

    /// Receives the terminal failure.
    fn on_error(&self, err: StreamError);

    /// Receives successful termination.
    fn on_complete(&self);

    /// Marks this observer as cancelled. Idempotent.
    fn cancel(&self);

    /// Returns `true` once [`cancel`](Self::cancel) was called.
    fn is_cancelled(&self) -> bool;
}

/// One event of the consumer contract, as a value.
///
/// Used where events are queued or recorded instead of delivered inline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal<T> {
    /// `on_next(item)`.
    Next(T),
    /// `on_error(err)`.
    Error(StreamError),
    /// `on_complete()`.
    Complete,
}

impl<T> Signal<T> {
    /// Returns `true` for `Error` and `Complete`.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Signal::Next(_))
    }

    /// Delivers this event to `observer`.
    pub fn deliver(self, observer: &dyn Observer<T>)
    where
        T: Send + 'static,
    {
        match self {
            Signal::Next(item) => observer.on_next(item),
            Signal::Error(err) => observer.on_error(err),
            Signal::Complete => observer.on_complete(),
        }
    }
}
