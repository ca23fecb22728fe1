//! # Observers: the consuming side of a stream.
//!
//! This module provides the [`Observer`] trait (the consumer contract) and the
//! observers built on top of it.
//!
//! ## Architecture
//! ```text
//! Stream::subscribe(observer)
//!     │
//!     └──► SafeObserver (per-subscription guard, own cancel flag)
//!               │
//!               └──► observer.on_next / on_error / on_complete
//! ```
//!
//! ## Observer types
//! - [`SafeObserver`]: disposal guard applied at every `subscribe` boundary.
//! - [`ObserverFn`]: closure-backed observer.
//! - [`TestObserver`]: records events and delivery threads.

mod observer;
mod observer_fn;
mod safe;
mod test_observer;

pub use observer::{Observer, ObserverRef, Signal};
pub use observer_fn::ObserverFn;
pub use safe::SafeObserver;
pub use test_observer::TestObserver;
