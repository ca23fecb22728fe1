//! # rxflow
//!
//! **rxflow** is a small push-based reactive stream library for Rust.
//!
//! A [`Stream`] is a cold recipe: subscribing runs its producer, which pushes items
//! into an [`Observer`] and ends with at most one error or completion. Operators
//! derive new streams, and schedulers move subscription or delivery onto dedicated
//! worker threads.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   Stream::create(producer)
//!          │
//!          ▼
//!   .filter(p) ──► .map(f) ──► .flat_map(g) ──► .subscribe_on(s1) ──► .observe_on(s2)
//!                                                                          │
//!                                                                          ▼
//!                                                              .subscribe(observer)
//!
//! subscribe() walks the chain from the end back to the producer:
//!
//!   observer ◄── SafeObserver ◄── ObserveOn ◄── SafeObserver ◄── ... ◄── producer
//!       ▲                             │
//!       └──── drained on s2 ◄─────────┘  (per-subscription serial queue)
//! ```
//!
//! ### Event contract
//! ```text
//! on_next* (on_error | on_complete)?
//!
//! - every subscription layer is wrapped in a SafeObserver (disposal guard)
//! - after cancel() or a terminal event, the guard drops everything
//! - a failing or panicking operator function becomes exactly one on_error
//! ```
//!
//! ## Features
//! | Area            | Description                                                   | Key types / traits                                   |
//! |-----------------|---------------------------------------------------------------|------------------------------------------------------|
//! | **Streams**     | Cold producers, sources, transformation operators.            | [`Stream`]                                           |
//! | **Observers**   | Consumer contract, disposal guard, closure and test sinks.    | [`Observer`], [`SafeObserver`], [`ObserverFn`], [`TestObserver`] |
//! | **Schedulers**  | Thread pools for `subscribe_on` / `observe_on`.               | [`Scheduler`], [`ComputationScheduler`], [`IoScheduler`], [`SingleThreadScheduler`] |
//! | **Async**       | Consume a stream as a `futures::Stream`.                      | [`AsyncEvents`]                                      |
//! | **Errors**      | Typed errors for streams and schedulers.                      | [`StreamError`], [`SchedulerError`]                  |
//! | **Configuration** | Thread naming and pool sizing.                              | [`SchedulerConfig`]                                  |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use rxflow::{ComputationScheduler, IoScheduler, Observer, ObserverRef, Stream, TestObserver};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let io = Arc::new(IoScheduler::new()?);
//!     let computation = Arc::new(ComputationScheduler::new()?);
//!
//!     let readings = Stream::create(|emitter: ObserverRef<u32>| {
//!         for raw in [3, 8, 12, 5] {
//!             if emitter.is_cancelled() {
//!                 return;
//!             }
//!             emitter.on_next(raw);
//!         }
//!         emitter.on_complete();
//!     });
//!
//!     let obs = TestObserver::<String>::new();
//!     readings
//!         .subscribe_on(io)
//!         .filter(|v| *v > 4)
//!         .observe_on(computation)
//!         .map(|v| format!("reading={v}"))
//!         .subscribe(obs.clone());
//!
//!     assert!(obs.await_terminal(Duration::from_secs(5)));
//!     assert_eq!(obs.values(), vec!["reading=8", "reading=12", "reading=5"]);
//!     Ok(())
//! }
//! ```
mod error;
mod observers;
mod schedulers;
mod stream;

// ---- Public re-exports ----

pub use error::{SchedulerError, StreamError};
pub use observers::{Observer, ObserverFn, ObserverRef, SafeObserver, Signal, TestObserver};
pub use schedulers::{
    ComputationScheduler, IoScheduler, Scheduler, SchedulerConfig, SchedulerRef,
    SingleThreadScheduler, Work,
};
pub use stream::{AsyncEvents, Stream};
