//! # Schedulers: where subscription and delivery run.
//!
//! A [`Scheduler`] accepts a unit of work and runs it on a thread it owns.
//! `Stream::subscribe_on` and `Stream::observe_on` use it to move producer and
//! consumer work off the calling thread.
//!
//! ## Variants
//! | Scheduler                   | Pool shape                                  | Ordering across submissions |
//! |-----------------------------|---------------------------------------------|-----------------------------|
//! | [`ComputationScheduler`]    | fixed, one worker per CPU (or configured)   | none                        |
//! | [`IoScheduler`]             | grows on demand, idle threads retire        | none                        |
//! | [`SingleThreadScheduler`]   | exactly one worker                          | FIFO                        |
//!
//! All variants are configured through [`SchedulerConfig`].

mod config;
mod pool;
mod scheduler;
mod single;

pub use config::SchedulerConfig;
pub use pool::{ComputationScheduler, IoScheduler};
pub use scheduler::{Scheduler, SchedulerRef, Work};
pub use single::SingleThreadScheduler;

pub(crate) use scheduler::panic_message;
