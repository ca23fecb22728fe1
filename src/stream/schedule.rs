//! # Thread-hopping operators: `subscribe_on`, `observe_on`.
//!
//! ```text
//! subscribe_on(s):  caller ──submit──► [s] upstream.subscribe(downstream)
//!                   (producer and everything it calls synchronously run on s)
//!
//! observe_on(s):    producer thread ──► SerialQueue.push(signal)
//!                                             │ wip 0 → 1
//!                                             └─submit──► [s] drain()
//!                                                          └─► downstream, in order
//! ```
//!
//! ## Rules
//! - `observe_on` keeps per-subscription order on every scheduler: at most one
//!   drain task per subscription is queued or running at a time.
//! - A rejected submission reaches the downstream observer as one
//!   [`StreamError::Rejected`](crate::StreamError::Rejected), delivered on the
//!   submitting thread.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::operators::Layer;
use super::source::{Stream, catch_panic};
use crate::error::StreamError;
use crate::observers::{Observer, ObserverRef, Signal};
use crate::schedulers::SchedulerRef;

impl<T: Send + 'static> Stream<T> {
    /// Runs the subscription (and so the producer) on `scheduler`.
    ///
    /// Returns immediately; events are delivered from the scheduler's thread.
    ///
    /// # Example
    /// ```
    /// use std::sync::Arc;
    /// use std::time::Duration;
    /// use rxflow::{IoScheduler, Stream, TestObserver};
    ///
    /// let io = Arc::new(IoScheduler::new().unwrap());
    /// let obs = TestObserver::<i32>::new();
    ///
    /// Stream::of(1..=3).subscribe_on(io).subscribe(obs.clone());
    ///
    /// assert!(obs.await_terminal(Duration::from_secs(5)));
    /// assert_eq!(obs.values(), vec![1, 2, 3]);
    /// ```
    pub fn subscribe_on(&self, scheduler: SchedulerRef) -> Stream<T> {
        let upstream = self.clone();
        Stream::create(move |downstream: ObserverRef<T>| {
            let source = upstream.clone();
            let target = Arc::clone(&downstream);
            // Keeps the scheduler alive until the subscription has run on it.
            let pinned = Arc::clone(&scheduler);
            let submitted = scheduler.submit(Box::new(move || {
                source.subscribe(target);
                drop(pinned);
            }));
            if let Err(err) = submitted {
                tracing::warn!(
                    scheduler = scheduler.name(),
                    label = err.as_label(),
                    error = %err,
                    "subscribe_on submission rejected"
                );
                downstream.on_error(err.into());
            }
        })
    }

    /// Delivers every event to the downstream observer on `scheduler`.
    ///
    /// The producer keeps running where it was subscribed. Events are handed over
    /// through a per-subscription queue and delivered in emission order.
    pub fn observe_on(&self, scheduler: SchedulerRef) -> Stream<T> {
        let upstream = self.clone();
        Stream::create(move |downstream: ObserverRef<T>| {
            upstream.subscribe(Arc::new(ObserveOnObserver {
                queue: Arc::new(SerialQueue::new(downstream, Arc::clone(&scheduler))),
                layer: Layer::new(),
            }));
        })
    }
}

/// Hand-over queue of one `observe_on` subscription.
struct SerialQueue<T> {
    downstream: ObserverRef<T>,
    scheduler: SchedulerRef,
    pending: Mutex<VecDeque<Signal<T>>>,
    /// Signals pushed but not yet accounted for by a drain pass.
    wip: AtomicUsize,
    rejected: AtomicBool,
}

impl<T: Send + 'static> SerialQueue<T> {
    fn new(downstream: ObserverRef<T>, scheduler: SchedulerRef) -> Self {
        Self {
            downstream,
            scheduler,
            pending: Mutex::new(VecDeque::new()),
            wip: AtomicUsize::new(0),
            rejected: AtomicBool::new(false),
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Signal<T>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn push(self: &Arc<Self>, signal: Signal<T>) {
        if self.rejected.load(Ordering::Acquire) {
            return;
        }
        self.lock().push_back(signal);
        if self.wip.fetch_add(1, Ordering::AcqRel) == 0 {
            self.schedule_drain();
        }
    }

    fn schedule_drain(self: &Arc<Self>) {
        let queue = Arc::clone(self);
        if let Err(err) = self.scheduler.submit(Box::new(move || queue.drain())) {
            tracing::warn!(
                scheduler = self.scheduler.name(),
                label = err.as_label(),
                error = %err,
                "observe_on submission rejected"
            );
            self.rejected.store(true, Ordering::Release);
            self.lock().clear();
            self.downstream.on_error(err.into());
        }
    }

    fn pop(&self) -> Option<Signal<T>> {
        self.lock().pop_front()
    }

    fn drain(&self) {
        let mut missed = 1;
        loop {
            while let Some(signal) = self.pop() {
                if let Err(err) = catch_panic(|| signal.deliver(self.downstream.as_ref())) {
                    tracing::error!(error = %err, "observer panicked during observe_on delivery");
                }
            }
            missed = self.wip.fetch_sub(missed, Ordering::AcqRel) - missed;
            if missed == 0 {
                break;
            }
        }
    }
}

struct ObserveOnObserver<T> {
    queue: Arc<SerialQueue<T>>,
    layer: Layer,
}

impl<T: Send + 'static> Observer<T> for ObserveOnObserver<T> {
    fn on_next(&self, item: T) {
        if self.layer.is_open() {
            self.queue.push(Signal::Next(item));
        }
    }

    fn on_error(&self, err: StreamError) {
        if self.layer.finish() {
            self.queue.push(Signal::Error(err));
        }
    }

    fn on_complete(&self) {
        if self.layer.finish() {
            self.queue.push(Signal::Complete);
        }
    }

    fn cancel(&self) {
        self.layer.cancel();
    }

    fn is_cancelled(&self) -> bool {
        self.layer.is_cancelled()
    }
}
