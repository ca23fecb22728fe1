//! # Stream: an immutable, re-subscribable recipe.
//!
//! A [`Stream`] wraps a producer closure (`Fn(ObserverRef<T>)`). Nothing runs until
//! [`Stream::subscribe`] is called; every subscription runs the producer again from
//! scratch (cold semantics).
//!
//! ## Subscription flow
//! ```text
//! subscribe(observer)
//!     │
//!     ├─► SafeObserver::wrap(observer)      (fresh guard, own cancel flag)
//!     └─► producer(guard)                   (synchronously, on the calling thread)
//!             │
//!             └─ panic → guard.on_error(Panicked)
//! ```

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::error::StreamError;
use crate::observers::{Observer, ObserverRef, SafeObserver};
use crate::schedulers::panic_message;

type OnSubscribe<T> = dyn Fn(ObserverRef<T>) + Send + Sync;

/// Cold, push-based stream of `T`.
///
/// Cloning is cheap and shares the same producer.
///
/// ## Example
/// ```rust
/// use rxflow::{Observer, ObserverRef, Stream, TestObserver};
///
/// let numbers = Stream::create(|emitter: ObserverRef<i32>| {
///     for i in 0..10 {
///         if emitter.is_cancelled() {
///             return;
///         }
///         emitter.on_next(i);
///     }
///     emitter.on_complete();
/// });
///
/// let obs = TestObserver::<String>::new();
/// numbers
///     .filter(|i| i % 2 == 0)
///     .map(|i| format!("#{i}"))
///     .subscribe(obs.clone());
///
/// assert_eq!(obs.values(), vec!["#0", "#2", "#4", "#6", "#8"]);
/// assert_eq!(obs.completions(), 1);
/// ```
pub struct Stream<T> {
    on_subscribe: Arc<OnSubscribe<T>>,
}

impl<T> Clone for Stream<T> {
    fn clone(&self) -> Self {
        Self {
            on_subscribe: Arc::clone(&self.on_subscribe),
        }
    }
}

impl<T: Send + 'static> Stream<T> {
    /// Builds a stream from a producer closure.
    ///
    /// The closure is invoked once per subscription with that subscription's guard.
    /// It may emit any number of items and should end with one terminal event.
    pub fn create<F>(on_subscribe: F) -> Self
    where
        F: Fn(ObserverRef<T>) + Send + Sync + 'static,
    {
        Self {
            on_subscribe: Arc::new(on_subscribe),
        }
    }

    /// Runs the producer for `observer`.
    ///
    /// `observer` is wrapped in a fresh [`SafeObserver`]. The producer runs on the
    /// calling thread; this returns once it returns, unless a scheduler operator
    /// moved the work elsewhere. A panic in the producer is delivered as
    /// [`StreamError::Panicked`].
    pub fn subscribe(&self, observer: ObserverRef<T>) {
        let guard = SafeObserver::wrap(observer);
        let producer_guard = Arc::clone(&guard);
        if let Err(err) = catch_panic(|| (self.on_subscribe)(producer_guard)) {
            guard.on_error(err);
        }
    }

    /// Emits a single item, then completes.
    pub fn just(item: T) -> Self
    where
        T: Clone + Sync,
    {
        Self::create(move |emitter| {
            emitter.on_next(item.clone());
            emitter.on_complete();
        })
    }

    /// Emits every item of `items`, then completes.
    ///
    /// Checks the subscription's own guard between items and stops early, without
    /// completing, once that guard is cancelled. Only code holding the guard (an
    /// operator or a wrapping producer) can cancel it; calling `cancel()` on the
    /// consumer passed to `subscribe` does not reach it.
    pub fn of<I>(items: I) -> Self
    where
        I: IntoIterator<Item = T> + Clone + Send + Sync + 'static,
    {
        Self::create(move |emitter| {
            for item in items.clone() {
                if emitter.is_cancelled() {
                    return;
                }
                emitter.on_next(item);
            }
            emitter.on_complete();
        })
    }

    /// Completes immediately without items.
    pub fn empty() -> Self {
        Self::create(|emitter| emitter.on_complete())
    }

    /// Fails immediately with `err`.
    pub fn failed(err: StreamError) -> Self {
        Self::create(move |emitter| emitter.on_error(err.clone()))
    }
}

/// Runs `f`, turning a panic into [`StreamError::Panicked`].
pub(crate) fn catch_panic<R>(f: impl FnOnce() -> R) -> Result<R, StreamError> {
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| StreamError::Panicked {
        info: panic_message(payload.as_ref()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observers::{ObserverFn, Signal, TestObserver};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio_util::sync::CancellationToken;

    #[test]
    fn test_create_and_subscribe() {
        let obs = TestObserver::<i32>::new();

        Stream::create(|emitter: ObserverRef<i32>| {
            emitter.on_next(1);
            emitter.on_next(2);
            emitter.on_next(3);
            emitter.on_complete();
        })
        .subscribe(obs.clone());

        assert_eq!(obs.values(), vec![1, 2, 3]);
        assert_eq!(obs.completions(), 1);
        assert!(obs.errors().is_empty());
    }

    #[test]
    fn test_error_after_item() {
        let obs = TestObserver::<i32>::new();

        Stream::create(|emitter: ObserverRef<i32>| {
            emitter.on_next(1);
            emitter.on_error(StreamError::failed("Test error"));
        })
        .subscribe(obs.clone());

        assert_eq!(obs.values(), vec![1]);
        assert_eq!(obs.errors(), vec![StreamError::failed("Test error")]);
        assert_eq!(obs.completions(), 0);
    }

    #[test]
    fn test_empty_completes() {
        let obs = TestObserver::<i32>::new();
        Stream::<i32>::empty().subscribe(obs.clone());

        assert_eq!(obs.events(), vec![Signal::Complete]);
    }

    #[test]
    fn test_error_before_items() {
        let obs = TestObserver::<i32>::new();
        Stream::<i32>::failed(StreamError::failed("Test error")).subscribe(obs.clone());

        assert_eq!(obs.value_count(), 0);
        assert_eq!(obs.errors(), vec![StreamError::failed("Test error")]);
        assert_eq!(obs.completions(), 0);
    }

    #[test]
    fn test_terminal_at_most_once_despite_misbehaving_producer() {
        let obs = TestObserver::<i32>::new();

        Stream::create(|emitter: ObserverRef<i32>| {
            emitter.on_next(1);
            emitter.on_complete();
            emitter.on_next(2);
            emitter.on_error(StreamError::failed("late"));
            emitter.on_complete();
        })
        .subscribe(obs.clone());

        assert_eq!(obs.events(), vec![Signal::Next(1), Signal::Complete]);
    }

    #[test]
    fn test_cold_resubscription_runs_producer_again() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        let stream = Stream::create(move |emitter: ObserverRef<i32>| {
            counter.fetch_add(1, Ordering::SeqCst);
            emitter.on_next(7);
            emitter.on_complete();
        });

        let first = TestObserver::<i32>::new();
        let second = TestObserver::<i32>::new();
        stream.subscribe(first.clone());
        stream.clone().subscribe(second.clone());

        assert_eq!(runs.load(Ordering::SeqCst), 2);
        assert_eq!(first.values(), vec![7]);
        assert_eq!(second.values(), vec![7]);
    }

    #[test]
    fn test_cancel_stops_cooperative_producer() {
        let received = Arc::new(AtomicUsize::new(0));
        let terminals = Arc::new(AtomicUsize::new(0));
        let token = CancellationToken::new();

        let count = Arc::clone(&received);
        let cancel = token.clone();
        let (on_complete, on_error) = (Arc::clone(&terminals), Arc::clone(&terminals));
        let observer = Arc::new(
            ObserverFn::new(move |item: i32| {
                count.fetch_add(1, Ordering::SeqCst);
                if item == 5 {
                    cancel.cancel();
                }
            })
            .with_complete(move || {
                on_complete.fetch_add(1, Ordering::SeqCst);
            })
            .with_error(move |_| {
                on_error.fetch_add(1, Ordering::SeqCst);
            })
            .with_token(token),
        );

        // The producer polls the consumer it was built around, not its guard.
        let polled = Arc::clone(&observer);
        Stream::create(move |emitter: ObserverRef<i32>| {
            for i in 0..100 {
                if polled.is_cancelled() {
                    return;
                }
                emitter.on_next(i);
            }
        })
        .subscribe(observer.clone());

        assert!(observer.is_cancelled());
        assert_eq!(received.load(Ordering::SeqCst), 6);
        assert_eq!(terminals.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_guard_cancel_is_local_to_subscription() {
        let obs = TestObserver::<i32>::new();

        Stream::create(|emitter: ObserverRef<i32>| {
            emitter.on_next(0);
            emitter.cancel();
            assert!(emitter.is_cancelled());
            emitter.on_next(1);
            emitter.on_complete();
        })
        .subscribe(obs.clone());

        assert_eq!(obs.values(), vec![0]);
        assert_eq!(obs.completions(), 0);
        assert!(!obs.is_cancelled());
    }

    #[test]
    fn test_of_replays_iterable_per_subscription() {
        let stream = Stream::of(vec![1, 2, 3]);
        let a = TestObserver::<i32>::new();
        let b = TestObserver::<i32>::new();
        stream.subscribe(a.clone());
        stream.subscribe(b.clone());

        assert_eq!(a.values(), vec![1, 2, 3]);
        assert_eq!(b.values(), vec![1, 2, 3]);
        assert_eq!(a.completions() + b.completions(), 2);
    }

    #[test]
    fn test_producer_panic_becomes_error() {
        let obs = TestObserver::<i32>::new();

        Stream::create(|emitter: ObserverRef<i32>| {
            emitter.on_next(1);
            panic!("producer blew up");
        })
        .subscribe(obs.clone());

        assert_eq!(obs.values(), vec![1]);
        assert_eq!(
            obs.errors(),
            vec![StreamError::Panicked {
                info: "producer blew up".into()
            }]
        );
    }

    #[test]
    fn test_just_emits_once_per_subscription() {
        let stream = Stream::just("x");
        let a = TestObserver::<&'static str>::new();
        let b = TestObserver::<&'static str>::new();
        stream.subscribe(a.clone());
        stream.subscribe(b.clone());

        assert_eq!(a.events(), vec![Signal::Next("x"), Signal::Complete]);
        assert_eq!(b.events(), vec![Signal::Next("x"), Signal::Complete]);
    }
}
