//! # Transformation operators: `map`, `filter`, `flat_map`.
//!
//! Each operator returns a **new** [`Stream`] whose producer subscribes the upstream
//! stream with a synthetic observer that transforms events for the downstream one.
//!
//! ```text
//! upstream ──► SafeObserver ──► StepObserver (map / filter) ──► downstream
//!
//! upstream ──► SafeObserver ──► FlatMapObserver
//!                                   │ f(item) → inner stream
//!                                   └─► inner ──► SafeObserver ──► InnerObserver ──► downstream
//! ```
//!
//! ## Rules
//! - A function failure (an `Err` from the `try_*` variants, or a panic) becomes
//!   exactly one `on_error`; the in-flight item is dropped and the layer stops
//!   forwarding.
//! - Every layer owns an independent cancel flag. Cancelling one layer is not seen by
//!   any other layer.
//! - `flat_map` subscribes each inner stream immediately. Inner completion is
//!   swallowed; only the outer completion completes the result.

use std::convert::identity;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio_util::sync::CancellationToken;

use super::source::{Stream, catch_panic};
use crate::error::StreamError;
use crate::observers::{Observer, ObserverRef};

/// One step: `Ok(Some(r))` forwards, `Ok(None)` skips, `Err` fails the layer.
type StepFn<T, R> = Arc<dyn Fn(T) -> Result<Option<R>, StreamError> + Send + Sync>;

type InnerFn<T, R> = Arc<dyn Fn(T) -> Result<Stream<R>, StreamError> + Send + Sync>;

/// Cancel flag and terminal latch of one operator layer.
pub(super) struct Layer {
    token: CancellationToken,
    done: AtomicBool,
}

impl Layer {
    pub(super) fn new() -> Self {
        Self {
            token: CancellationToken::new(),
            done: AtomicBool::new(false),
        }
    }

    /// `true` while the layer still forwards events.
    #[inline]
    pub(super) fn is_open(&self) -> bool {
        !self.token.is_cancelled() && !self.done.load(Ordering::Acquire)
    }

    /// Closes the layer; `true` only for the caller that closed it.
    #[inline]
    pub(super) fn finish(&self) -> bool {
        !self.token.is_cancelled() && !self.done.swap(true, Ordering::AcqRel)
    }

    pub(super) fn cancel(&self) {
        self.token.cancel();
    }

    pub(super) fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl<T: Send + 'static> Stream<T> {
    /// Transforms each item with `f`.
    ///
    /// A panic in `f` is delivered downstream as [`StreamError::Panicked`].
    pub fn map<R, F>(&self, f: F) -> Stream<R>
    where
        R: Send + 'static,
        F: Fn(T) -> R + Send + Sync + 'static,
    {
        self.lift(move |item| Ok(Some(f(item))))
    }

    /// Transforms each item with a fallible `f`.
    ///
    /// The first `Err` is delivered downstream as `on_error`; later upstream events
    /// are dropped.
    ///
    /// # Example
    /// ```
    /// use rxflow::{Stream, StreamError, TestObserver};
    ///
    /// let obs = TestObserver::<u8>::new();
    /// Stream::of(vec!["1", "2", "x", "4"])
    ///     .try_map(|s: &str| s.parse::<u8>().map_err(|e| StreamError::failed(e)))
    ///     .subscribe(obs.clone());
    ///
    /// assert_eq!(obs.values(), vec![1, 2]);
    /// assert_eq!(obs.errors().len(), 1);
    /// assert_eq!(obs.completions(), 0);
    /// ```
    pub fn try_map<R, E, F>(&self, f: F) -> Stream<R>
    where
        R: Send + 'static,
        E: Into<StreamError>,
        F: Fn(T) -> Result<R, E> + Send + Sync + 'static,
    {
        self.lift(move |item| f(item).map(Some).map_err(Into::into))
    }

    /// Keeps only the items for which `predicate` holds.
    pub fn filter<P>(&self, predicate: P) -> Stream<T>
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.lift(move |item| Ok(predicate(&item).then_some(item)))
    }

    /// Keeps only the items for which a fallible `predicate` returns `Ok(true)`.
    pub fn try_filter<P, E>(&self, predicate: P) -> Stream<T>
    where
        E: Into<StreamError>,
        P: Fn(&T) -> Result<bool, E> + Send + Sync + 'static,
    {
        self.lift(move |item| match predicate(&item) {
            Ok(keep) => Ok(keep.then_some(item)),
            Err(e) => Err(e.into()),
        })
    }

    /// Maps each item to an inner stream and merges the inner items downstream.
    ///
    /// Inner streams are subscribed as soon as their item arrives and are not
    /// serialized against each other. Inner completion does not complete the result.
    pub fn flat_map<R, F>(&self, f: F) -> Stream<R>
    where
        R: Send + 'static,
        F: Fn(T) -> Stream<R> + Send + Sync + 'static,
    {
        self.merge_inner(move |item| Ok(f(item)))
    }

    /// Like [`flat_map`](Self::flat_map), with a fallible inner-stream factory.
    pub fn try_flat_map<R, E, F>(&self, f: F) -> Stream<R>
    where
        R: Send + 'static,
        E: Into<StreamError>,
        F: Fn(T) -> Result<Stream<R>, E> + Send + Sync + 'static,
    {
        self.merge_inner(move |item| f(item).map_err(Into::into))
    }

    fn lift<R, S>(&self, step: S) -> Stream<R>
    where
        R: Send + 'static,
        S: Fn(T) -> Result<Option<R>, StreamError> + Send + Sync + 'static,
    {
        let step: StepFn<T, R> = Arc::new(step);
        let upstream = self.clone();
        Stream::create(move |downstream: ObserverRef<R>| {
            upstream.subscribe(Arc::new(StepObserver {
                downstream,
                step: Arc::clone(&step),
                layer: Layer::new(),
            }));
        })
    }

    fn merge_inner<R, F>(&self, f: F) -> Stream<R>
    where
        R: Send + 'static,
        F: Fn(T) -> Result<Stream<R>, StreamError> + Send + Sync + 'static,
    {
        let f: InnerFn<T, R> = Arc::new(f);
        let upstream = self.clone();
        Stream::create(move |downstream: ObserverRef<R>| {
            upstream.subscribe(Arc::new(FlatMapObserver {
                outer: Arc::new(Outer {
                    downstream,
                    layer: Layer::new(),
                }),
                f: Arc::clone(&f),
            }));
        })
    }
}

/// Synthetic observer behind `map` and `filter`.
struct StepObserver<T, R> {
    downstream: ObserverRef<R>,
    step: StepFn<T, R>,
    layer: Layer,
}

impl<T: Send + 'static, R: Send + 'static> Observer<T> for StepObserver<T, R> {
    fn on_next(&self, item: T) {
        if !self.layer.is_open() {
            return;
        }
        match catch_panic(|| (self.step)(item)).and_then(identity) {
            Ok(Some(out)) => self.downstream.on_next(out),
            Ok(None) => {}
            Err(err) => self.on_error(err),
        }
    }

    fn on_error(&self, err: StreamError) {
        if self.layer.finish() {
            self.downstream.on_error(err);
        }
    }

    fn on_complete(&self) {
        if self.layer.finish() {
            self.downstream.on_complete();
        }
    }

    fn cancel(&self) {
        self.layer.cancel();
    }

    fn is_cancelled(&self) -> bool {
        self.layer.is_cancelled()
    }
}

/// Outer state of one `flat_map` subscription, shared with its inner observers.
struct Outer<R> {
    downstream: ObserverRef<R>,
    layer: Layer,
}

impl<R: Send + 'static> Outer<R> {
    fn fail(&self, err: StreamError) {
        if self.layer.finish() {
            self.downstream.on_error(err);
        }
    }
}

struct FlatMapObserver<T, R> {
    outer: Arc<Outer<R>>,
    f: InnerFn<T, R>,
}

impl<T: Send + 'static, R: Send + 'static> Observer<T> for FlatMapObserver<T, R> {
    fn on_next(&self, item: T) {
        if !self.outer.layer.is_open() {
            return;
        }
        match catch_panic(|| (self.f)(item)).and_then(identity) {
            Ok(inner) => inner.subscribe(Arc::new(InnerObserver {
                outer: Arc::clone(&self.outer),
                layer: Layer::new(),
            })),
            Err(err) => self.outer.fail(err),
        }
    }

    fn on_error(&self, err: StreamError) {
        self.outer.fail(err);
    }

    fn on_complete(&self) {
        if self.outer.layer.finish() {
            self.outer.downstream.on_complete();
        }
    }

    fn cancel(&self) {
        self.outer.layer.cancel();
    }

    fn is_cancelled(&self) -> bool {
        self.outer.layer.is_cancelled()
    }
}

struct InnerObserver<R> {
    outer: Arc<Outer<R>>,
    layer: Layer,
}

impl<R: Send + 'static> Observer<R> for InnerObserver<R> {
    fn on_next(&self, item: R) {
        if self.outer.layer.is_open() {
            self.outer.downstream.on_next(item);
        }
    }

    fn on_error(&self, err: StreamError) {
        self.outer.fail(err);
    }

    fn on_complete(&self) {}

    fn cancel(&self) {
        self.layer.cancel();
    }

    fn is_cancelled(&self) -> bool {
        self.layer.is_cancelled()
    }
}
