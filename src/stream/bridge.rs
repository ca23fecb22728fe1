//! # Async bridge: consume a stream as a `futures::Stream`.
//!
//! [`Stream::to_async`] subscribes a channel-backed observer and returns the
//! receiving end. Items arrive as `Ok(item)`; a failure arrives as one `Err` and
//! ends the async stream; completion ends it without an `Err`.
//!
//! The channel is unbounded: a synchronous producer never blocks on a slow
//! consumer. Dropping [`AsyncEvents`] only turns further events into no-ops at the
//! channel. The producer is not stopped: it polls its own subscription guard, which
//! never sees the dropped receiver.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::StreamExt;
use futures::channel::mpsc;
use tokio_util::sync::CancellationToken;

use super::source::Stream;
use crate::error::StreamError;
use crate::observers::Observer;

impl<T: Send + 'static> Stream<T> {
    /// Subscribes now and returns the events as an async stream.
    ///
    /// The producer runs during this call unless `subscribe_on` moved it to a
    /// scheduler.
    ///
    /// # Example
    /// ```
    /// use futures::StreamExt;
    /// use rxflow::Stream;
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// let items: Vec<_> = Stream::of(1..=3).to_async().collect().await;
    /// assert_eq!(items, vec![Ok(1), Ok(2), Ok(3)]);
    /// # }
    /// ```
    pub fn to_async(&self) -> AsyncEvents<T> {
        let (tx, rx) = mpsc::unbounded();
        self.subscribe(Arc::new(ChannelObserver {
            tx,
            token: CancellationToken::new(),
        }));
        AsyncEvents { rx }
    }
}

/// Receiving end of [`Stream::to_async`].
pub struct AsyncEvents<T> {
    rx: mpsc::UnboundedReceiver<Result<T, StreamError>>,
}

impl<T> futures::Stream for AsyncEvents<T> {
    type Item = Result<T, StreamError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_next_unpin(cx)
    }
}

struct ChannelObserver<T> {
    tx: mpsc::UnboundedSender<Result<T, StreamError>>,
    token: CancellationToken,
}

impl<T: Send + 'static> Observer<T> for ChannelObserver<T> {
    fn on_next(&self, item: T) {
        if self.tx.unbounded_send(Ok(item)).is_err() {
            self.token.cancel();
        }
    }

    fn on_error(&self, err: StreamError) {
        let _ = self.tx.unbounded_send(Err(err));
        self.tx.close_channel();
    }

    fn on_complete(&self) {
        self.tx.close_channel();
    }

    fn cancel(&self) {
        self.token.cancel();
    }

    fn is_cancelled(&self) -> bool {
        self.token.is_cancelled() || self.tx.is_closed()
    }
}
