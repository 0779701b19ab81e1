//! `futures::Stream` and `futures::Sink` adapters over the queue.

use crate::error::QueueError;
use crate::queue::AsyncMessageQueue;
use futures_core::Stream;
use futures_sink::Sink;
use futures_util::future::{BoxFuture, FutureExt};
use std::pin::Pin;
use std::task::{ready, Context, Poll};

/// The consumer sequence as a `Stream`.
///
/// Yields `Ok(message)` for each pull. A timeout is yielded as
/// `Err(QueueError::Timeout(_))` and the stream keeps going; any other error
/// is yielded once and ends the stream.
///
/// Holds at most one pull in flight. Dropping the stream cancels that pull
/// cleanly.
pub struct QueueStream<T> {
    queue: AsyncMessageQueue<T>,
    pending: Option<BoxFuture<'static, Result<Option<T>, QueueError>>>,
    finished: bool,
}

impl<T: Send + 'static> QueueStream<T> {
    pub(crate) fn new(queue: AsyncMessageQueue<T>) -> Self {
        Self {
            queue,
            pending: None,
            finished: false,
        }
    }

    /// Returns `true` once the stream has yielded its last item.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Returns the underlying queue.
    pub fn queue(&self) -> &AsyncMessageQueue<T> {
        &self.queue
    }
}

impl<T: Send + 'static> Stream for QueueStream<T> {
    type Item = Result<T, QueueError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;

        if this.finished {
            return Poll::Ready(None);
        }

        let pull = this.pending.get_or_insert_with(|| {
            let queue = this.queue.clone();
            async move { queue.recv().await }.boxed()
        });
        let result = ready!(pull.poll_unpin(cx));
        this.pending = None;

        match result {
            Ok(Some(message)) => Poll::Ready(Some(Ok(message))),
            Ok(None) => {
                this.finished = true;
                Poll::Ready(None)
            }
            Err(err) => {
                if err.is_terminal() {
                    this.finished = true;
                }
                Poll::Ready(Some(Err(err)))
            }
        }
    }
}

/// Producer adapter implementing `futures::Sink`.
///
/// Every item goes through [`AsyncMessageQueue::try_enqueue`], so it never
/// waits for space. A message discarded by `DropNewest` is not a sink error;
/// it shows up in the `dropped` counter instead. Closing the sink completes
/// the queue.
pub struct QueueSink<T> {
    queue: AsyncMessageQueue<T>,
}

impl<T> QueueSink<T> {
    pub(crate) fn new(queue: AsyncMessageQueue<T>) -> Self {
        Self { queue }
    }
}

impl<T> Sink<T> for QueueSink<T> {
    type Error = QueueError;

    fn poll_ready(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        let status = self.queue.status();
        if status.accepts_messages() {
            Poll::Ready(Ok(()))
        } else {
            Poll::Ready(Err(QueueError::Rejected { status }))
        }
    }

    fn start_send(self: Pin<&mut Self>, item: T) -> Result<(), Self::Error> {
        match self.queue.try_enqueue(item) {
            Ok(()) | Err(QueueError::Dropped) => Ok(()),
            Err(err) => Err(err),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn poll_close(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.queue.complete();
        Poll::Ready(Ok(()))
    }
}
