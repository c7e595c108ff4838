//! Byte counting for transfer progress. Purely an observer of the stream.

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures_util::Stream;

/// Sink for progress updates, typically a progress bar.
pub trait Tracker: Send {
    fn set_length(&self, len: u64);
    fn set_position(&self, pos: u64);
    fn finish(&self);
}

/// Monotonic byte counter that never passes a known total.
///
/// A retried read can deliver more bytes than were declared; the displayed
/// position stays at the total in that case.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClampedCounter {
    position: u64,
    total:    Option<u64>,
}

impl ClampedCounter {
    pub fn new(total: Option<u64>) -> Self {
        Self {
            position: 0,
            total: total.filter(|total| *total > 0),
        }
    }

    pub fn advance(&mut self, n: usize) -> u64 {
        self.position = self.position.saturating_add(n as u64);
        if let Some(total) = self.total {
            self.position = self.position.min(total);
        }
        self.position
    }

    pub fn position(&self) -> u64 { self.position }

    pub fn total(&self) -> Option<u64> { self.total }
}

/// Stream adapter reporting every chunk to a [`Tracker`].
pub struct ProgressStream<S, T: Tracker> {
    inner:    S,
    counter:  ClampedCounter,
    tracker:  T,
    finished: bool,
}

impl<S, T: Tracker> ProgressStream<S, T> {
    pub fn new(inner: S, total: Option<u64>, tracker: T) -> Self {
        let counter = ClampedCounter::new(total);
        if let Some(total) = counter.total() {
            tracker.set_length(total);
        }
        Self {
            inner,
            counter,
            tracker,
            finished: false,
        }
    }

    pub fn position(&self) -> u64 { self.counter.position() }

    fn finish(&mut self) {
        if !self.finished {
            self.finished = true;
            self.tracker.finish();
        }
    }
}

impl<S, T> Stream for ProgressStream<S, T>
where
    S: Stream<Item = io::Result<Bytes>> + Unpin,
    T: Tracker + Unpin,
{
    type Item = io::Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        match Pin::new(&mut this.inner).poll_next(cx) {
            Poll::Ready(Some(Ok(chunk))) => {
                let pos = this.counter.advance(chunk.len());
                this.tracker.set_position(pos);
                Poll::Ready(Some(Ok(chunk)))
            }
            Poll::Ready(Some(Err(err))) => {
                this.finish();
                Poll::Ready(Some(Err(err)))
            }
            Poll::Ready(None) => {
                this.finish();
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}
