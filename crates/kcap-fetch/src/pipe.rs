//! Single-producer, single-consumer byte pipe between the async copy loop and
//! the blocking validator.

use std::io::{self, Read};

use bytes::{Buf, Bytes};
use tokio::sync::mpsc;

/// One chunk in flight at a time; the producer waits for the consumer.
const PIPE_CAPACITY: usize = 1;

pub fn pipe() -> (PipeWriter, PipeReader) {
    let (tx, rx) = mpsc::channel(PIPE_CAPACITY);
    (
        PipeWriter { tx: Some(tx) },
        PipeReader {
            rx,
            current: Bytes::new(),
            done: false,
        },
    )
}

pub struct PipeWriter {
    tx: Option<mpsc::Sender<io::Result<Bytes>>>,
}

impl PipeWriter {
    /// Send a chunk. Returns `false` once the reader is gone; later sends are no-ops.
    pub async fn send(&mut self, chunk: Bytes) -> bool {
        let Some(tx) = &self.tx else {
            return false;
        };
        if tx.send(Ok(chunk)).await.is_err() {
            self.tx = None;
            return false;
        }
        true
    }

    /// Close the pipe. The reader observes `err` on its next read, or
    /// end-of-stream when `err` is `None`.
    pub async fn close_with_error(mut self, err: Option<io::Error>) {
        if let (Some(tx), Some(err)) = (self.tx.take(), err) {
            let _ = tx.send(Err(err)).await;
        }
    }
}

/// Blocking reader side. Must not be used from an async context.
pub struct PipeReader {
    rx:      mpsc::Receiver<io::Result<Bytes>>,
    current: Bytes,
    done:    bool,
}

impl Read for PipeReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        while self.current.is_empty() {
            if self.done {
                return Ok(0);
            }
            match self.rx.blocking_recv() {
                Some(Ok(chunk)) => self.current = chunk,
                Some(Err(err)) => {
                    self.done = true;
                    return Err(err);
                }
                None => self.done = true,
            }
        }
        let n = buf.len().min(self.current.len());
        buf[..n].copy_from_slice(&self.current[..n]);
        self.current.advance(n);
        Ok(n)
    }
}
