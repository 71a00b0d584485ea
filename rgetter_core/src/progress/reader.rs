use std::io;
use std::pin::Pin;
use std::task::{ready, Context, Poll};

use tokio::io::{AsyncRead, ReadBuf};

/// What a `ProgressReader` reports to its callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadEvent {
    /// `delta` new bytes went through; `total` so far.
    Advanced { delta: u64, total: u64 },
    /// The inner reader hit EOF. Sent once.
    Finished { total: u64 },
    /// Dropped before EOF (failed or cancelled transfer). Sent once.
    Abandoned { total: u64 },
}

/// Byte-counting `AsyncRead` decorator.
///
/// Forwards every `poll_read` to the inner reader and tells `on_event` how many
/// bytes came through. Pending polls and errors from the inner reader are passed
/// back unchanged and produce no event. The reader owns `inner`, so dropping it
/// closes the inner stream.
pub struct ProgressReader<R, F>
where
    F: FnMut(ReadEvent),
{
    inner: R,
    on_event: F,
    total: u64,
    done: bool,
}

impl<R, F> ProgressReader<R, F>
where
    F: FnMut(ReadEvent),
{
    pub fn new(inner: R, on_event: F) -> Self {
        Self {
            inner,
            on_event,
            total: 0,
            done: false,
        }
    }

    /// Bytes read through this wrapper so far.
    pub fn bytes_read(&self) -> u64 {
        self.total
    }
}

impl<R, F> AsyncRead for ProgressReader<R, F>
where
    R: AsyncRead + Unpin,
    F: FnMut(ReadEvent) + Unpin,
{
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        let before = buf.filled().len();
        let had_room = buf.remaining() > 0;

        ready!(Pin::new(&mut this.inner).poll_read(cx, buf))?;

        let delta = (buf.filled().len() - before) as u64;
        if delta > 0 {
            this.total += delta;
            (this.on_event)(ReadEvent::Advanced {
                delta,
                total: this.total,
            });
        } else if had_room && !this.done {
            // Zero bytes into a non-empty buffer is EOF.
            this.done = true;
            (this.on_event)(ReadEvent::Finished { total: this.total });
        }
        Poll::Ready(Ok(()))
    }
}

impl<R, F> Drop for ProgressReader<R, F>
where
    F: FnMut(ReadEvent),
{
    fn drop(&mut self) {
        if !self.done {
            self.done = true;
            (self.on_event)(ReadEvent::Abandoned { total: self.total });
        }
    }
}
