#![allow(dead_code)]

use std::io;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use async_trait::async_trait;
use tokio::io::{AsyncRead, ReadBuf};

use rgetter_core::getter::Getter;
use rgetter_core::progress::{ProgressReader, ProgressTracker, ReadEvent};
use rgetter_core::types::types::{DownloadError, DownloadStream, RemoteStream};

/// Generates deterministic test data.
pub fn generate_test_data(size: usize) -> Vec<u8> {
    (0..size).map(|i| (i % 251) as u8).collect()
}

/// Tracker that counts what flows through the streams it wraps.
#[derive(Default)]
pub struct CountingTracker {
    pub calls: Mutex<Vec<(String, Option<u64>)>>,
    pub bytes: Arc<AtomicU64>,
    pub finished: Arc<AtomicUsize>,
    pub abandoned: Arc<AtomicUsize>,
}

impl CountingTracker {
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn sources(&self) -> Vec<String> {
        let mut sources: Vec<String> = self
            .calls
            .lock()
            .unwrap()
            .iter()
            .map(|(source, _)| source.clone())
            .collect();
        sources.sort();
        sources
    }
}

impl ProgressTracker for CountingTracker {
    fn track_progress(
        &self,
        source: &str,
        size: Option<u64>,
        stream: DownloadStream,
    ) -> DownloadStream {
        self.calls.lock().unwrap().push((source.to_string(), size));
        let bytes = self.bytes.clone();
        let finished = self.finished.clone();
        let abandoned = self.abandoned.clone();
        Box::new(ProgressReader::new(stream, move |event| match event {
            ReadEvent::Advanced { delta, .. } => {
                bytes.fetch_add(delta, Ordering::SeqCst);
            }
            ReadEvent::Finished { .. } => {
                finished.fetch_add(1, Ordering::SeqCst);
            }
            ReadEvent::Abandoned { .. } => {
                abandoned.fetch_add(1, Ordering::SeqCst);
            }
        }))
    }
}

/// In-memory stream that counts how many times it was dropped.
pub struct TrackedStream {
    inner: io::Cursor<Vec<u8>>,
    drops: Arc<AtomicUsize>,
}

impl TrackedStream {
    pub fn new(data: Vec<u8>) -> (Self, Arc<AtomicUsize>) {
        let drops = Arc::new(AtomicUsize::new(0));
        (
            Self {
                inner: io::Cursor::new(data),
                drops: drops.clone(),
            },
            drops,
        )
    }
}

impl AsyncRead for TrackedStream {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_read(cx, buf)
    }
}

impl Drop for TrackedStream {
    fn drop(&mut self) {
        self.drops.fetch_add(1, Ordering::SeqCst);
    }
}

/// Yields `prefix` and then fails every further read with `ConnectionReset`.
pub struct FailingStream {
    prefix: Option<Vec<u8>>,
}

impl FailingStream {
    pub const MESSAGE: &'static str = "peer went away";

    pub fn new(prefix: Vec<u8>) -> Self {
        Self {
            prefix: Some(prefix),
        }
    }
}

impl AsyncRead for FailingStream {
    fn poll_read(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.prefix.take() {
            Some(prefix) => {
                buf.put_slice(&prefix);
                Poll::Ready(Ok(()))
            }
            None => Poll::Ready(Err(io::Error::new(
                io::ErrorKind::ConnectionReset,
                Self::MESSAGE,
            ))),
        }
    }
}

/// Getter serving a fixed body from memory.
pub struct MemGetter {
    pub data: Vec<u8>,
    pub report_size: bool,
}

#[async_trait]
impl Getter for MemGetter {
    async fn open(&self, _source: &str) -> Result<RemoteStream, DownloadError> {
        let size = self.report_size.then_some(self.data.len() as u64);
        Ok(RemoteStream::new(
            Box::new(io::Cursor::new(self.data.clone())),
            size,
        ))
    }
}

/// Getter whose stream fails after a few bytes.
pub struct BrokenGetter;

#[async_trait]
impl Getter for BrokenGetter {
    async fn open(&self, _source: &str) -> Result<RemoteStream, DownloadError> {
        Ok(RemoteStream::new(
            Box::new(FailingStream::new(b"partial".to_vec())),
            Some(1024),
        ))
    }
}

/// Getter whose stream never ends.
pub struct EndlessGetter;

#[async_trait]
impl Getter for EndlessGetter {
    async fn open(&self, _source: &str) -> Result<RemoteStream, DownloadError> {
        Ok(RemoteStream::new(Box::new(tokio::io::repeat(0x2a)), None))
    }
}
