use std::sync::{Arc, OnceLock};

use crate::types::types::DownloadStream;

/// Trait for anything that wants to observe the bytes of a download.
///
/// The `Client` calls `track_progress` exactly once per fetched source, right
/// after the getter has opened the stream and before anything reads from it.
/// The client then reads only the returned stream until EOF and drops it.
///
/// Contract for implementors:
/// - The returned stream must yield exactly the bytes of `stream`, in order.
/// - `size` is `None` when the origin did not report a length. That is not an
///   error; show indeterminate progress instead.
/// - Rendering failures stay inside the tracker. They never surface as a read
///   error.
/// - If wrapping is impossible, hand `stream` back untouched.
///
/// Several downloads may call the same tracker concurrently, so any shared
/// state needs its own synchronisation.
pub trait ProgressTracker: Send + Sync + 'static {
    fn track_progress(&self, source: &str, size: Option<u64>, stream: DownloadStream)
        -> DownloadStream;
}

impl<T: ProgressTracker + ?Sized> ProgressTracker for Arc<T> {
    fn track_progress(
        &self,
        source: &str,
        size: Option<u64>,
        stream: DownloadStream,
    ) -> DownloadStream {
        (**self).track_progress(source, size, stream)
    }
}

impl<T: ProgressTracker + ?Sized> ProgressTracker for Box<T> {
    fn track_progress(
        &self,
        source: &str,
        size: Option<u64>,
        stream: DownloadStream,
    ) -> DownloadStream {
        (**self).track_progress(source, size, stream)
    }
}

/// A tracker that has no effect: the stream comes back as it went in.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgressTracker;

impl ProgressTracker for NoopProgressTracker {
    fn track_progress(&self, _: &str, _: Option<u64>, stream: DownloadStream) -> DownloadStream {
        stream
    }
}

/// Shared passthrough instance used when a client has no tracker installed.
pub fn noop_progress_tracker() -> &'static Arc<dyn ProgressTracker> {
    static NOOP: OnceLock<Arc<dyn ProgressTracker>> = OnceLock::new();
    NOOP.get_or_init(|| Arc::new(NoopProgressTracker))
}
