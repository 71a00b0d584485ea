use async_trait::async_trait;

use crate::types::types::{DownloadError, RemoteStream};

/// Opens a source for one scheme and hands back its raw byte stream.
///
/// Getters know nothing about progress reporting; the `Client` decides what
/// wraps the stream they return.
#[async_trait]
pub trait Getter: Send + Sync {
    /// Open `source` and return a stream positioned at the first byte of content,
    /// along with the total size when the origin reports it.
    async fn open(&self, source: &str) -> Result<RemoteStream, DownloadError>;
}
