use std::io;
use std::path::{Path, PathBuf};

use futures::future::try_join_all;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::config::{ClientConfig, ClientOption};
use crate::getter::scheme_of;
use crate::types::types::{DownloadError, DownloadStream, TransferStats};

/// Size of each read from the (possibly wrapped) source stream.
const READ_CHUNK: usize = 64 * 1024;

/// Write buffer in front of the destination file.
const WRITE_BUFFER: usize = 256 * 1024;

/// Fetches sources to local files through the registered getters.
///
/// Each download goes through the same pipeline: the getter for the source's
/// scheme opens the raw stream, the configured progress tracker gets to wrap
/// it, and the client copies the wrapped stream to disk.
pub struct Client {
    config: ClientConfig,
}

impl Client {
    /// Applies `options` in order on top of the defaults. The first failing
    /// option aborts construction and its error is returned.
    pub fn new(options: impl IntoIterator<Item = ClientOption>) -> Result<Self, DownloadError> {
        let mut config = ClientConfig::default();
        for option in options {
            option(&mut config)?;
        }
        config.install_default_getters()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Cancels every in-flight and future download of this client.
    pub fn cancel(&self) {
        self.config.cancel_token().cancel();
    }

    /// Downloads `source` into the file at `destination`.
    ///
    /// Bytes land in a temporary file beside `destination` that is renamed into
    /// place only once the whole stream was copied, so a failed download never
    /// leaves a partial file under the final name.
    pub async fn get(
        &self,
        source: &str,
        destination: impl AsRef<Path>,
    ) -> Result<TransferStats, DownloadError> {
        let destination = destination.as_ref();
        let cancel_token = self.config.cancel_token();
        if cancel_token.is_cancelled() {
            return Err(DownloadError::Cancelled);
        }

        let mut part = PartFile::new(destination)?;
        let scheme = scheme_of(source);
        let getter = self
            .config
            .getter(&scheme)
            .ok_or_else(|| DownloadError::UnsupportedScheme(scheme.clone()))?;

        let remote = tokio::select! {
            _ = cancel_token.cancelled() => return Err(DownloadError::Cancelled),
            opened = getter.open(source) => opened?,
        };
        let size = remote.size;

        // The only point where progress reporting touches the pipeline.
        let stream = self
            .config
            .progress_tracker()
            .track_progress(source, size, remote.stream);

        if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(DownloadError::Disk)?;
        }

        let bytes = match copy_to_file(stream, &part.path, cancel_token).await {
            Ok(bytes) => bytes,
            Err(e) => {
                log::warn!("[Client] {}: download failed: {}", source, e);
                return Err(e);
            }
        };
        tokio::fs::rename(&part.path, destination)
            .await
            .map_err(DownloadError::Disk)?;
        part.keep = true;

        if let Some(expected) = size.filter(|&expected| expected != bytes) {
            log::warn!(
                "[Client] {}: size mismatch, expected {} bytes but copied {}",
                source,
                expected,
                bytes
            );
        }
        log::info!(
            "[Client] {}: saved {} bytes to {}",
            source,
            bytes,
            destination.display()
        );

        Ok(TransferStats {
            source: source.to_string(),
            destination: destination.to_path_buf(),
            bytes,
            size_hint: size,
        })
    }

    /// Runs several downloads concurrently, all sharing this client's tracker.
    /// Stops at the first failure; the remaining downloads are dropped.
    pub async fn get_all(
        &self,
        jobs: &[(String, PathBuf)],
    ) -> Result<Vec<TransferStats>, DownloadError> {
        try_join_all(jobs.iter().map(|(source, destination)| self.get(source, destination))).await
    }
}

/// Temporary file a download is written to before being renamed into place.
/// Removed on drop unless `keep` is set, which also covers futures that are
/// dropped mid-transfer.
struct PartFile {
    path: PathBuf,
    keep: bool,
}

impl PartFile {
    /// `dir/name` → `dir/.name.<uuid>.part`
    fn new(destination: &Path) -> Result<Self, DownloadError> {
        let name = destination.file_name().ok_or_else(|| {
            DownloadError::Disk(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("destination {} has no file name", destination.display()),
            ))
        })?;
        let path = destination.with_file_name(format!(
            ".{}.{}.part",
            name.to_string_lossy(),
            Uuid::new_v4()
        ));
        Ok(Self { path, keep: false })
    }
}

impl Drop for PartFile {
    fn drop(&mut self) {
        if !self.keep {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

/// Copies `stream` to a new file at `path` until EOF, then drops the stream.
async fn copy_to_file(
    mut stream: DownloadStream,
    path: &Path,
    cancel_token: &CancellationToken,
) -> Result<u64, DownloadError> {
    let file = tokio::fs::File::create(path)
        .await
        .map_err(DownloadError::Disk)?;
    let mut writer = tokio::io::BufWriter::with_capacity(WRITE_BUFFER, file);
    let mut buf = vec![0u8; READ_CHUNK];
    let mut copied: u64 = 0;

    loop {
        let n = tokio::select! {
            _ = cancel_token.cancelled() => return Err(DownloadError::Cancelled),
            read = stream.read(&mut buf) => read.map_err(DownloadError::Read)?,
        };
        if n == 0 {
            break;
        }
        writer
            .write_all(&buf[..n])
            .await
            .map_err(DownloadError::Disk)?;
        copied += n as u64;
    }
    drop(stream);

    writer.flush().await.map_err(DownloadError::Disk)?;
    Ok(copied)
}
