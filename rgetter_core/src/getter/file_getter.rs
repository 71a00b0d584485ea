use std::io;
use std::path::PathBuf;

use async_trait::async_trait;

use super::getter::Getter;
use crate::types::types::{DownloadError, RemoteStream};

/// Reads sources from the local filesystem (`file://` URLs and bare paths).
#[derive(Debug, Default, Clone, Copy)]
pub struct FileGetter;

impl FileGetter {
    pub fn new() -> Self {
        Self
    }
}

/// `file:///tmp/a` → `/tmp/a`, matching the scheme case-insensitively like
/// `scheme_of` does. Bare paths come back unchanged.
fn strip_file_scheme(source: &str) -> &str {
    const PREFIX: &str = "file://";
    match source.get(..PREFIX.len()) {
        Some(head) if head.eq_ignore_ascii_case(PREFIX) => &source[PREFIX.len()..],
        _ => source,
    }
}

#[async_trait]
impl Getter for FileGetter {
    async fn open(&self, source: &str) -> Result<RemoteStream, DownloadError> {
        let path = PathBuf::from(strip_file_scheme(source));
        let source_err = |e: io::Error| DownloadError::Source {
            path: path.clone(),
            source: e,
        };

        let file = tokio::fs::File::open(&path).await.map_err(source_err)?;
        let metadata = file.metadata().await.map_err(source_err)?;
        if !metadata.is_file() {
            return Err(source_err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "not a regular file",
            )));
        }

        log::debug!(
            "[FileGetter] opened {} ({} bytes)",
            path.display(),
            metadata.len()
        );
        Ok(RemoteStream::new(Box::new(file), Some(metadata.len())))
    }
}
