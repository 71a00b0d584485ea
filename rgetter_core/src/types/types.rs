use std::collections::HashMap;
use std::path::PathBuf;

use serde::Serialize;
use tokio::io::AsyncRead;

/// A readable byte stream for a single source.
///
/// Closing a stream means dropping it. Whoever holds the box is its only reader.
pub type DownloadStream = Box<dyn AsyncRead + Send + Unpin>;

/// A freshly opened source, as handed back by a `Getter`.
pub struct RemoteStream {
    pub stream: DownloadStream,
    /// Total size in bytes, `None` when the origin did not say.
    pub size: Option<u64>,
}

impl RemoteStream {
    pub fn new(stream: DownloadStream, size: Option<u64>) -> Self {
        Self { stream, size }
    }
}

/// Extra request data sent with every HTTP fetch.
#[derive(Debug, Clone, Default)]
pub struct HeaderData {
    pub headers: HashMap<String, Vec<String>>,
    pub authentication: Option<AuthenticationInfo>,
}

#[derive(Debug, Clone)]
pub struct AuthenticationInfo {
    pub username: String,
    pub password: String,
}

/// Outcome of one completed `Client::get`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferStats {
    pub source: String,
    pub destination: PathBuf,
    pub bytes: u64,
    pub size_hint: Option<u64>,
}

#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("{url} responded with status {status}")]
    BadStatus { url: String, status: u16 },

    #[error("no getter registered for scheme '{0}'")]
    UnsupportedScheme(String),

    #[error("invalid client option: {0}")]
    InvalidOption(String),

    #[error("cannot open {}: {source}", path.display())]
    Source {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("read failed: {0}")]
    Read(#[source] std::io::Error),

    #[error("disk error: {0}")]
    Disk(#[source] std::io::Error),

    #[error("download cancelled")]
    Cancelled,
}
