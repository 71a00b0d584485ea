use std::io;

use async_trait::async_trait;
use base64::Engine;
use futures::TryStreamExt;
use reqwest::Client;
use tokio_util::io::StreamReader;

use super::getter::Getter;
use crate::types::types::{DownloadError, HeaderData, RemoteStream};

/// Applies custom headers and auth to a request builder.
/// Skips any caller-supplied `Range` header: a getter always fetches the whole
/// body, and a stray range would hand back a truncated stream.
fn apply_headers(
    mut builder: reqwest::RequestBuilder,
    header_data: &HeaderData,
    precomputed_auth: Option<&str>,
) -> reqwest::RequestBuilder {
    for (key, values) in &header_data.headers {
        if key.eq_ignore_ascii_case("range") {
            continue;
        }
        for value in values {
            builder = builder.header(key, value);
        }
    }
    if let Some(auth_value) = precomputed_auth {
        builder = builder.header("Authorization", auth_value);
    }
    builder
}

/// Pre-computes the Basic auth header value, if authentication is configured.
fn precompute_auth(header_data: &HeaderData) -> Option<String> {
    header_data.authentication.as_ref().map(|auth| {
        let credentials = format!("{}:{}", auth.username, auth.password);
        let encoded = base64::engine::general_purpose::STANDARD.encode(&credentials);
        format!("Basic {}", encoded)
    })
}

/// Fetches `http://` and `https://` sources with a single GET.
pub struct HttpGetter {
    client: Client,
    header_data: HeaderData,
    auth_header: Option<String>,
}

impl HttpGetter {
    /// Builds a getter with its own connection pool. `insecure` turns off TLS
    /// certificate validation.
    pub fn new(header_data: HeaderData, insecure: bool) -> Result<Self, DownloadError> {
        let client = Client::builder()
            .connect_timeout(std::time::Duration::from_secs(10))
            .tcp_nodelay(true)
            .danger_accept_invalid_certs(insecure)
            .build()?;
        Ok(Self::with_client(client, header_data))
    }

    /// Uses an already configured `reqwest::Client`.
    pub fn with_client(client: Client, header_data: HeaderData) -> Self {
        let auth_header = precompute_auth(&header_data);
        Self {
            client,
            header_data,
            auth_header,
        }
    }
}

#[async_trait]
impl Getter for HttpGetter {
    async fn open(&self, source: &str) -> Result<RemoteStream, DownloadError> {
        let builder = apply_headers(
            self.client.get(source),
            &self.header_data,
            self.auth_header.as_deref(),
        );
        let response = builder.send().await?;

        let status = response.status();
        let size = response.content_length();
        log::info!(
            "[HttpGetter] {}: response status={}, content_length={:?}",
            source,
            status,
            size
        );
        if !status.is_success() {
            return Err(DownloadError::BadStatus {
                url: source.to_string(),
                status: status.as_u16(),
            });
        }

        // Body errors surface as io::Error from the reader; the reqwest error
        // stays reachable as the io error's inner source.
        let body = Box::pin(response.bytes_stream().map_err(io::Error::other));
        Ok(RemoteStream::new(Box::new(StreamReader::new(body)), size))
    }
}
