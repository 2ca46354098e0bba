//! Fetching raw strategies bytes from a file or a URL.

use std::fmt;
use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;
use url::Url;

/// Errors that can occur while fetching the strategies document.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The local file could not be read.
    #[error("failed to read strategies file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The HTTP request failed before a full response was read.
    #[error("failed to download sampling strategies: {0}")]
    Http(#[from] reqwest::Error),

    /// The response arrived but its body could not be read.
    #[error("failed to read sampling strategies HTTP response body: {0}")]
    Body(#[source] reqwest::Error),

    /// The server answered with a status other than 200 or 503.
    #[error("receiving {status} while downloading strategies file: {body}")]
    Status { status: StatusCode, body: String },
}

/// Result of a successful fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetched {
    /// The raw document bytes.
    Content(Vec<u8>),
    /// The remote source reported 503; there is nothing new to apply.
    Unavailable,
}

/// Where the strategies document lives.
#[derive(Debug, Clone)]
pub enum StrategySource {
    File(PathBuf),
    Url { client: reqwest::Client, url: Url },
}

impl StrategySource {
    /// Classify a configured source string.
    ///
    /// Anything that parses as an absolute URL with both a scheme and a host is
    /// fetched over HTTP; everything else is a local path.
    pub fn classify(source: &str) -> Self {
        match Url::parse(source) {
            Ok(url) if url.host_str().is_some_and(|host| !host.is_empty()) => Self::Url {
                client: reqwest::Client::new(),
                url,
            },
            _ => Self::File(PathBuf::from(source)),
        }
    }

    pub fn is_url(&self) -> bool {
        matches!(self, Self::Url { .. })
    }

    /// Fetch the current document. No retries; the caller decides when to try again.
    pub async fn fetch(&self) -> Result<Fetched, SourceError> {
        match self {
            Self::File(path) => {
                tracing::debug!(filename = %path.display(), "Loading sampling strategies");
                let bytes = tokio::fs::read(path).await.map_err(|source| SourceError::Io {
                    path: path.clone(),
                    source,
                })?;
                Ok(Fetched::Content(bytes))
            }
            Self::Url { client, url } => {
                tracing::debug!(url = %url, "Downloading sampling strategies");
                let response = client.get(url.clone()).send().await?;
                let status = response.status();

                if status == StatusCode::SERVICE_UNAVAILABLE {
                    return Ok(Fetched::Unavailable);
                }
                if status != StatusCode::OK {
                    let body = response.text().await.map_err(SourceError::Body)?;
                    return Err(SourceError::Status { status, body });
                }

                let body = response.bytes().await.map_err(SourceError::Body)?;
                Ok(Fetched::Content(body.to_vec()))
            }
        }
    }
}

impl fmt::Display for StrategySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url { url, .. } => write!(f, "{}", url),
        }
    }
}
