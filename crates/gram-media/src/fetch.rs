//! HTTP mirroring of remote files
//!
//! The fetch contract is deliberately soft: a non-2xx response or a network
//! failure is reported as `false`, never as an error, so one unreachable
//! source cannot abort the unit of work that asked for it.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::error::MediaError;

const USER_AGENT: &str = "gram-bot/0.1";
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Port for downloading remote files to local paths
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Download `url` into `dest`, creating parent directories as needed.
    ///
    /// Returns `Ok(true)` once the file is fully written, `Ok(false)` when
    /// the source is unreachable or answered non-2xx. Local I/O problems
    /// are real errors.
    async fn mirror(&self, url: &str, dest: &Path) -> Result<bool, MediaError>;
}

/// reqwest-backed [`Fetcher`]
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a fetcher with its own connection pool
    pub fn new() -> Result<Self, MediaError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(FETCH_TIMEOUT)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn mirror(&self, url: &str, dest: &Path) -> Result<bool, MediaError> {
        let response = match self.client.get(url).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!(url, error = %e, "fetch failed");
                return Ok(false);
            }
        };

        if !response.status().is_success() {
            debug!(url, status = %response.status(), "fetch returned non-success status");
            return Ok(false);
        }

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = tokio::fs::File::create(dest).await?;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            match chunk {
                Ok(bytes) => file.write_all(&bytes).await?,
                Err(e) => {
                    // Drop the partial file rather than leave a truncated mirror
                    warn!(url, error = %e, "fetch aborted mid-stream");
                    drop(file);
                    let _ = tokio::fs::remove_file(dest).await;
                    return Ok(false);
                }
            }
        }

        file.flush().await?;
        Ok(true)
    }
}
