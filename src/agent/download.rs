//! Installer Download

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::{debug, info, warn};
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;

use crate::error::{Result, SetupError};

/// Fetches a remote artifact to a local path.
#[async_trait]
pub trait Downloader: Send + Sync {
    /// Downloads `url` to `destination` and returns the written path.
    async fn download(&self, url: &str, destination: &Path) -> Result<PathBuf>;
}

/// Streams artifacts over HTTP(S) with `reqwest`.
#[derive(Debug, Default, Clone)]
pub struct HttpDownloader {
    client: reqwest::Client,
}

impl HttpDownloader {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Downloader for HttpDownloader {
    async fn download(&self, url: &str, destination: &Path) -> Result<PathBuf> {
        let failed = |message: String| SetupError::Download {
            url: url.to_string(),
            message,
        };

        info!("Downloading {}", url);

        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| failed(e.to_string()))?;

        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut file = File::create(destination).await?;
        let copied = async {
            let mut written: u64 = 0;
            while let Some(chunk) = response.chunk().await.map_err(|e| failed(e.to_string()))? {
                file.write_all(&chunk).await?;
                written += chunk.len() as u64;
            }
            file.flush().await?;
            Ok::<u64, SetupError>(written)
        }
        .await;

        let written = match copied {
            Ok(written) => written,
            Err(e) => {
                drop(file);
                remove_partial(destination).await;
                return Err(e);
            }
        };

        debug!("Wrote {} bytes to {}", written, destination.display());
        Ok(destination.to_path_buf())
    }
}

/// Deletes a partly written download, ignoring a file that is already gone.
async fn remove_partial(path: &Path) {
    if let Err(e) = fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!("Could not remove partial download {}: {}", path.display(), e);
        }
    }
}
