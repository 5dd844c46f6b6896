use std::path::PathBuf;
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{debug, warn};
use url::Url;

use crate::error::AssetError;
use crate::fetcher::Fetcher;
use crate::file_manager::Storage;
use crate::plan::{DownloadPlan, ResolvedAsset};

pub const DEFAULT_MAX_CONCURRENT: usize = 8;

/// Terminal outcome of one asset download.
#[derive(Debug)]
pub struct AssetOutcome {
    pub url: Url,
    pub destination: PathBuf,
    /// Bytes written on success.
    pub result: Result<usize, AssetError>,
}

impl AssetOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Fetches planned assets concurrently and writes them to their destinations.
pub struct AssetDownloader {
    fetcher: Arc<dyn Fetcher>,
    storage: Arc<dyn Storage>,
    semaphore: Arc<Semaphore>,
}

impl AssetDownloader {
    pub fn new(fetcher: Arc<dyn Fetcher>, storage: Arc<dyn Storage>, max_concurrent: usize) -> Self {
        Self {
            fetcher,
            storage,
            semaphore: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    /// Downloads every distinct asset in the plan. Returns once all of them
    /// have settled; a failure is recorded on its own outcome only.
    pub async fn download_all(&self, plan: &DownloadPlan) -> Vec<AssetOutcome> {
        join_all(plan.downloads().map(|asset| self.download(asset))).await
    }

    async fn download(&self, asset: &ResolvedAsset) -> AssetOutcome {
        // The semaphore is never closed, so acquiring cannot fail.
        let _permit = self.semaphore.acquire().await.ok();

        let result = self.fetch_and_write(asset).await;
        match &result {
            Ok(bytes) => debug!(url = %asset.url, bytes, "asset saved"),
            Err(e) => warn!(url = %asset.url, error = %e, "asset download failed"),
        }

        AssetOutcome {
            url: asset.url.clone(),
            destination: asset.destination.clone(),
            result,
        }
    }

    async fn fetch_and_write(&self, asset: &ResolvedAsset) -> Result<usize, AssetError> {
        let content = self.fetcher.fetch(&asset.url).await?;
        self.storage
            .write_file(&asset.destination, &content)
            .await
            .map_err(|source| AssetError::Write {
                path: asset.destination.clone(),
                source,
            })?;
        Ok(content.len())
    }
}
