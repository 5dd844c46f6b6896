use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use crate::downloader::{AssetDownloader, AssetOutcome, DEFAULT_MAX_CONCURRENT};
use crate::error::{DiscoveryWarning, MirrorError};
use crate::fetcher::{Fetcher, HttpFetcher, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT};
use crate::file_manager::{FileManager, Storage};
use crate::html_parser::HtmlParser;
use crate::page::PageTarget;
use crate::plan::DownloadPlan;
use crate::rewriter::HtmlRewriter;

/// Settings for one mirror run.
#[derive(Debug, Clone)]
pub struct MirrorOptions {
    pub output_dir: PathBuf,
    pub max_concurrent: usize,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for MirrorOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// What a successful run produced.
#[derive(Debug)]
pub struct MirrorResult {
    pub html_path: PathBuf,
    pub assets_dir: PathBuf,
    pub assets: Vec<AssetOutcome>,
    pub warnings: Vec<DiscoveryWarning>,
}

impl MirrorResult {
    pub fn failed_assets(&self) -> impl Iterator<Item = &AssetOutcome> {
        self.assets.iter().filter(|outcome| !outcome.is_success())
    }

    /// True when every asset was saved and no reference was dropped.
    pub fn is_complete(&self) -> bool {
        self.warnings.is_empty() && self.assets.iter().all(AssetOutcome::is_success)
    }
}

/// Mirrors a single page and its same-host assets to disk.
pub struct PageMirror {
    fetcher: Arc<dyn Fetcher>,
    storage: Arc<dyn Storage>,
    parser: HtmlParser,
    rewriter: HtmlRewriter,
    options: MirrorOptions,
}

impl PageMirror {
    pub fn new(options: MirrorOptions) -> Result<Self, MirrorError> {
        let fetcher =
            HttpFetcher::new(options.timeout, &options.user_agent).map_err(MirrorError::Client)?;
        Ok(Self::with_collaborators(
            Arc::new(fetcher),
            Arc::new(FileManager::new()),
            options,
        ))
    }

    pub fn with_collaborators(
        fetcher: Arc<dyn Fetcher>,
        storage: Arc<dyn Storage>,
        options: MirrorOptions,
    ) -> Self {
        Self {
            fetcher,
            storage,
            parser: HtmlParser::new(),
            rewriter: HtmlRewriter::new(),
            options,
        }
    }

    /// Runs the pipeline. Fetching the page, creating the assets directory
    /// and writing the HTML are fatal when they fail; asset failures are
    /// reported on the result.
    #[instrument(level = "info", skip(self))]
    pub async fn mirror(&self, page_url: &str) -> Result<MirrorResult, MirrorError> {
        let page = PageTarget::parse(page_url)?;
        let output_dir = absolute(&self.options.output_dir)?;
        let html_path = output_dir.join(page.html_file_name());

        debug!(url = %page.url(), "fetching page");
        let body = self
            .fetcher
            .fetch(page.url())
            .await
            .map_err(MirrorError::FetchPage)?;
        if std::str::from_utf8(&body).is_err() {
            warn!("page is not valid UTF-8; its bytes are kept as fetched");
        }

        let references = self.parser.discover(&body);
        debug!(references = references.len(), "discovered asset references");

        let plan = DownloadPlan::build(
            &page,
            references,
            &output_dir.join(page.assets_dir_name()),
        );
        info!(
            assets = plan.assets().len(),
            warnings = plan.warnings().len(),
            "built download plan"
        );

        let rewritten = self
            .rewriter
            .rewrite(&body, &plan)
            .map_err(MirrorError::Rewrite)?;

        self.storage
            .create_dir_all(plan.assets_dir())
            .await
            .map_err(|source| MirrorError::CreateAssetsDir {
                path: plan.assets_dir().to_path_buf(),
                source,
            })?;

        self.storage
            .write_file(&html_path, &rewritten)
            .await
            .map_err(|source| MirrorError::WriteHtml {
                path: html_path.clone(),
                source,
            })?;
        debug!(path = %html_path.display(), "html written");

        let assets = if plan.is_empty() {
            Vec::new()
        } else {
            AssetDownloader::new(
                self.fetcher.clone(),
                self.storage.clone(),
                self.options.max_concurrent,
            )
            .download_all(&plan)
            .await
        };

        let result = MirrorResult {
            html_path,
            assets_dir: plan.assets_dir().to_path_buf(),
            assets,
            warnings: plan.warnings().to_vec(),
        };
        let failed = result.failed_assets().count();
        if failed > 0 {
            warn!(failed, total = result.assets.len(), "some assets could not be saved");
        }
        info!(path = %result.html_path.display(), "page mirrored");
        Ok(result)
    }
}

fn absolute(path: &Path) -> Result<PathBuf, MirrorError> {
    std::path::absolute(path).map_err(|source| MirrorError::OutputDir {
        path: path.to_path_buf(),
        source,
    })
}
