pub mod classifier;
pub mod cli;
pub mod downloader;
pub mod error;
pub mod fetcher;
pub mod file_manager;
pub mod html_parser;
pub mod mirror;
pub mod naming;
pub mod page;
pub mod plan;
pub mod rewriter;

// Re-export main types for convenience
pub use cli::MirrorCommand;
pub use downloader::{AssetDownloader, AssetOutcome};
pub use error::{AssetError, DiscoveryWarning, FetchError, MirrorError, Stage};
pub use fetcher::{Fetcher, HttpFetcher};
pub use file_manager::{FileManager, Storage};
pub use html_parser::{AssetKind, AssetReference, HtmlParser};
pub use mirror::{MirrorOptions, MirrorResult, PageMirror};
pub use page::PageTarget;
pub use plan::{DownloadPlan, ResolvedAsset};
pub use rewriter::HtmlRewriter;
