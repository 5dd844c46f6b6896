//! Error types for page mirroring.
//!
//! Fatal failures abort a run and surface as [`MirrorError`]. Per-asset
//! failures are recorded as [`AssetError`] on the asset's outcome, and
//! references that cannot be turned into URLs become [`DiscoveryWarning`]s.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while retrieving a URL.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error fetching {url}: {source}")]
    Network {
        /// The URL that failed.
        url: String,
        /// The underlying client error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout fetching {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// Non-2xx HTTP response.
    #[error("HTTP {status} fetching {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },
}

impl FetchError {
    /// Classifies a reqwest error as a timeout or a network failure.
    pub fn from_reqwest(url: impl Into<String>, source: reqwest::Error) -> Self {
        let url = url.into();
        if source.is_timeout() {
            Self::Timeout { url }
        } else {
            Self::Network { url, source }
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }
}

/// A non-fatal failure recorded against a single asset.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Pipeline stages that can abort a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ParseTarget,
    FetchPage,
    RewriteHtml,
    CreateAssetsDir,
    WriteHtml,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::ParseTarget => "parse target",
            Stage::FetchPage => "fetch page",
            Stage::RewriteHtml => "rewrite html",
            Stage::CreateAssetsDir => "create assets directory",
            Stage::WriteHtml => "write html",
        };
        f.write_str(name)
    }
}

/// Fatal errors: the run produced nothing usable.
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("invalid page URL {url}: {reason}")]
    InvalidPageUrl { url: String, reason: String },

    #[error("cannot resolve output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to fetch page: {0}")]
    FetchPage(#[source] FetchError),

    #[error("failed to rewrite html: {0}")]
    Rewrite(#[source] lol_html::errors::RewritingError),

    #[error("failed to create assets directory {path}: {source}")]
    CreateAssetsDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write html file {path}: {source}")]
    WriteHtml {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl MirrorError {
    /// The stage the run was in when it failed.
    pub fn stage(&self) -> Stage {
        match self {
            Self::InvalidPageUrl { .. } | Self::OutputDir { .. } | Self::Client(_) => {
                Stage::ParseTarget
            }
            Self::FetchPage(_) => Stage::FetchPage,
            Self::Rewrite(_) => Stage::RewriteHtml,
            Self::CreateAssetsDir { .. } => Stage::CreateAssetsDir,
            Self::WriteHtml { .. } => Stage::WriteHtml,
        }
    }
}

/// A discovered reference that could not be turned into a URL. The reference
/// is dropped from the plan and the run continues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryWarning {
    pub raw: String,
    pub reason: String,
}

impl fmt::Display for DiscoveryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "skipped asset reference {:?}: {}", self.raw, self.reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_message() {
        let err = FetchError::http_status("http://example.com/a.css", 404);
        assert_eq!(err.to_string(), "HTTP 404 fetching http://example.com/a.css");
    }

    #[test]
    fn test_stage_of_fatal_errors() {
        let err = MirrorError::FetchPage(FetchError::Timeout {
            url: "http://example.com".to_string(),
        });
        assert_eq!(err.stage(), Stage::FetchPage);

        let err = MirrorError::WriteHtml {
            path: PathBuf::from("/tmp/out.html"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.stage(), Stage::WriteHtml);
        assert_eq!(err.stage().to_string(), "write html");
    }

    #[test]
    fn test_asset_error_wraps_fetch_error() {
        let err: AssetError = FetchError::http_status("http://example.com/x.js", 500).into();
        assert_eq!(err.to_string(), "HTTP 500 fetching http://example.com/x.js");
    }
}
