//! Origin classification of discovered asset references.

use tracing::debug;
use url::{ParseError, Url};

use crate::error::DiscoveryWarning;
use crate::page::PageTarget;

/// How a raw reference relates to the page being mirrored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Same host as the page; carries the resolved URL without fragment.
    Local(Url),
    /// Different host or a scheme that cannot be fetched; left untouched.
    External(Url),
    /// Could not be parsed; dropped from the plan.
    Invalid(DiscoveryWarning),
}

/// True if `url` is fetchable over HTTP(S) and its host equals the page's
/// host exactly.
pub fn is_local(url: &Url, page: &PageTarget) -> bool {
    matches!(url.scheme(), "http" | "https") && url.host_str() == Some(page.host())
}

fn has_host_delimiter(raw: &str) -> bool {
    raw.contains("://") || raw.starts_with("//")
}

/// Resolves `raw` against the page URL and classifies the result.
pub fn classify(raw: &str, page: &PageTarget) -> Classification {
    let resolved = match Url::parse(raw) {
        Ok(url) => Ok(url),
        Err(ParseError::RelativeUrlWithoutBase) => page.url().join(raw),
        Err(e) if has_host_delimiter(raw) => Err(e),
        Err(_) => page.url().join(raw),
    };

    match resolved {
        Ok(mut url) => {
            url.set_fragment(None);
            if is_local(&url, page) {
                Classification::Local(url)
            } else {
                debug!(reference = raw, "leaving external reference untouched");
                Classification::External(url)
            }
        }
        Err(e) => Classification::Invalid(DiscoveryWarning {
            raw: raw.to_string(),
            reason: e.to_string(),
        }),
    }
}
