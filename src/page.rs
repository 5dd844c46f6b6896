use url::Url;

use crate::error::MirrorError;
use crate::naming::collapse;

/// The page being mirrored.
#[derive(Debug, Clone)]
pub struct PageTarget {
    url: Url,
    host: String,
    prefix: String,
    base_dir: String,
}

impl PageTarget {
    pub fn parse(raw: &str) -> Result<Self, MirrorError> {
        let invalid = |reason: String| MirrorError::InvalidPageUrl {
            url: raw.to_string(),
            reason,
        };

        let mut url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme {:?}", url.scheme())));
        }
        let host = url
            .host_str()
            .ok_or_else(|| invalid("missing host".to_string()))?
            .to_string();
        url.set_fragment(None);

        let prefix = if url.path() == "/" {
            collapse(&host)
        } else {
            collapse(&format!("{}{}", host, url.path()))
        };
        let base_dir = match url.path().rfind('/') {
            Some(i) => url.path()[..=i].to_string(),
            None => "/".to_string(),
        };

        Ok(Self {
            url,
            host,
            prefix,
            base_dir,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Host and path with non-alphanumeric runs collapsed, e.g.
    /// `example-com-blog-about`.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Directory part of the page path, always ending in `/`.
    pub fn base_dir(&self) -> &str {
        &self.base_dir
    }

    pub fn html_file_name(&self) -> String {
        format!("{}.html", self.prefix)
    }

    pub fn assets_dir_name(&self) -> String {
        format!("{}_files", self.prefix)
    }
}
