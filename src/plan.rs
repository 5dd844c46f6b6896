//! The download plan shared by the rewriter and the downloader.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use url::Url;

use crate::classifier::{classify, Classification};
use crate::error::DiscoveryWarning;
use crate::html_parser::AssetReference;
use crate::naming::{asset_file_name, disambiguate, SHORT_HASH_LEN};
use crate::page::PageTarget;

/// A local asset reference with its download source and destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAsset {
    pub reference: AssetReference,
    pub url: Url,
    pub file_name: String,
    pub destination: PathBuf,
}

#[derive(Debug, Clone)]
pub struct DownloadPlan {
    assets_dir: PathBuf,
    assets_dir_name: String,
    assets: Vec<ResolvedAsset>,
    warnings: Vec<DiscoveryWarning>,
}

impl DownloadPlan {
    /// Resolves, classifies and names `references`, keeping only local
    /// assets. Distinct URLs always receive distinct file names.
    pub fn build(page: &PageTarget, references: Vec<AssetReference>, assets_dir: &Path) -> Self {
        let mut local = Vec::new();
        let mut warnings = Vec::new();

        for reference in references {
            match classify(&reference.decoded(), page) {
                Classification::Local(url) => local.push((reference, url)),
                Classification::External(_) => {}
                Classification::Invalid(warning) => {
                    warn!(%warning, "dropping asset reference");
                    warnings.push(warning);
                }
            }
        }

        let names = assign_names(page, local.iter().map(|(_, url)| url));
        let assets = local
            .into_iter()
            .map(|(reference, url)| {
                let file_name = names
                    .get(&url)
                    .cloned()
                    .unwrap_or_else(|| asset_file_name(&url, page));
                let destination = assets_dir.join(&file_name);
                debug!(url = %url, file = %file_name, "planned asset");
                ResolvedAsset {
                    reference,
                    url,
                    file_name,
                    destination,
                }
            })
            .collect();

        Self {
            assets_dir: assets_dir.to_path_buf(),
            assets_dir_name: page.assets_dir_name(),
            assets,
            warnings,
        }
    }

    pub fn assets(&self) -> &[ResolvedAsset] {
        &self.assets
    }

    pub fn warnings(&self) -> &[DiscoveryWarning] {
        &self.warnings
    }

    /// Absolute directory the assets are saved into.
    pub fn assets_dir(&self) -> &Path {
        &self.assets_dir
    }

    pub fn assets_dir_name(&self) -> &str {
        &self.assets_dir_name
    }

    /// Path of an asset relative to the HTML file.
    pub fn relative_path(&self, asset: &ResolvedAsset) -> String {
        format!("{}/{}", self.assets_dir_name, asset.file_name)
    }

    /// One asset per destination, in plan order.
    pub fn downloads(&self) -> impl Iterator<Item = &ResolvedAsset> {
        let mut seen = HashSet::new();
        self.assets
            .iter()
            .filter(move |asset| seen.insert(asset.destination.as_path()))
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

/// Maps each distinct URL to its file name. Every URL whose natural name is
/// shared with another distinct URL gets a hash suffix, so the result does
/// not depend on the order URLs were seen in.
fn assign_names<'a>(
    page: &PageTarget,
    urls: impl Iterator<Item = &'a Url>,
) -> HashMap<Url, String> {
    let distinct: BTreeSet<&Url> = urls.collect();

    let mut by_name: HashMap<String, Vec<&Url>> = HashMap::new();
    for &url in &distinct {
        by_name.entry(asset_file_name(url, page)).or_default().push(url);
    }

    let mut names = HashMap::with_capacity(distinct.len());
    for (name, group) in &by_name {
        if group.len() == 1 {
            names.insert(group[0].clone(), name.clone());
        } else {
            debug!(name = %name, urls = group.len(), "disambiguating colliding asset names");
            for url in group {
                names.insert((*url).clone(), disambiguate(name, url, SHORT_HASH_LEN));
            }
        }
    }

    // A suffixed name can only clash with a natural one by hash coincidence;
    // widen to the full digest for those.
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for name in names.values() {
        *counts.entry(name.as_str()).or_default() += 1;
    }
    let clashing: Vec<Url> = names
        .iter()
        .filter(|(_, name)| counts[name.as_str()] > 1)
        .map(|(url, _)| url.clone())
        .collect();
    for url in clashing {
        let natural = asset_file_name(&url, page);
        names.insert(url.clone(), disambiguate(&natural, &url, usize::MAX));
    }

    names
}
