//! Deterministic URL-to-file-name mapping.
//!
//! Every name produced here is a pure function of its input: it contains only
//! ASCII alphanumerics, `-`, and an optional `.ext` suffix, so it can never
//! escape the assets directory.

use sha2::{Digest, Sha256};
use url::Url;

use crate::page::PageTarget;

pub const SEPARATOR: char = '-';

/// Hex digits of the URL hash used to disambiguate colliding names.
pub const SHORT_HASH_LEN: usize = 8;

const FALLBACK_STEM: &str = "index";

/// Replaces every run of non-alphanumeric characters with a single
/// [`SEPARATOR`] and trims separators from both ends.
pub fn collapse(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending = false;
    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            if pending && !out.is_empty() {
                out.push(SEPARATOR);
            }
            pending = false;
            out.push(c);
        } else {
            pending = true;
        }
    }
    out
}

/// Splits a trailing `.ext` (word characters only) off the last path segment.
fn split_extension(path: &str) -> (&str, &str) {
    let segment_start = path.rfind('/').map_or(0, |i| i + 1);
    match path[segment_start..].rfind('.') {
        Some(dot) => {
            let dot = segment_start + dot;
            let ext = &path[dot + 1..];
            if !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                (&path[..dot], &path[dot..])
            } else {
                (path, "")
            }
        }
        None => (path, ""),
    }
}

/// Names a URL path: collapses the stem and re-appends the extension.
pub fn name_for_path(path: &str) -> String {
    let (stem, ext) = split_extension(path);
    let mut name = collapse(stem);
    if name.is_empty() {
        name.push_str(FALLBACK_STEM);
    }
    name.push_str(ext);
    name
}

/// Computes the local name of an asset, relative to the page's directory when
/// the asset lives under it.
pub fn compute_local_name(url: &Url, page: &PageTarget) -> String {
    let path = url.path();
    let relative = path
        .strip_prefix(page.base_dir())
        .unwrap_or_else(|| path.trim_start_matches('/'));
    name_for_path(relative)
}

/// File name inside the assets directory: `<page prefix>-<local name>`.
pub fn asset_file_name(url: &Url, page: &PageTarget) -> String {
    format!("{}{}{}", page.prefix(), SEPARATOR, compute_local_name(url, page))
}

/// Inserts a hash of the URL before the extension of `name`.
///
/// `hash_len` is clamped to the digest's hex length.
pub fn disambiguate(name: &str, url: &Url, hash_len: usize) -> String {
    let digest = Sha256::digest(url.as_str().as_bytes());
    let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
    let hash = &hex[..hash_len.min(hex.len())];
    let (stem, ext) = split_extension(name);
    format!("{stem}{SEPARATOR}{hash}{ext}")
}
