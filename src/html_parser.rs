use std::borrow::Cow;

use lol_html::errors::{AttributeNameError, RewritingError};
use lol_html::html_content::Element;
use lol_html::{element, HtmlRewriter as StreamingRewriter, Settings};
use tracing::warn;

/// The element kinds whose source attribute names a downloadable asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Stylesheet,
    Script,
    Image,
}

impl AssetKind {
    pub fn attribute(&self) -> &'static str {
        match self {
            AssetKind::Stylesheet => "href",
            AssetKind::Script | AssetKind::Image => "src",
        }
    }
}

/// A reference exactly as it appears in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetReference {
    pub raw: String,
    pub kind: AssetKind,
    /// Ordinal of the referencing element among all candidate elements, in
    /// document order.
    pub position: usize,
}

impl AssetReference {
    /// The reference with character references (`&amp;`, `&#47;`, ...)
    /// decoded, ready to be parsed as a URL.
    pub fn decoded(&self) -> Cow<'_, str> {
        decode_char_refs(&self.raw)
    }
}

fn decode_char_ref(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let digits = name.strip_prefix('#')?;
            let code = match digits.strip_prefix(|c| c == 'x' || c == 'X') {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => digits.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

fn decode_char_refs(value: &str) -> Cow<'_, str> {
    if !value.contains('&') {
        return Cow::Borrowed(value);
    }
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let decoded = rest
            .find(';')
            .filter(|&semi| semi <= 10)
            .and_then(|semi| decode_char_ref(&rest[1..semi]).map(|c| (c, semi)));
        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &rest[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

fn has_token(value: &str, token: &str) -> bool {
    value
        .split_ascii_whitespace()
        .any(|t| t.eq_ignore_ascii_case(token))
}

/// Returns the kind and source value if `el` is a candidate asset element
/// with a non-empty source.
fn candidate(el: &Element<'_, '_>) -> Option<(AssetKind, String)> {
    let kind = match el.tag_name().as_str() {
        "link"
            if el
                .get_attribute("rel")
                .is_some_and(|rel| has_token(&rel, "stylesheet")) =>
        {
            AssetKind::Stylesheet
        }
        "script" => AssetKind::Script,
        "img" => AssetKind::Image,
        _ => return None,
    };
    let value = el.get_attribute(kind.attribute())?;
    if value.trim().is_empty() {
        return None;
    }
    Some((kind, value))
}

/// Streams `html` through the tokenizer, calling `visit` for every candidate
/// element in document order with its position. Bytes outside elements the
/// visitor modifies are passed through unchanged.
pub(crate) fn visit_candidates<F>(html: &[u8], mut visit: F) -> Result<Vec<u8>, RewritingError>
where
    F: FnMut(usize, &mut Element<'_, '_>, AssetKind, String) -> Result<(), AttributeNameError>,
{
    let mut output = Vec::with_capacity(html.len());
    let mut position = 0;
    let mut rewriter = StreamingRewriter::new(
        Settings {
            element_content_handlers: vec![element!("*", |el| {
                if let Some((kind, value)) = candidate(el) {
                    visit(position, el, kind, value)?;
                    position += 1;
                }
                Ok(())
            })],
            ..Settings::new()
        },
        |chunk: &[u8]| output.extend_from_slice(chunk),
    );
    rewriter.write(html)?;
    rewriter.end()?;
    Ok(output)
}

/// Extracts asset references from page HTML.
#[derive(Clone, Default)]
pub struct HtmlParser;

impl HtmlParser {
    pub fn new() -> Self {
        Self
    }

    /// Returns every candidate reference in document order, duplicates
    /// included.
    pub fn discover(&self, html: &[u8]) -> Vec<AssetReference> {
        let mut references = Vec::new();
        let scanned = visit_candidates(html, |position, _, kind, raw| {
            references.push(AssetReference {
                raw,
                kind,
                position,
            });
            Ok(())
        });
        if let Err(e) = scanned {
            warn!(error = %e, found = references.len(), "stopped scanning html early");
        }
        references
    }
}
