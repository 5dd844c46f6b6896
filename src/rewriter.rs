use std::collections::HashMap;

use lol_html::errors::RewritingError;
use tracing::debug;

use crate::html_parser::visit_candidates;
use crate::plan::DownloadPlan;

/// Points planned asset references at their local copies.
#[derive(Clone, Default)]
pub struct HtmlRewriter;

impl HtmlRewriter {
    pub fn new() -> Self {
        Self
    }

    /// Replaces the source attribute of each element named by the plan.
    /// Every other byte of `html` is emitted as it was received.
    pub fn rewrite(&self, html: &[u8], plan: &DownloadPlan) -> Result<Vec<u8>, RewritingError> {
        let replacements: HashMap<usize, String> = plan
            .assets()
            .iter()
            .map(|asset| (asset.reference.position, plan.relative_path(asset)))
            .collect();

        let mut rewritten = 0;
        let output = visit_candidates(html, |position, el, kind, _| {
            if let Some(local) = replacements.get(&position) {
                el.set_attribute(kind.attribute(), local)?;
                rewritten += 1;
            }
            Ok(())
        })?;
        debug!(rewritten, planned = replacements.len(), "rewrote asset references");
        Ok(output)
    }
}
