//! Heuristic page scan extractor.
//!
//! Walks every `a[href]` in the document and keeps anchors whose text looks
//! like a headline: within the configured length band, containing a topical
//! keyword, and not pointing at an internal or utility route. The anchor's
//! parent supplies the description and its ancestors are searched for an
//! image.

use crate::config::ScanRules;
use crate::error::NewsError;
use crate::models::RawCandidate;
use crate::utils::collapse_whitespace;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, instrument};
use url::Url;

/// Scans HTML for headline anchors.
#[derive(Debug, Clone)]
pub struct ScanExtractor {
    rules: ScanRules,
    ceiling: usize,
    /// Page URL, used to resolve relative links.
    base: Option<Url>,
}

impl ScanExtractor {
    pub fn new(rules: ScanRules, ceiling: usize, base: Option<Url>) -> Self {
        Self {
            rules,
            ceiling,
            base,
        }
    }

    /// Extract at most `ceiling` candidates in document order.
    #[instrument(level = "debug", skip_all, fields(bytes = html.len()))]
    pub fn extract(&self, html: &str) -> Result<Vec<RawCandidate>, NewsError> {
        let document = Html::parse_document(html);
        let anchor_selector = selector("a[href]")?;
        let image_selector = selector("img")?;

        let mut out = Vec::new();
        let mut scanned = 0usize;
        for anchor in document.select(&anchor_selector) {
            if out.len() >= self.ceiling {
                break;
            }
            scanned += 1;
            if let Some(candidate) = self.candidate(anchor, &image_selector) {
                out.push(candidate);
            }
        }

        info!(count = out.len(), scanned, "Extracted scan candidates");
        Ok(out)
    }

    fn candidate(&self, anchor: ElementRef<'_>, images: &Selector) -> Option<RawCandidate> {
        let href = anchor.value().attr("href")?.trim();
        let title = collapse_whitespace(&anchor.text().collect::<Vec<_>>().join(" "));

        let len = title.chars().count();
        if len < self.rules.min_anchor_chars || len > self.rules.max_anchor_chars {
            return None;
        }
        if !self.rules.keywords.iter().any(|k| title.contains(k.as_str())) {
            return None;
        }
        if let Some(blocked) = self
            .rules
            .blocklist
            .iter()
            .find(|fragment| href.contains(fragment.as_str()))
        {
            debug!(%href, %blocked, "Skipping blocklisted link");
            return None;
        }

        let link = self.resolve(href)?;
        let description = anchor
            .parent()
            .and_then(ElementRef::wrap)
            .map(|parent| collapse_whitespace(&parent.text().collect::<Vec<_>>().join(" ")))
            .filter(|text| text.chars().count() > len);

        Some(RawCandidate {
            title,
            link,
            description,
            published: None,
            image_url: self.find_image(anchor, images),
        })
    }

    fn resolve(&self, href: &str) -> Option<String> {
        if href.is_empty() {
            return None;
        }
        match &self.base {
            Some(base) => base.join(href).ok().map(|u| u.to_string()),
            None => Some(href.to_string()),
        }
    }

    /// Search the anchor, then up to `image_search_depth` ancestors, for an
    /// article image.
    fn find_image(&self, anchor: ElementRef<'_>, images: &Selector) -> Option<String> {
        let scopes = std::iter::once(anchor).chain(
            anchor
                .ancestors()
                .filter_map(ElementRef::wrap)
                .take(self.rules.image_search_depth),
        );

        for scope in scopes {
            for img in scope.select(images) {
                let src = img
                    .value()
                    .attr("src")
                    .filter(|s| !s.trim().is_empty())
                    .or_else(|| img.value().attr("data-src"));
                if let Some(url) = src.and_then(|s| self.accept_image(s.trim())) {
                    return Some(url);
                }
            }
        }
        None
    }

    fn accept_image(&self, src: &str) -> Option<String> {
        if src.is_empty() {
            return None;
        }
        if self
            .rules
            .image_skip_markers
            .iter()
            .any(|marker| src.contains(marker.as_str()))
        {
            return None;
        }
        if src.starts_with("//") {
            return Some(format!("{}{}", self.rules.scheme, src));
        }
        if Url::parse(src).is_ok() {
            return Some(src.to_string());
        }
        self.base
            .as_ref()
            .and_then(|base| base.join(src).ok())
            .map(|u| u.to_string())
    }
}

fn selector(css: &str) -> Result<Selector, NewsError> {
    Selector::parse(css).map_err(|e| NewsError::InvalidSelector(format!("{css}: {e}")))
}
