//! Candidate extraction from raw upstream bodies.
//!
//! One extractor is selected per deployment by `upstream.kind`:
//!
//! | Kind | Module | Input | Strategy |
//! |------|--------|-------|----------|
//! | `feed` | [`feed`] | RSS XML | `<item>` blocks, tolerant per-field matching |
//! | `scan` | [`scan`] | HTML | anchor scan with keyword, length and blocklist filters |
//!
//! Both return candidates in document order, capped at the configured
//! ceiling, and only ever emit candidates with a non-empty title and link.

pub mod feed;
pub mod scan;

use crate::config::{ExtractorKind, NewsConfig};
use crate::error::NewsError;
use crate::models::RawCandidate;

pub use feed::FeedExtractor;
pub use scan::ScanExtractor;

/// The extraction strategy bound to the configured upstream.
#[derive(Debug, Clone)]
pub enum Extractor {
    Feed(FeedExtractor),
    Scan(ScanExtractor),
}

impl Extractor {
    /// Select the extractor for the configured upstream.
    pub fn from_config(config: &NewsConfig) -> Result<Self, NewsError> {
        Ok(match config.upstream.kind {
            ExtractorKind::Feed => Extractor::Feed(FeedExtractor::new(config.candidate_ceiling)),
            ExtractorKind::Scan => {
                let base = url::Url::parse(&config.upstream.url)
                    .map_err(|e| NewsError::Config(format!("upstream.url: {e}")))?;
                Extractor::Scan(ScanExtractor::new(
                    config.scan.clone(),
                    config.candidate_ceiling,
                    Some(base),
                ))
            }
        })
    }

    pub fn kind(&self) -> ExtractorKind {
        match self {
            Extractor::Feed(_) => ExtractorKind::Feed,
            Extractor::Scan(_) => ExtractorKind::Scan,
        }
    }

    /// Parse `raw` into candidates. An empty result is not an error here.
    pub fn extract(&self, raw: &str) -> Result<Vec<RawCandidate>, NewsError> {
        match self {
            Extractor::Feed(feed) => Ok(feed.extract(raw)),
            Extractor::Scan(scan) => scan.extract(raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_selects_kind() {
        let mut config = NewsConfig::default();
        assert_eq!(
            Extractor::from_config(&config).unwrap().kind(),
            ExtractorKind::Feed
        );

        config.upstream.kind = ExtractorKind::Scan;
        config.upstream.url = "https://example.com/search?q=AI".to_string();
        assert_eq!(
            Extractor::from_config(&config).unwrap().kind(),
            ExtractorKind::Scan
        );
    }

    #[test]
    fn test_feed_extractor_on_html_is_empty() {
        let extractor = Extractor::from_config(&NewsConfig::default()).unwrap();
        let out = extractor
            .extract("<html><body><p>maintenance</p></body></html>")
            .unwrap();
        assert!(out.is_empty());
    }
}
