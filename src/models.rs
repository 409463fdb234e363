//! Data models for candidates, news items and the aggregated response.
//!
//! This module defines the core data structures used throughout the pipeline:
//! - [`RawCandidate`]: an unvalidated record pulled out of an upstream document
//! - [`NewsItem`]: the normalized, presentable item handed to the display layer
//! - [`SourceTag`]: provenance of a response (`"live"` or `"dummy"`)
//! - [`NewsResponse`]: the body returned by the read endpoint
//!
//! Serialized field names are camelCase to match what the display layer polls.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A record extracted from an upstream document, before dedup and normalization.
///
/// Text fields hold the stripped but untruncated upstream values. Dedup keys on
/// these raw values, so truncation must not happen before [`crate::dedupe`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawCandidate {
    /// Headline text.
    pub title: String,
    /// Absolute article URL.
    pub link: String,
    /// Longer text, when the upstream supplied one.
    pub description: Option<String>,
    /// Publish time exactly as the upstream wrote it.
    pub published: Option<String>,
    /// Image discovered next to the item, if any.
    pub image_url: Option<String>,
}

impl RawCandidate {
    /// Build a candidate with only the required fields set.
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            ..Default::default()
        }
    }

    /// Whether both required fields survived stripping.
    pub fn is_complete(&self) -> bool {
        !self.title.trim().is_empty() && !self.link.trim().is_empty()
    }
}

/// A normalized news item.
///
/// Constructed once per aggregation call, either from a [`RawCandidate`] or
/// copied from the fallback catalog, and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    /// Headline, at most `title_max_chars` characters.
    pub title: String,
    /// Article URL, or a placeholder for catalog items.
    pub link: String,
    /// Summary, at most `description_max_chars` characters.
    pub description: String,
    /// Publish time; the aggregation time when the upstream gave none.
    pub published_at: DateTime<Utc>,
    /// Representative image.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub image_url: Option<String>,
}

/// Where the items of a response came from.
///
/// Any response with at least one live item is tagged `live`, even when it
/// was padded from the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceTag {
    Live,
    Dummy,
}

impl std::fmt::Display for SourceTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceTag::Live => f.write_str("live"),
            SourceTag::Dummy => f.write_str("dummy"),
        }
    }
}

/// Body of the read endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsResponse {
    /// Always `true`; failures degrade to catalog content instead.
    pub success: bool,
    /// Exactly `page_size` items whenever the catalog is large enough.
    pub items: Vec<NewsItem>,
    /// Provenance of the page.
    pub source: SourceTag,
    /// Live items that survived dedup, before capping to the page size.
    pub total_live_count: usize,
    /// When this response was assembled.
    pub generated_at: DateTime<Utc>,
}
