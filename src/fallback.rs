//! Curated fallback catalog.
//!
//! Hand-authored items used to pad a short live page or replace it entirely.
//! The catalog is read-only after startup; only `publishedAt` is stamped at
//! read time.

use crate::config::{CatalogEntry, NewsConfig};
use crate::models::NewsItem;
use crate::normalize::truncate_chars;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct FallbackCatalog {
    entries: Vec<CatalogEntry>,
}

impl FallbackCatalog {
    /// Entries are cut to the same character bounds as live items. Entries
    /// without an image get one from `image_pool`, by position.
    pub fn new(
        entries: Vec<CatalogEntry>,
        image_pool: &[String],
        title_max_chars: usize,
        description_max_chars: usize,
    ) -> Self {
        let entries = entries
            .into_iter()
            .enumerate()
            .map(|(i, entry)| CatalogEntry {
                title: truncate_chars(entry.title.trim(), title_max_chars),
                link: entry.link.trim().to_string(),
                description: truncate_chars(entry.description.trim(), description_max_chars),
                image_url: entry
                    .image_url
                    .or_else(|| image_pool.get(i % image_pool.len().max(1)).cloned()),
            })
            .collect();
        Self { entries }
    }

    pub fn from_config(config: &NewsConfig) -> Self {
        Self::new(
            config.fallback.clone(),
            &config.image_pool,
            config.title_max_chars,
            config.description_max_chars,
        )
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The first `n` entries in catalog order, stamped with `now`.
    pub fn take(&self, n: usize, now: DateTime<Utc>) -> Vec<NewsItem> {
        self.entries
            .iter()
            .take(n)
            .map(|entry| NewsItem {
                title: entry.title.clone(),
                link: entry.link.clone(),
                description: entry.description.clone(),
                published_at: now,
                image_url: entry.image_url.clone(),
            })
            .collect()
    }
}
