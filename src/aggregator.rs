//! Aggregation pipeline.
//!
//! One run moves through `Fetching → Extracting → Deduping → Filling → Done`.
//! A failed fetch or an empty extraction is not an error state: it takes the
//! branch straight to `Filling` with zero live candidates, and the page is
//! served from the fallback catalog.
//!
//! Runs share nothing mutable. Each call builds its own seen-sets, candidate
//! list and result, so concurrent requests need no locking.

use crate::config::NewsConfig;
use crate::dedupe::dedupe;
use crate::error::NewsError;
use crate::extract::Extractor;
use crate::fallback::FallbackCatalog;
use crate::models::{NewsItem, NewsResponse, RawCandidate, SourceTag};
use crate::normalize::Normalizer;
use crate::sources::Fetch;
use crate::utils::truncate_for_log;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use tracing::{debug, info, instrument, warn};

/// Pipeline stages, used as a log field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetching,
    Extracting,
    Deduping,
    Filling,
    Done,
}

/// Drives one upstream through extraction, dedup and the fill policy.
#[derive(Debug)]
pub struct Aggregator<F> {
    fetcher: F,
    extractor: Extractor,
    normalizer: Normalizer,
    catalog: FallbackCatalog,
    page_size: usize,
}

impl<F: Fetch> Aggregator<F> {
    pub fn new(config: &NewsConfig, fetcher: F) -> Result<Self, NewsError> {
        config.validate()?;
        let catalog = FallbackCatalog::from_config(config);
        if catalog.is_empty() {
            warn!("Fallback catalog is empty; failed fetches will serve an empty page");
        } else if catalog.len() < config.page_size {
            warn!(
                catalog = catalog.len(),
                page_size = config.page_size,
                "Fallback catalog is smaller than the page size"
            );
        }

        Ok(Self {
            fetcher,
            extractor: Extractor::from_config(config)?,
            normalizer: Normalizer::from_config(config),
            catalog,
            page_size: config.page_size,
        })
    }

    /// Produce the current page. Never fails.
    pub async fn aggregate(&self) -> NewsResponse {
        let mut rng = StdRng::from_os_rng();
        self.aggregate_with(Utc::now(), &mut rng).await
    }

    /// As [`Aggregator::aggregate`], with an explicit clock reading and
    /// random source.
    pub async fn aggregate_with<R: Rng>(&self, now: DateTime<Utc>, rng: &mut R) -> NewsResponse {
        let candidates = self.collect_live().await;
        self.assemble(candidates, now, rng)
    }

    /// Fetch and extract, folding every failure into an empty result.
    #[instrument(level = "info", skip_all, fields(upstream = %self.fetcher.upstream(), kind = ?self.extractor.kind()))]
    async fn collect_live(&self) -> Vec<RawCandidate> {
        match self.fetch_and_extract().await {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!(
                    upstream = %self.fetcher.upstream(),
                    stage = e.stage(),
                    error = %e,
                    "Live source failed; falling back to catalog"
                );
                Vec::new()
            }
        }
    }

    async fn fetch_and_extract(&self) -> Result<Vec<RawCandidate>, NewsError> {
        debug!(stage = ?Stage::Fetching, "Pipeline stage");
        let body = self.fetcher.fetch().await?;

        debug!(stage = ?Stage::Extracting, "Pipeline stage");
        let candidates = self.extractor.extract(&body)?;
        if candidates.is_empty() {
            warn!(preview = %truncate_for_log(&body, 300), "Upstream body yielded no candidates");
            return Err(NewsError::ExtractionEmpty {
                upstream: self.fetcher.upstream().to_string(),
            });
        }
        Ok(candidates)
    }

    fn assemble<R: Rng + ?Sized>(
        &self,
        candidates: Vec<RawCandidate>,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> NewsResponse {
        debug!(stage = ?Stage::Deduping, count = candidates.len(), "Pipeline stage");
        let complete: Vec<RawCandidate> = candidates
            .into_iter()
            .filter(|c| {
                let ok = c.is_complete();
                if !ok {
                    debug!(title = %c.title, link = %c.link, "Dropping incomplete candidate");
                }
                ok
            })
            .collect();

        let normalized: Vec<NewsItem> = dedupe(complete)
            .into_iter()
            .map(|c| self.normalizer.normalize(c, now, rng))
            .collect();
        let live = drop_truncation_collisions(normalized);
        let total_live_count = live.len();

        debug!(stage = ?Stage::Filling, live = total_live_count, "Pipeline stage");
        let (items, source) = fill(live, &self.catalog, self.page_size, now);

        info!(
            stage = ?Stage::Done,
            %source,
            total_live_count,
            returned = items.len(),
            "Aggregation complete"
        );

        NewsResponse {
            success: true,
            items,
            source,
            total_live_count,
            generated_at: now,
        }
    }
}

/// Distinct raw titles can share their first `title_max_chars` characters.
/// Keep the first item per emitted title and link.
fn drop_truncation_collisions(items: Vec<NewsItem>) -> Vec<NewsItem> {
    let mut seen_links = HashSet::new();
    let mut seen_titles = HashSet::new();
    items
        .into_iter()
        .filter(|item| {
            let fresh = !seen_links.contains(&item.link) && !seen_titles.contains(&item.title);
            if fresh {
                seen_links.insert(item.link.clone());
                seen_titles.insert(item.title.clone());
            } else {
                debug!(title = %item.title, "Dropping item that collides after truncation");
            }
            fresh
        })
        .collect()
}

/// Apply the fill policy: first `page_size` live items, padded from the
/// start of the catalog. Any live item makes the page `live`.
pub fn fill(
    mut live: Vec<NewsItem>,
    catalog: &FallbackCatalog,
    page_size: usize,
    now: DateTime<Utc>,
) -> (Vec<NewsItem>, SourceTag) {
    live.truncate(page_size);
    let source = if live.is_empty() {
        SourceTag::Dummy
    } else {
        SourceTag::Live
    };

    let needed = page_size - live.len();
    if needed > 0 {
        live.extend(catalog.take(needed, now));
    }
    (live, source)
}
