//! Candidate normalization.
//!
//! Turns a [`RawCandidate`] into a [`NewsItem`]: text is cut to fixed
//! character bounds (not word-aware), the publish time is parsed or replaced
//! by `now`, and an image is taken from the candidate or drawn uniformly
//! from the stock pool.

use crate::config::NewsConfig;
use crate::models::{NewsItem, RawCandidate};
use chrono::{DateTime, NaiveDateTime, Utc};
use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::debug;

/// Keep at most `max` characters of `s`.
///
/// Strings already within the bound are returned unchanged, so the operation
/// is idempotent.
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((cut, _)) => s[..cut].to_string(),
    }
}

/// Parse an upstream publish time, substituting `now` when it is absent or
/// unreadable.
pub fn parse_published(raw: Option<&str>, now: DateTime<Utc>) -> DateTime<Utc> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return now;
    };

    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return dt.with_timezone(&Utc);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.with_timezone(&Utc);
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return naive.and_utc();
    }

    debug!(%raw, "Unparseable publish date; using now");
    now
}

/// Applies the truncation bounds and image pool from the configuration.
#[derive(Debug, Clone)]
pub struct Normalizer {
    title_max_chars: usize,
    description_max_chars: usize,
    image_pool: Vec<String>,
}

impl Normalizer {
    pub fn new(title_max_chars: usize, description_max_chars: usize, image_pool: Vec<String>) -> Self {
        Self {
            title_max_chars,
            description_max_chars,
            image_pool,
        }
    }

    pub fn from_config(config: &NewsConfig) -> Self {
        Self::new(
            config.title_max_chars,
            config.description_max_chars,
            config.image_pool.clone(),
        )
    }

    /// Uniform pick from the stock pool. Repeats within a page are allowed.
    pub fn pick_image<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<String> {
        self.image_pool.choose(rng).cloned()
    }

    pub fn normalize<R: Rng + ?Sized>(
        &self,
        candidate: RawCandidate,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> NewsItem {
        let description = candidate
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .unwrap_or(candidate.title.as_str());

        NewsItem {
            title: truncate_chars(candidate.title.trim(), self.title_max_chars),
            link: candidate.link.trim().to_string(),
            description: truncate_chars(description, self.description_max_chars),
            published_at: parse_published(candidate.published.as_deref(), now),
            image_url: candidate
                .image_url
                .clone()
                .or_else(|| self.pick_image(rng)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 6, 12, 0, 0).unwrap()
    }

    fn normalizer() -> Normalizer {
        Normalizer::new(
            100,
            150,
            vec!["https://img/a.jpg".to_string(), "https://img/b.jpg".to_string()],
        )
    }

    #[test]
    fn test_truncate_is_idempotent() {
        assert_eq!(truncate_chars("short", 100), "short");
        let once = truncate_chars(&"x".repeat(180), 100);
        assert_eq!(once.chars().count(), 100);
        assert_eq!(truncate_chars(&once, 100), once);
    }

    #[test]
    fn test_truncate_counts_characters() {
        let korean = "인공지능".repeat(30);
        let cut = truncate_chars(&korean, 100);
        assert_eq!(cut.chars().count(), 100);
    }

    #[test]
    fn test_parse_published_formats() {
        let expected = Utc.with_ymd_and_hms(2025, 5, 6, 14, 30, 0).unwrap();
        assert_eq!(
            parse_published(Some("Tue, 06 May 2025 14:30:00 GMT"), now()),
            expected
        );
        assert_eq!(
            parse_published(Some("2025-05-06T23:30:00+09:00"), now()),
            expected
        );
        assert_eq!(parse_published(Some("2025-05-06 14:30:00"), now()), expected);
    }

    #[test]
    fn test_parse_published_falls_back_to_now() {
        assert_eq!(parse_published(None, now()), now());
        assert_eq!(parse_published(Some("  "), now()), now());
        assert_eq!(parse_published(Some("yesterday-ish"), now()), now());
    }

    #[test]
    fn test_long_title_short_description() {
        let mut candidate = RawCandidate::new("t".repeat(180), "https://example.com/1");
        candidate.description = Some("brief".to_string());
        let item = normalizer().normalize(candidate, now(), &mut StdRng::seed_from_u64(1));

        assert_eq!(item.title.chars().count(), 100);
        assert_eq!(item.description, "brief");
        assert_eq!(item.published_at, now());
    }

    #[test]
    fn test_description_defaults_to_title() {
        let candidate = RawCandidate::new("AI headline", "https://example.com/1");
        let item = normalizer().normalize(candidate, now(), &mut StdRng::seed_from_u64(1));
        assert_eq!(item.description, "AI headline");
    }

    #[test]
    fn test_extracted_image_wins() {
        let mut candidate = RawCandidate::new("AI headline", "https://example.com/1");
        candidate.image_url = Some("https://example.com/own.jpg".to_string());
        let item = normalizer().normalize(candidate, now(), &mut StdRng::seed_from_u64(1));
        assert_eq!(item.image_url.as_deref(), Some("https://example.com/own.jpg"));
    }

    #[test]
    fn test_pool_pick_is_deterministic_under_seed() {
        let n = normalizer();
        let a: Vec<_> = {
            let mut rng = StdRng::seed_from_u64(42);
            (0..10).map(|_| n.pick_image(&mut rng).unwrap()).collect()
        };
        let b: Vec<_> = {
            let mut rng = StdRng::seed_from_u64(42);
            (0..10).map(|_| n.pick_image(&mut rng).unwrap()).collect()
        };
        assert_eq!(a, b);
        assert!(a.iter().all(|img| n.image_pool.contains(img)));
    }
}
