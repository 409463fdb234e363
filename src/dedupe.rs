//! Exact-match deduplication of raw candidates.
//!
//! A candidate is dropped when its link or its title was already accepted.
//! Both keys compare the raw, untruncated strings case-sensitively; near
//! duplicates (whitespace, punctuation) are kept.

use crate::models::RawCandidate;
use std::collections::HashSet;
use tracing::debug;

/// Keep the first candidate per link and per title, preserving input order.
pub fn dedupe(candidates: Vec<RawCandidate>) -> Vec<RawCandidate> {
    let mut seen_links = HashSet::new();
    let mut seen_titles = HashSet::new();
    let before = candidates.len();

    let kept: Vec<RawCandidate> = candidates
        .into_iter()
        .filter(|c| {
            if seen_links.contains(&c.link) || seen_titles.contains(&c.title) {
                return false;
            }
            seen_links.insert(c.link.clone());
            seen_titles.insert(c.title.clone());
            true
        })
        .collect();

    debug!(before, after = kept.len(), "Deduplicated candidates");
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(title: &str, link: &str) -> RawCandidate {
        RawCandidate::new(title, link)
    }

    #[test]
    fn test_drops_duplicate_links_and_titles() {
        let out = dedupe(vec![
            c("A", "https://x/1"),
            c("B", "https://x/1"),
            c("A", "https://x/2"),
            c("C", "https://x/3"),
        ]);
        let titles: Vec<_> = out.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "C"]);
    }

    #[test]
    fn test_rejected_candidate_does_not_claim_its_keys() {
        // "B" is rejected for its link, so its title stays available.
        let out = dedupe(vec![
            c("A", "https://x/1"),
            c("B", "https://x/1"),
            c("B", "https://x/2"),
        ]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[1].link, "https://x/2");
    }

    #[test]
    fn test_exact_match_only() {
        let out = dedupe(vec![
            c("AI news", "https://x/1"),
            c("ai news", "https://x/2"),
            c("AI news ", "https://x/3"),
        ]);
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn test_output_has_unique_keys() {
        let input: Vec<_> = (0..50)
            .map(|i| c(&format!("t{}", i % 7), &format!("l{}", i % 11)))
            .collect();
        let out = dedupe(input);

        let links: HashSet<_> = out.iter().map(|c| &c.link).collect();
        let titles: HashSet<_> = out.iter().map(|c| &c.title).collect();
        assert_eq!(links.len(), out.len());
        assert_eq!(titles.len(), out.len());
    }

    #[test]
    fn test_empty_input() {
        assert!(dedupe(Vec::new()).is_empty());
    }
}
