//! RSS feed extractor.
//!
//! Items are located by their `<item>` delimiters and each field is matched
//! independently inside the block, so a missing or reordered field never
//! affects its siblings or the following items. Upstream feeds in the wild
//! are often not well-formed XML (stray `&`, unescaped HTML in descriptions),
//! which is why this is pattern-based rather than a strict XML reader.

use crate::error::NewsError;
use crate::models::RawCandidate;
use crate::utils::collapse_whitespace;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::{debug, info, instrument};

static ITEM_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<item\b[^>]*>(.*?)</item>").unwrap());
static TITLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<title\b[^>]*>(.*?)</title>").unwrap());
static LINK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<link\b[^>]*>(.*?)</link>").unwrap());
static DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<(pubDate|dc:date|published|updated)\b[^>]*>(.*?)</(?:pubDate|dc:date|published|updated)>")
        .unwrap()
});
static DESCRIPTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<description\b[^>]*>(.*?)</description>").unwrap());
static MEDIA_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<(media:content|media:thumbnail|enclosure)\b([^>]*)>").unwrap()
});
static URL_ATTR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?is)\burl\s*=\s*["']([^"']+)["']"#).unwrap());
static TYPE_ATTR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?is)\b(?:type|medium)\s*=\s*["']([^"']+)["']"#).unwrap());
static CDATA_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<!\[CDATA\[(.*?)\]\]>").unwrap());
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").unwrap());
static ESCAPED_TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)&lt;/?[a-z][a-z0-9]*(?:\s[^&]*)?/?&gt;").unwrap());
static ENTITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&(?:#[0-9]+|#[xX][0-9a-fA-F]+|[A-Za-z][A-Za-z0-9]*);").unwrap());

/// Pulls `<item>` records out of an RSS document.
#[derive(Debug, Clone)]
pub struct FeedExtractor {
    ceiling: usize,
}

impl FeedExtractor {
    pub fn new(ceiling: usize) -> Self {
        Self { ceiling }
    }

    /// Extract at most `ceiling` complete candidates in document order.
    #[instrument(level = "debug", skip_all, fields(bytes = xml.len()))]
    pub fn extract(&self, xml: &str) -> Vec<RawCandidate> {
        let mut out = Vec::new();
        let mut dropped = 0usize;

        for block in ITEM_RE.captures_iter(xml) {
            if out.len() >= self.ceiling {
                break;
            }
            match parse_item(&block[1]) {
                Ok(candidate) => out.push(candidate),
                Err(e) => {
                    dropped += 1;
                    debug!(error = %e, "Dropping feed item");
                }
            }
        }

        info!(count = out.len(), dropped, "Extracted feed candidates");
        out
    }
}

fn parse_item(block: &str) -> Result<RawCandidate, NewsError> {
    let title = first_capture(&TITLE_RE, block, 1)
        .map(clean_text)
        .unwrap_or_default();
    if title.is_empty() {
        return Err(NewsError::MalformedCandidate { field: "title" });
    }

    let link = first_capture(&LINK_RE, block, 1)
        .map(|raw| decode_entities(&unwrap_cdata(raw)).trim().to_string())
        .unwrap_or_default();
    if link.is_empty() {
        return Err(NewsError::MalformedCandidate { field: "link" });
    }

    let published = first_capture(&DATE_RE, block, 2)
        .map(|raw| unwrap_cdata(raw).trim().to_string())
        .filter(|s| !s.is_empty());

    let description = first_capture(&DESCRIPTION_RE, block, 1)
        .map(clean_text)
        .filter(|s| !s.is_empty());

    Ok(RawCandidate {
        title,
        link,
        description,
        published,
        image_url: find_image(block),
    })
}

fn first_capture<'a>(re: &Regex, haystack: &'a str, group: usize) -> Option<&'a str> {
    re.captures(haystack)
        .and_then(|caps| caps.get(group))
        .map(|m| m.as_str())
}

/// First media element in the block that points at an image.
fn find_image(block: &str) -> Option<String> {
    MEDIA_RE.captures_iter(block).find_map(|caps| {
        let attrs = &caps[2];
        let declared = TYPE_ATTR_RE
            .captures(attrs)
            .map(|t| t[1].to_ascii_lowercase());
        let is_image = match declared {
            Some(kind) => kind.starts_with("image"),
            None => !caps[1].eq_ignore_ascii_case("enclosure"),
        };
        if !is_image {
            return None;
        }
        URL_ATTR_RE
            .captures(attrs)
            .map(|u| decode_entities(u[1].trim()))
            .filter(|u| !u.is_empty())
    })
}

fn unwrap_cdata(raw: &str) -> String {
    CDATA_RE.replace_all(raw, "$1").into_owned()
}

/// Decode each entity on its own; unknown ones become a space.
fn decode_entities(raw: &str) -> String {
    ENTITY_RE
        .replace_all(raw, |caps: &Captures| {
            let entity = &caps[0];
            if entity.eq_ignore_ascii_case("&nbsp;") {
                return " ".to_string();
            }
            quick_xml::escape::unescape(entity)
                .map(|decoded| decoded.into_owned())
                .unwrap_or_else(|_| " ".to_string())
        })
        .into_owned()
}

/// CDATA removal, entity decoding and tag stripping for display text.
///
/// Feeds commonly ship escaped HTML whose own text is escaped a second time.
/// That markup is decoded before stripping; any other escaped `<` or `>` is
/// literal text and only decoded after real tags are gone.
fn clean_text(raw: &str) -> String {
    let unwrapped = unwrap_cdata(raw);
    let markup = if ESCAPED_TAG_RE.is_match(&unwrapped) {
        decode_entities(&unwrapped)
    } else {
        unwrapped
    };
    let stripped = TAG_RE.replace_all(&markup, " ");
    collapse_whitespace(&decode_entities(&stripped))
}
