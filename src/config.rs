//! Static pipeline configuration.
//!
//! Loaded once at process start from an optional YAML file and shared
//! read-only by every aggregation run. Every field has a default, so a
//! missing file or a partial file is valid:
//!
//! ```yaml
//! page_size: 9
//! upstream:
//!   kind: scan
//!   url: https://search.naver.com/search.naver?where=news&query=AI
//! scan:
//!   keywords: ["AI", "GPT"]
//! ```

use crate::error::NewsError;
use crate::normalize::truncate_chars;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::time::Duration;
use tracing::{info, instrument};

const GOOGLE_NEWS_SEARCH: &str = "https://news.google.com/rss/search";
const DEFAULT_QUERY: &str = "AI OR 인공지능 OR ChatGPT when:7d";

/// Which extractor reads the configured upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractorKind {
    /// RSS/Atom-like XML with `<item>` blocks.
    Feed,
    /// Arbitrary HTML scanned for topical anchors.
    Scan,
}

/// The single upstream an aggregation run reads from.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamConfig {
    pub kind: ExtractorKind,
    pub url: String,
    /// Extra request headers, sent verbatim.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            kind: ExtractorKind::Feed,
            url: google_news_url(DEFAULT_QUERY),
            headers: BTreeMap::new(),
        }
    }
}

/// Heuristics for the anchor-scanning extractor.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScanRules {
    /// Anchor text must contain at least one of these (case-sensitive).
    pub keywords: Vec<String>,
    /// Links containing any of these fragments are skipped.
    pub blocklist: Vec<String>,
    pub min_anchor_chars: usize,
    pub max_anchor_chars: usize,
    /// How many ancestors to climb looking for an image.
    pub image_search_depth: usize,
    /// Image URLs containing any of these are not article images.
    pub image_skip_markers: Vec<String>,
    /// Prefix for protocol-relative image URLs.
    pub scheme: String,
}

impl Default for ScanRules {
    fn default() -> Self {
        Self {
            keywords: to_strings(&[
                "AI", "인공지능", "ChatGPT", "GPT", "LLM", "생성형", "OpenAI", "Claude", "Gemini",
            ]),
            blocklist: to_strings(&[
                "help", "login", "policy", "promotion", "/ad/", "javascript:", "mailto:",
                "/static/",
            ]),
            min_anchor_chars: 20,
            max_anchor_chars: 200,
            image_search_depth: 10,
            image_skip_markers: to_strings(&["profile", "logo", "data:"]),
            scheme: "https:".to_string(),
        }
    }
}

/// One hand-authored fallback item.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct CatalogEntry {
    pub title: String,
    pub link: String,
    pub description: String,
    pub image_url: Option<String>,
}

/// Everything an [`crate::aggregator::Aggregator`] needs, injected at construction.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NewsConfig {
    /// Target result size `N`.
    pub page_size: usize,
    /// Maximum raw candidates an extractor returns.
    pub candidate_ceiling: usize,
    pub title_max_chars: usize,
    pub description_max_chars: usize,
    pub fetch_timeout_secs: u64,
    pub upstream: UpstreamConfig,
    pub scan: ScanRules,
    /// Stock images for items without their own.
    pub image_pool: Vec<String>,
    pub fallback: Vec<CatalogEntry>,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            page_size: 9,
            candidate_ceiling: 15,
            title_max_chars: 100,
            description_max_chars: 150,
            fetch_timeout_secs: 10,
            upstream: UpstreamConfig::default(),
            scan: ScanRules::default(),
            image_pool: default_image_pool(),
            fallback: default_catalog(),
        }
    }
}

impl NewsConfig {
    /// Load from a YAML file, or use the defaults when no path is given.
    #[instrument(level = "info")]
    pub async fn load(path: Option<&str>) -> Result<Self, NewsError> {
        let config = match path {
            Some(path) => {
                let raw = tokio::fs::read_to_string(path)
                    .await
                    .map_err(|e| NewsError::Config(format!("{path}: {e}")))?;
                let parsed = Self::from_yaml(&raw)?;
                info!(path, "Loaded configuration file");
                parsed
            }
            None => {
                info!("No configuration file given; using defaults");
                Self::default()
            }
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse YAML, filling unspecified fields with defaults.
    pub fn from_yaml(raw: &str) -> Result<Self, NewsError> {
        serde_yaml::from_str(raw).map_err(|e| NewsError::Config(e.to_string()))
    }

    /// Reject configurations the pipeline cannot honor.
    pub fn validate(&self) -> Result<(), NewsError> {
        if self.page_size == 0 {
            return Err(NewsError::Config("page_size must be at least 1".into()));
        }
        if self.candidate_ceiling == 0 {
            return Err(NewsError::Config("candidate_ceiling must be at least 1".into()));
        }
        if self.title_max_chars == 0 || self.description_max_chars == 0 {
            return Err(NewsError::Config("truncation bounds must be positive".into()));
        }
        if self.image_pool.is_empty() {
            return Err(NewsError::Config("image_pool must not be empty".into()));
        }
        if self.scan.min_anchor_chars > self.scan.max_anchor_chars {
            return Err(NewsError::Config(
                "scan.min_anchor_chars exceeds scan.max_anchor_chars".into(),
            ));
        }
        if url::Url::parse(&self.upstream.url).is_err() {
            return Err(NewsError::Config(format!(
                "upstream.url is not a valid URL: {}",
                self.upstream.url
            )));
        }
        self.validate_catalog()
    }

    /// Catalog entries are served verbatim, so they must already satisfy the
    /// page invariants: non-empty title and link, no repeats after truncation.
    fn validate_catalog(&self) -> Result<(), NewsError> {
        let mut seen_links = HashSet::new();
        let mut seen_titles = HashSet::new();
        for (i, entry) in self.fallback.iter().enumerate() {
            let title = truncate_chars(entry.title.trim(), self.title_max_chars);
            let link = entry.link.trim();
            if title.is_empty() || link.is_empty() {
                return Err(NewsError::Config(format!(
                    "fallback[{i}] needs a non-empty title and link"
                )));
            }
            if !seen_links.insert(link) {
                return Err(NewsError::Config(format!(
                    "fallback[{i}] repeats link {link}"
                )));
            }
            if !seen_titles.insert(title) {
                return Err(NewsError::Config(format!(
                    "fallback[{i}] repeats title {:?}",
                    entry.title
                )));
            }
        }
        Ok(())
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

/// Build a Google News RSS search URL for `query`.
pub fn google_news_url(query: &str) -> String {
    format!(
        "{GOOGLE_NEWS_SEARCH}?q={}&hl=ko&gl=KR&ceid=KR:ko",
        urlencoding::encode(query)
    )
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

fn unsplash(photo: &str) -> String {
    format!("https://images.unsplash.com/{photo}?w=400&h=300&fit=crop")
}

fn default_image_pool() -> Vec<String> {
    [
        "photo-1677442136019-21780ecad995",
        "photo-1620712943543-bcc4688e7485",
        "photo-1555421689-491a97ff2040",
        "photo-1587620962725-abab7fe55159",
        "photo-1516321318423-f06f85e504b3",
        "photo-1531746790731-6c087fecd65a",
        "photo-1504384308090-c894fdcc538d",
        "photo-1522071820081-009f0129c71c",
        "photo-1485827404703-89b55fcc595e",
        "photo-1451187580459-43490279c0fa",
        "photo-1535378917042-10a22c95931a",
        "photo-1550751827-4bd374c3f58b",
        "photo-1518770660439-4636190af475",
        "photo-1526374965328-7f61d4dc18c5",
        "photo-1488590528505-98d2b5aba04b",
    ]
    .iter()
    .map(|photo| unsplash(photo))
    .collect()
}

fn default_catalog() -> Vec<CatalogEntry> {
    let entries = [
        (
            "AI 바이브코딩으로 누구나 개발자 되는 시대",
            "코딩 경험 없이도 AI를 활용해 웹사이트와 앱을 만드는 바이브코딩이 주목받고 있다.",
            "photo-1677442136019-21780ecad995",
        ),
        (
            "챗GPT 활용한 자동화 도구 개발 붐",
            "1인 사업자들이 AI를 활용해 업무 자동화 도구를 직접 만드는 사례가 증가하고 있다.",
            "photo-1620712943543-bcc4688e7485",
        ),
        (
            "비전공자도 AI로 랜딩페이지 제작 가능",
            "AI 도구를 활용하면 디자인과 코딩 지식 없이도 전문적인 웹사이트를 만들 수 있다.",
            "photo-1555421689-491a97ff2040",
        ),
        (
            "AI 코딩 도구, 개발 생산성 300% 향상",
            "Claude, ChatGPT 등 AI 코딩 어시스턴트가 개발자 생산성을 크게 높이고 있다.",
            "photo-1587620962725-abab7fe55159",
        ),
        (
            "교육 시장, AI 활용 프로그래밍 교육 확대",
            "AI를 활용한 코딩 교육이 전통적인 프로그래밍 교육을 빠르게 대체하고 있다.",
            "photo-1516321318423-f06f85e504b3",
        ),
        (
            "1인 창업가를 위한 AI 웹 개발 솔루션",
            "소규모 사업자들이 AI 도구로 직접 웹사이트를 만들어 비용을 절감하고 있다.",
            "photo-1531746790731-6c087fecd65a",
        ),
        (
            "AI 시대, 코딩 교육의 패러다임 전환",
            "문법 암기보다 AI 활용 능력이 중요한 시대로 코딩 교육 방식이 변화하고 있다.",
            "photo-1504384308090-c894fdcc538d",
        ),
        (
            "직장인들, AI로 업무 자동화 프로그램 제작",
            "반복적인 업무를 AI로 자동화하는 직장인들이 늘어나며 생산성이 향상되고 있다.",
            "photo-1522071820081-009f0129c71c",
        ),
        (
            "AI 개발 도구, 코딩 진입 장벽 낮춰",
            "AI 기술 발전으로 비개발자도 쉽게 프로그래밍을 시작할 수 있게 되었다.",
            "photo-1485827404703-89b55fcc595e",
        ),
    ];

    entries
        .iter()
        .enumerate()
        .map(|(i, (title, description, photo))| CatalogEntry {
            title: title.to_string(),
            link: format!("#fallback-{}", i + 1),
            description: description.to_string(),
            image_url: Some(unsplash(photo)),
        })
        .collect()
}
