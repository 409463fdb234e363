//! Upstream fetching.
//!
//! A fetcher performs exactly one request against one configured upstream
//! and hands back the raw body. It never parses, caches or retries; a failed
//! fetch is reported as [`NewsError::SourceUnavailable`] and the aggregator
//! falls back on its own.
//!
//! | Fetcher | Module | Notes |
//! |---------|--------|-------|
//! | HTTP GET | [`http`] | `reqwest` client with a hard timeout |

pub mod http;

use crate::error::NewsError;

pub use http::HttpFetcher;

/// One upstream that can be read as text.
#[allow(async_fn_in_trait)]
pub trait Fetch {
    /// Identity of the upstream, used in log fields and errors.
    fn upstream(&self) -> &str;

    /// Retrieve the raw body.
    async fn fetch(&self) -> Result<String, NewsError>;
}
