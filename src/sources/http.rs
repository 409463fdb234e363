//! HTTP upstream fetcher.
//!
//! Every request is bounded by the client timeout; exceeding it is reported
//! like any other transport failure.

use super::Fetch;
use crate::config::UpstreamConfig;
use crate::error::NewsError;
use reqwest::Client;
use reqwest::header::{CACHE_CONTROL, HeaderMap, HeaderName, HeaderValue};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

/// Fetches a single URL with fixed headers.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    url: String,
    headers: HeaderMap,
}

impl HttpFetcher {
    /// Build a fetcher for the configured upstream with its own client.
    pub fn new(upstream: &UpstreamConfig, timeout: Duration) -> Result<Self, NewsError> {
        Self::with_client(build_client(timeout)?, &upstream.url, &upstream.headers)
    }

    /// Build a fetcher that shares an existing client.
    pub fn with_client(
        client: Client,
        url: &str,
        headers: &BTreeMap<String, String>,
    ) -> Result<Self, NewsError> {
        let mut map = HeaderMap::new();
        map.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        for (name, value) in headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| NewsError::Config(format!("header name `{name}`: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| NewsError::Config(format!("header value for `{name}`: {e}")))?;
            map.insert(name, value);
        }

        Ok(Self {
            client,
            url: url.to_string(),
            headers: map,
        })
    }
}

/// Build a client whose every request is bounded by `timeout`.
pub fn build_client(timeout: Duration) -> Result<Client, NewsError> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("newsdesk/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| NewsError::Config(format!("http client: {e}")))
}

impl Fetch for HttpFetcher {
    fn upstream(&self) -> &str {
        &self.url
    }

    #[instrument(level = "info", skip_all, fields(upstream = %self.url))]
    async fn fetch(&self) -> Result<String, NewsError> {
        let t0 = Instant::now();
        let response = self
            .client
            .get(&self.url)
            .headers(self.headers.clone())
            .send()
            .await
            .map_err(|e| {
                let reason = if e.is_timeout() {
                    format!("timed out: {e}")
                } else {
                    e.to_string()
                };
                warn!(elapsed_ms = t0.elapsed().as_millis() as u64, %reason, "Request failed");
                NewsError::unavailable(&self.url, reason)
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "Upstream returned non-success status");
            return Err(NewsError::unavailable(&self.url, format!("status {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| NewsError::unavailable(&self.url, e))?;

        info!(
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched upstream body"
        );
        debug!(preview = %crate::utils::truncate_for_log(&body, 200), "Body preview");
        Ok(body)
    }
}
