//! HTTP surface.
//!
//! - `GET /api/news`: the current page; always 200 with `success: true`
//! - `POST /api/crawl`: scan an arbitrary page with the scan rules
//! - `GET /health`: liveness

use crate::aggregator::Aggregator;
use crate::config::{NewsConfig, ScanRules};
use crate::extract::ScanExtractor;
use crate::models::{NewsResponse, RawCandidate};
use crate::sources::http::build_client;
use crate::sources::{Fetch, HttpFetcher};
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info, instrument};
use url::Url;

const CRAWL_CEILING: usize = 20;

/// Shared, read-only state handed to every request.
#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<Aggregator<HttpFetcher>>,
    pub crawler: Arc<Crawler>,
}

impl AppState {
    pub fn new(config: &NewsConfig) -> Result<Self, crate::error::NewsError> {
        let fetcher = HttpFetcher::new(&config.upstream, config.fetch_timeout())?;
        Ok(Self {
            aggregator: Arc::new(Aggregator::new(config, fetcher)?),
            crawler: Arc::new(Crawler {
                client: build_client(config.fetch_timeout())?,
                rules: config.scan.clone(),
            }),
        })
    }
}

/// Ad-hoc page scanner behind `/api/crawl`.
#[derive(Debug)]
pub struct Crawler {
    client: Client,
    rules: ScanRules,
}

#[derive(Debug, Deserialize)]
pub struct CrawlRequest {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawledArticle {
    pub title: String,
    pub link: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub image_url: Option<String>,
}

impl From<RawCandidate> for CrawledArticle {
    fn from(c: RawCandidate) -> Self {
        Self {
            description: c.description.unwrap_or_default(),
            title: c.title,
            link: c.link,
            image_url: c.image_url,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/news", get(get_news))
        .route("/api/crawl", post(crawl))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until Ctrl-C.
pub async fn serve(bind: &str, state: AppState) -> Result<(), Box<dyn Error>> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!(addr = %listener.local_addr()?, "Listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await?;
    Ok(())
}

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

pub async fn get_news(State(state): State<AppState>) -> Json<NewsResponse> {
    Json(state.aggregator.aggregate().await)
}

#[instrument(level = "info", skip_all)]
pub async fn crawl(
    State(state): State<AppState>,
    payload: Result<Json<CrawlRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return failure(rejection.status(), &rejection.body_text()),
    };
    let Some(raw_url) = request.url.filter(|u| !u.trim().is_empty()) else {
        return failure(StatusCode::BAD_REQUEST, "URL is required");
    };
    let url = match Url::parse(raw_url.trim()) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => url,
        _ => return failure(StatusCode::BAD_REQUEST, "URL must be an absolute http(s) URL"),
    };

    let crawler = &state.crawler;
    let fetcher = match HttpFetcher::with_client(crawler.client.clone(), url.as_str(), &BTreeMap::new()) {
        Ok(fetcher) => fetcher,
        Err(e) => return failure(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()),
    };

    let body = match fetcher.fetch().await {
        Ok(body) => body,
        Err(e) => {
            error!(error = %e, "Crawl fetch failed");
            return failure(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string());
        }
    };

    let extractor = ScanExtractor::new(crawler.rules.clone(), CRAWL_CEILING, Some(url));
    match extractor.extract(&body) {
        Ok(candidates) => {
            let articles: Vec<CrawledArticle> = candidates.into_iter().map(Into::into).collect();
            info!(count = articles.len(), "Crawl complete");
            Json(serde_json::json!({
                "success": true,
                "count": articles.len(),
                "articles": articles,
            }))
            .into_response()
        }
        Err(e) => {
            error!(error = %e, "Crawl extraction failed");
            failure(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
        }
    }
}

fn failure(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(serde_json::json!({
            "success": false,
            "error": message,
            "articles": [],
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum_test::TestServer;

    async fn serve_upstream(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn app(upstream_url: String) -> TestServer {
        let mut config = NewsConfig::default();
        config.upstream.url = upstream_url;
        config.fetch_timeout_secs = 2;
        TestServer::new(router(AppState::new(&config).unwrap())).unwrap()
    }

    const FEED: &str = "<rss><channel>\
        <item><title>AI story one</title><link>https://example.com/1</link></item>\
        <item><title>AI story two</title><link>https://example.com/2</link></item>\
        </channel></rss>";

    const PAGE: &str = r#"<html><body>
        <div class="news_area"><a href="/n/1">AI agents take over routine office paperwork</a></div>
        <div><a href="/login">Log in to follow AI topics and more headlines</a></div>
        </body></html>"#;

    #[tokio::test]
    async fn test_health() {
        let server = app("http://127.0.0.1:1/rss".to_string());
        let response = server.get("/health").await;
        response.assert_status_ok();
        response.assert_text("OK");
    }

    #[tokio::test]
    async fn test_news_with_unreachable_upstream_is_dummy() {
        let server = app("http://127.0.0.1:1/rss".to_string());
        let response = server.get("/api/news").await;

        response.assert_status_ok();
        let json = response.json::<serde_json::Value>();
        assert_eq!(json["success"], true);
        assert_eq!(json["source"], "dummy");
        assert_eq!(json["totalLiveCount"], 0);
        assert_eq!(json["items"].as_array().unwrap().len(), 9);
        assert!(json.get("generatedAt").is_some());
    }

    #[tokio::test]
    async fn test_news_with_live_feed_is_mixed() {
        let base = serve_upstream(Router::new().route("/rss", get(|| async { FEED }))).await;
        let server = app(format!("{base}/rss"));
        let response = server.get("/api/news").await;

        let json = response.json::<serde_json::Value>();
        assert_eq!(json["source"], "live");
        assert_eq!(json["totalLiveCount"], 2);
        let items = json["items"].as_array().unwrap();
        assert_eq!(items.len(), 9);
        assert_eq!(items[0]["title"], "AI story one");
        assert_eq!(items[2]["link"], "#fallback-1");
    }

    #[tokio::test]
    async fn test_crawl_requires_url() {
        let server = app("http://127.0.0.1:1/rss".to_string());
        let response = server
            .post("/api/crawl")
            .json(&serde_json::json!({}))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let json = response.json::<serde_json::Value>();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "URL is required");
    }

    #[tokio::test]
    async fn test_crawl_malformed_body_keeps_json_shape() {
        let server = app("http://127.0.0.1:1/rss".to_string());
        let response = server
            .post("/api/crawl")
            .content_type("application/json")
            .bytes("{ not json".into())
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let json = response.json::<serde_json::Value>();
        assert_eq!(json["success"], false);
        assert!(json["error"].as_str().is_some_and(|e| !e.is_empty()));
        assert!(json["articles"].as_array().unwrap().is_empty());

        let response = server.post("/api/crawl").text("url=https://example.com").await;
        response.assert_status(StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(response.json::<serde_json::Value>()["success"], false);
    }

    #[tokio::test]
    async fn test_crawl_rejects_relative_url() {
        let server = app("http://127.0.0.1:1/rss".to_string());
        let response = server
            .post("/api/crawl")
            .json(&serde_json::json!({ "url": "/just/a/path" }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_crawl_scans_page() {
        let base = serve_upstream(Router::new().route("/page", get(|| async { PAGE }))).await;
        let server = app("http://127.0.0.1:1/rss".to_string());
        let response = server
            .post("/api/crawl")
            .json(&serde_json::json!({ "url": format!("{base}/page") }))
            .await;

        response.assert_status_ok();
        let json = response.json::<serde_json::Value>();
        assert_eq!(json["success"], true);
        assert_eq!(json["count"], 1);
        assert_eq!(json["articles"][0]["link"], format!("{base}/n/1"));
    }

    #[tokio::test]
    async fn test_crawl_upstream_failure_is_500() {
        let server = app("http://127.0.0.1:1/rss".to_string());
        let response = server
            .post("/api/crawl")
            .json(&serde_json::json!({ "url": "http://127.0.0.1:1/page" }))
            .await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let json = response.json::<serde_json::Value>();
        assert_eq!(json["success"], false);
        assert!(json["articles"].as_array().unwrap().is_empty());
    }
}
