//! Error taxonomy for the aggregation pipeline.
//!
//! None of these reach a consumer of the read endpoint. The aggregator logs
//! them and folds them into the zero-live-candidates branch; only
//! [`NewsError::Config`] can stop the process, and only at startup.

use thiserror::Error;

/// Errors raised while fetching, extracting or configuring.
#[derive(Debug, Error)]
pub enum NewsError {
    /// Upstream fetch failed, timed out, or returned a non-success status.
    #[error("source unavailable ({upstream}): {reason}")]
    SourceUnavailable { upstream: String, reason: String },

    /// Fetch succeeded but nothing usable was parsed out of the body.
    #[error("no candidates extracted from {upstream}")]
    ExtractionEmpty { upstream: String },

    /// A single candidate lacked a required field after stripping.
    #[error("candidate missing required field `{field}`")]
    MalformedCandidate { field: &'static str },

    /// A CSS selector used by the scan extractor failed to parse.
    #[error("invalid selector `{0}`")]
    InvalidSelector(String),

    /// Startup configuration is unreadable or violates a bound.
    #[error("configuration error: {0}")]
    Config(String),
}

impl NewsError {
    /// Wrap a transport-level failure for the given upstream.
    pub fn unavailable(upstream: &str, reason: impl ToString) -> Self {
        Self::SourceUnavailable {
            upstream: upstream.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Short stage tag used in log fields.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::SourceUnavailable { .. } => "fetch",
            Self::ExtractionEmpty { .. } | Self::MalformedCandidate { .. } => "extract",
            Self::InvalidSelector(_) => "extract",
            Self::Config(_) => "config",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_message_names_upstream() {
        let err = NewsError::unavailable("https://example.com/rss", "status 503");
        assert_eq!(
            err.to_string(),
            "source unavailable (https://example.com/rss): status 503"
        );
        assert_eq!(err.stage(), "fetch");
    }

    #[test]
    fn test_extraction_stage() {
        let err = NewsError::ExtractionEmpty {
            upstream: "feed".to_string(),
        };
        assert_eq!(err.stage(), "extract");
        assert!(err.to_string().contains("feed"));
    }
}
