//! Classification of failed release feed requests.

use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use thiserror::Error;

/// Reasons the release feed could not be read.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FeedError {
    /// HTTP 429, or HTTP 403 with an exhausted rate limit
    #[error("GitHub API rate limit exceeded, try again later")]
    RateLimited,
    #[error("{0} was not found")]
    NotFound(String),
    #[error("access to {0} is forbidden")]
    Forbidden(String),
    #[error("request rejected with HTTP {0}")]
    Client(u16),
    #[error("GitHub responded with HTTP {0}")]
    Server(u16),
}

/// Maps a non-success status to a [`FeedError`]. Returns `None` for success codes.
pub fn classify_status(status: StatusCode, headers: &HeaderMap, url: &str) -> Option<FeedError> {
    if status.is_success() {
        return None;
    }

    let error = match status {
        StatusCode::TOO_MANY_REQUESTS => FeedError::RateLimited,
        StatusCode::FORBIDDEN if rate_limit_exhausted(headers) => FeedError::RateLimited,
        StatusCode::FORBIDDEN => FeedError::Forbidden(url.to_string()),
        StatusCode::NOT_FOUND => FeedError::NotFound(url.to_string()),
        s if s.is_client_error() => FeedError::Client(s.as_u16()),
        s => FeedError::Server(s.as_u16()),
    };
    Some(error)
}

fn rate_limit_exhausted(headers: &HeaderMap) -> bool {
    headers
        .get("x-ratelimit-remaining")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.trim() == "0")
}
