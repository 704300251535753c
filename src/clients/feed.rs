//! Client for the social feed gateway.
//!
//! The gateway holds the platform credentials and exposes recent posts per
//! handle with cursor paging.
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode, Url, header::RETRY_AFTER};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::domain::Post;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("feed gateway rejected credentials (status {status})")]
    Unauthorized { status: u16 },
    #[error("feed gateway rate limit exceeded")]
    RateLimited { retry_after_secs: Option<u64> },
    #[error("feed gateway returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("feed gateway request failed: {0}")]
    Transport(String),
    #[error("failed to decode feed gateway response: {0}")]
    Decode(String),
}

/// Source of recent posts per handle.
#[async_trait]
pub trait FeedClient: Send + Sync {
    /// Returns up to `limit` most recent posts for `handle`, newest first as
    /// delivered. Partial results are never returned on failure.
    async fn fetch_posts(
        &self,
        handle: &str,
        limit: usize,
        language: Option<&str>,
    ) -> Result<Vec<Post>, FeedError>;

    async fn ping(&self) -> Result<(), FeedError>;
}

#[derive(Debug, Deserialize)]
struct GatewayPost {
    text: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct PostsResponse {
    data: Vec<GatewayPost>,
    next_cursor: Option<String>,
}

#[derive(Debug, Clone)]
pub struct HttpFeedConfig {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub total_timeout: Duration,
    pub page_size: usize,
}

#[derive(Debug, Clone)]
pub struct HttpFeedClient {
    client: Client,
    base_url: Url,
    page_size: usize,
}

impl HttpFeedClient {
    /// # Errors
    /// Returns an error when the base URL is invalid or the HTTP client
    /// cannot be built.
    pub fn new(config: HttpFeedConfig) -> anyhow::Result<Self> {
        use anyhow::Context;

        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.total_timeout)
            .build()
            .context("failed to build feed gateway HTTP client")?;

        let mut base_url = Url::parse(&config.base_url).context("invalid feed gateway base URL")?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            client,
            base_url,
            page_size: config.page_size.max(1),
        })
    }

    fn posts_url(&self, handle: &str) -> Result<Url, FeedError> {
        let mut url = self
            .base_url
            .join("v1/users/")
            .map_err(|error| FeedError::Transport(format!("failed to build posts URL: {error}")))?;
        url.path_segments_mut()
            .map_err(|()| FeedError::Transport("feed gateway URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend([handle, "posts"]);
        Ok(url)
    }

    async fn fetch_page(
        &self,
        handle: &str,
        page_limit: usize,
        language: Option<&str>,
        cursor: Option<&str>,
    ) -> Result<PostsResponse, FeedError> {
        let mut url = self.posts_url(handle)?;
        {
            let mut query_pairs = url.query_pairs_mut();
            query_pairs.append_pair("limit", &page_limit.to_string());
            if let Some(language) = language {
                query_pairs.append_pair("lang", language);
            }
            if let Some(cursor) = cursor {
                query_pairs.append_pair("cursor", cursor);
            }
        }

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|error| FeedError::Transport(error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after_secs = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.trim().parse::<u64>().ok());
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, retry_after_secs, body));
        }

        response
            .json::<PostsResponse>()
            .await
            .map_err(|error| FeedError::Decode(error.to_string()))
    }
}

fn classify_status(status: StatusCode, retry_after_secs: Option<u64>, body: String) -> FeedError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => FeedError::Unauthorized {
            status: status.as_u16(),
        },
        StatusCode::TOO_MANY_REQUESTS => FeedError::RateLimited { retry_after_secs },
        _ => FeedError::Status {
            status: status.as_u16(),
            body,
        },
    }
}

#[async_trait]
impl FeedClient for HttpFeedClient {
    async fn fetch_posts(
        &self,
        handle: &str,
        limit: usize,
        language: Option<&str>,
    ) -> Result<Vec<Post>, FeedError> {
        let mut posts = Vec::with_capacity(limit.min(self.page_size.saturating_mul(10)));
        let mut cursor: Option<String> = None;
        let mut page_count = 0;

        while posts.len() < limit {
            page_count += 1;
            let page_limit = (limit - posts.len()).min(self.page_size);
            debug!(handle, page = page_count, cursor = ?cursor, "fetching posts page");

            let page = self
                .fetch_page(handle, page_limit, language, cursor.as_deref())
                .await?;
            let received = page.data.len();
            posts.extend(
                page.data
                    .into_iter()
                    .map(|post| Post::new(post.text, post.created_at)),
            );

            debug!(
                handle,
                page = page_count,
                posts = received,
                total = posts.len(),
                "fetched posts page"
            );

            match page.next_cursor {
                Some(next) if received > 0 => cursor = Some(next),
                _ => break,
            }
        }

        posts.truncate(limit);
        Ok(posts)
    }

    async fn ping(&self) -> Result<(), FeedError> {
        let url = self
            .base_url
            .join("v1/health")
            .map_err(|error| FeedError::Transport(format!("failed to build health URL: {error}")))?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|error| FeedError::Transport(error.to_string()))?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(classify_status(status, None, body))
        }
    }
}
