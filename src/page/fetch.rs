// src/page/fetch.rs
// =============================================================================
// This module downloads pages.
//
// Key functionality:
// - Sends a GET request identifying ourselves with a fixed User-Agent
// - Rejects error statuses (>= 400)
// - Rejects anything that isn't HTML (images, PDFs, JSON, ...)
// - Never retries: the first failure is final for that page
//
// The crawl engine only sees the Fetcher trait. HttpFetcher is the real
// implementation on top of reqwest.
// =============================================================================

use futures::future::BoxFuture;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("HTTP {}", .0.as_u16())]
    Status(StatusCode),
    #[error("unexpected content type: {0:?}")]
    ContentType(String),
}

impl FetchError {
    // Short label for logs, e.g. "timeout" or "status"
    //
    // reqwest errors can happen for many reasons (timeouts, DNS, TLS,
    // redirect loops); we only care about the broad category.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Request(e) if e.is_timeout() => "timeout",
            FetchError::Request(e) if e.is_redirect() => "too_many_redirects",
            FetchError::Request(e) if e.is_connect() => "connect",
            FetchError::Request(_) => "request",
            FetchError::Status(_) => "status",
            FetchError::ContentType(_) => "content_type",
        }
    }
}

/// Resolves a URL to the raw text of the page.
///
/// Returns a boxed future so the trait stays object safe and the crawl
/// engine can hold an `Arc<dyn Fetcher>`.
pub trait Fetcher: Send + Sync {
    fn fetch<'a>(&'a self, url: &'a Url) -> BoxFuture<'a, Result<String, FetchError>>;
}

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    // Builds the shared HTTP client
    //
    // We reuse one client for all requests (connection pooling); cloning
    // it is cheap.
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }

    async fn get_html(&self, url: &Url) -> Result<String, FetchError> {
        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(FetchError::Status(status));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        if !is_html(&content_type) {
            return Err(FetchError::ContentType(content_type));
        }

        Ok(response.text().await?)
    }
}

impl Fetcher for HttpFetcher {
    fn fetch<'a>(&'a self, url: &'a Url) -> BoxFuture<'a, Result<String, FetchError>> {
        Box::pin(self.get_html(url))
    }
}

// "text/html" and "text/html; charset=utf-8" both count
fn is_html(content_type: &str) -> bool {
    content_type
        .trim_start()
        .to_ascii_lowercase()
        .starts_with("text/html")
}
