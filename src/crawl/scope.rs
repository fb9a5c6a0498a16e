// src/crawl/scope.rs
// =============================================================================
// Same-host restriction: the crawler never leaves the host it started on.
//
// The host is the URL's authority exactly as written ("host" or "host:port"),
// compared with plain string equality:
// - no subdomain matching: blog.example.com and example.com differ
// - case matters: SITE.test and site.test differ
// - default ports are not dropped: site.test:80 and site.test differ
// =============================================================================

use url::Url;

use super::normalize::raw_authority;

/// The origin host of a crawl, captured once from the start URL.
#[derive(Debug, Clone)]
pub struct HostScope {
    origin_host: String,
}

impl HostScope {
    /// Returns `None` when the start URL has no host to restrict to.
    pub fn from_start_url(start: &str) -> Option<Self> {
        raw_authority(start).map(|host| Self {
            origin_host: host.to_string(),
        })
    }

    pub fn origin_host(&self) -> &str {
        &self.origin_host
    }

    // True if the URL lives on the origin host
    //
    // A candidate that doesn't parse as a URL is never in scope.
    pub fn contains(&self, candidate: &str) -> bool {
        if Url::parse(candidate).is_err() {
            return false;
        }
        raw_authority(candidate) == Some(self.origin_host.as_str())
    }
}
