// src/crawl/normalize.rs
// =============================================================================
// This module turns a URL into the key we deduplicate pages by.
//
// A canonical key is "host[:port]/path" with:
// - the scheme removed (http and https pages are the same page)
// - the query string and fragment removed
// - exactly one trailing "/" trimmed
//
// Examples:
//   https://www.google.com/                 -> www.google.com
//   https://en.wikipedia.org/wiki/URL#Syntax -> en.wikipedia.org/wiki/URL
//   https://www.youtube.com/watch?v=abc      -> www.youtube.com/watch
//
// Host and path are taken exactly as written: "Example.com" and "example.com"
// are different keys, and so are "site.test:80" and "site.test".
//
// Normalizing a key again gives back the same key, so a key without a scheme
// is read as "host[:port]/path".
// =============================================================================

use serde::Serialize;
use std::fmt;
use thiserror::Error;
use url::{ParseError, Url};

/// Dedup identity of a page: host plus path, nothing else.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CanonicalKey(String);

impl CanonicalKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("invalid URL '{url}': {source}")]
    Invalid {
        url: String,
        #[source]
        source: ParseError,
    },
    #[error("URL has no host: {0}")]
    MissingHost(String),
}

// Normalizes a raw URL into its canonical key
//
// The url crate only checks that the input is a valid URL with a host. The
// key itself is cut from the text as written, so the host keeps its case and
// any explicit port (":80" included), and the path is not re-encoded.
//
// Fails when the input is not a valid URL or has no host (mailto:, data:, ...)
pub fn normalize(raw: &str) -> Result<CanonicalKey, NormalizeError> {
    let raw = raw.trim();
    parse_lenient(raw)?;

    let rest = raw.split_once("://").map_or(raw, |(_, rest)| rest);
    let (host, path) = split_host_and_path(rest);
    if host.is_empty() {
        return Err(NormalizeError::MissingHost(raw.to_string()));
    }

    let path = path.strip_suffix('/').unwrap_or(path);
    Ok(CanonicalKey(format!("{}{}", host, path)))
}

// Returns the authority of a URL as written: "host" or "host:port", without
// any "user:password@" prefix
//
// Examples:
//   "https://Example.com:80/a?b"  -> Some("Example.com:80")
//   "http://user@site.test/"      -> Some("site.test")
//   "mailto:someone@example.com"  -> None (no "://")
pub(crate) fn raw_authority(raw: &str) -> Option<&str> {
    let (_, rest) = raw.trim().split_once("://")?;
    let (host, _) = split_host_and_path(rest);
    if host.is_empty() {
        None
    } else {
        Some(host)
    }
}

// Splits "[userinfo@]host[:port]/path?query#fragment" into host and path.
// Query and fragment are dropped; the path keeps its leading "/".
fn split_host_and_path(rest: &str) -> (&str, &str) {
    let rest = rest
        .split(|c: char| c == '?' || c == '#')
        .next()
        .unwrap_or_default();
    let (authority, path) = match rest.find('/') {
        Some(i) => rest.split_at(i),
        None => (rest, ""),
    };
    let host = authority
        .rsplit_once('@')
        .map_or(authority, |(_, host)| host);
    (host, path)
}

// Parses a URL, accepting the scheme-less "host[:port]/path" form of a key
fn parse_lenient(raw: &str) -> Result<Url, NormalizeError> {
    let invalid = |source| NormalizeError::Invalid {
        url: raw.to_string(),
        source,
    };

    match Url::parse(raw) {
        Ok(url) if url.has_host() => Ok(url),
        // "localhost:8080/page" parses as scheme "localhost" with no host
        Ok(_) if looks_like_host_and_port(raw) => {
            Url::parse(&format!("http://{}", raw)).map_err(invalid)
        }
        Ok(_) => Err(NormalizeError::MissingHost(raw.to_string())),
        Err(ParseError::RelativeUrlWithoutBase) if !raw.is_empty() => {
            Url::parse(&format!("http://{}", raw)).map_err(invalid)
        }
        Err(e) => Err(invalid(e)),
    }
}

fn looks_like_host_and_port(raw: &str) -> bool {
    if raw.contains("://") {
        return false;
    }
    match raw.split_once(':') {
        Some((_, rest)) => rest.starts_with(|c: char| c.is_ascii_digit()),
        None => false,
    }
}
