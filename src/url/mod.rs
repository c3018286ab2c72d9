//! URL handling module for Sumi-Audit
//!
//! This module provides URL normalization, hostname extraction, and the
//! per-link internal/external/broken classification.

mod domain;
mod normalize;

pub use domain::{extract_domain, is_same_host};
pub use normalize::normalize_url;

use url::Url;

/// Classification of one anchor href relative to the crawl domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkClass {
    /// Same hostname as the crawl; candidate for traversal
    Internal(Url),
    /// Different hostname
    External(Url),
    /// Could not be parsed into an http(s) URL
    Broken,
}

impl LinkClass {
    /// Returns true if the link should be followed by the crawler
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Internal(_))
    }
}

/// Classifies a resolved href against the crawl domain
///
/// The href is expected to be absolute already (the parser resolves relative
/// hrefs against the page URL); anything that does not normalize is broken.
///
/// # Examples
///
/// ```
/// use sumi_audit::url::{classify_link, LinkClass};
///
/// assert!(classify_link("https://example.com/x", "example.com").is_internal());
/// assert!(matches!(classify_link("https://other.com/", "example.com"), LinkClass::External(_)));
/// assert_eq!(classify_link("not a url", "example.com"), LinkClass::Broken);
/// ```
pub fn classify_link(href: &str, domain: &str) -> LinkClass {
    match normalize_url(href, None) {
        Ok(url) if is_same_host(&url, domain) => LinkClass::Internal(url),
        Ok(url) => LinkClass::External(url),
        Err(e) => {
            tracing::trace!("Link {:?} is broken: {}", href, e);
            LinkClass::Broken
        }
    }
}
