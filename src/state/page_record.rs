//! Per-page analysis record
//!
//! A `PageRecord` is produced for every URL the scheduler dequeues, whether
//! or not the fetch succeeded. A status code of 0 marks a fetch failure.

use serde::{Deserialize, Serialize};

/// Critical finding attached to pages that could not be fetched at all
pub const PAGE_UNREACHABLE: &str = "Page could not be accessed";

/// The analysis result for one crawled URL
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRecord {
    /// Normalized URL, also the key of the page in its crawl
    pub url: String,

    /// HTTP status code, 0 when the fetch failed
    pub status_code: u16,

    /// Text of the first `<title>` element
    pub title: Option<String>,

    pub meta_tags: MetaTags,

    pub headings: Headings,

    pub links: LinkSets,

    pub images: ImageStats,

    pub performance: Performance,

    pub issues: PageIssues,

    /// Raw HTML as fetched, kept for export and content optimization
    pub content: String,
}

impl PageRecord {
    /// Builds the degraded record stored when a page could not be fetched
    /// or processed
    pub fn unreachable(url: &str) -> Self {
        Self {
            url: url.to_string(),
            status_code: 0,
            links: LinkSets {
                broken: vec![url.to_string()],
                ..LinkSets::default()
            },
            issues: PageIssues {
                critical: vec![PAGE_UNREACHABLE.to_string()],
                ..PageIssues::default()
            },
            ..Self::default()
        }
    }

    /// Returns true if this record stands for a failed fetch
    pub fn is_unreachable(&self) -> bool {
        self.status_code == 0
    }
}

/// Values of the content attribute of well-known meta tags
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaTags {
    pub description: Option<String>,
    pub keywords: Option<String>,
    pub robots: Option<String>,
    pub viewport: Option<String>,
    pub og_title: Option<String>,
    pub og_description: Option<String>,
    pub og_image: Option<String>,
}

/// Trimmed heading texts in document order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Headings {
    pub h1: Vec<String>,
    pub h2: Vec<String>,
    pub h3: Vec<String>,
    pub h4: Vec<String>,
}

/// Links of a page partitioned relative to the crawl domain
///
/// `internal` and `external` behave as insertion-ordered sets; `broken`
/// keeps every unresolvable href as written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkSets {
    pub internal: Vec<String>,
    pub external: Vec<String>,
    pub broken: Vec<String>,
}

impl LinkSets {
    /// Appends an internal link unless already present
    pub fn add_internal(&mut self, url: String) -> bool {
        push_unique(&mut self.internal, url)
    }

    /// Appends an external link unless already present
    pub fn add_external(&mut self, url: String) -> bool {
        push_unique(&mut self.external, url)
    }

    /// Appends a broken href
    pub fn add_broken(&mut self, href: String) {
        self.broken.push(href);
    }
}

fn push_unique(list: &mut Vec<String>, value: String) -> bool {
    if list.contains(&value) {
        false
    } else {
        list.push(value);
        true
    }
}

/// Image counters of a page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageStats {
    pub total: u32,
    pub with_alt: u32,
    pub without_alt: u32,
    /// Images declaring a width or height above 1000px
    pub large: u32,
}

/// Size and timing of a page fetch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Performance {
    /// Body size in bytes
    pub size: u64,
    /// Fetch time in milliseconds, absent when not measured
    pub load_time: Option<u64>,
    pub resource_count: u32,
}

/// Human-readable findings by severity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageIssues {
    pub critical: Vec<String>,
    pub important: Vec<String>,
    pub opportunities: Vec<String>,
}

impl PageIssues {
    /// Total number of findings across all severities
    pub fn total(&self) -> usize {
        self.critical.len() + self.important.len() + self.opportunities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreachable_record() {
        let record = PageRecord::unreachable("https://example.com/down");

        assert!(record.is_unreachable());
        assert!(record.content.is_empty());
        assert!(record.links.internal.is_empty());
        assert!(record.links.external.is_empty());
        assert_eq!(record.links.broken, vec!["https://example.com/down"]);
        assert_eq!(record.issues.critical, vec![PAGE_UNREACHABLE]);
        assert_eq!(record.issues.total(), 1);
    }

    #[test]
    fn test_link_sets_dedup() {
        let mut links = LinkSets::default();
        assert!(links.add_internal("https://example.com/a".to_string()));
        assert!(!links.add_internal("https://example.com/a".to_string()));
        assert!(links.add_external("https://other.com/".to_string()));
        assert!(!links.add_external("https://other.com/".to_string()));

        links.add_broken("::".to_string());
        links.add_broken("::".to_string());

        assert_eq!(links.internal.len(), 1);
        assert_eq!(links.external.len(), 1);
        assert_eq!(links.broken.len(), 2);
    }

    #[test]
    fn test_serializes_camel_case() {
        let record = PageRecord::unreachable("https://example.com/");
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["statusCode"], 0);
        assert!(json["metaTags"]["ogTitle"].is_null());
        assert!(json["performance"]["loadTime"].is_null());
        assert_eq!(json["images"]["withoutAlt"], 0);
    }
}
