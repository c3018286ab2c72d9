//! Link classification for one page
//!
//! Partitions the links found on a page into internal, external and broken
//! relative to the crawl domain.

use crate::state::LinkSets;
use crate::url::{classify_link, LinkClass};

/// Classifies every link of a page against the crawl domain
///
/// Internal and external links are appended once each, in order of first
/// appearance; unresolvable hrefs are appended to `broken` as written.
///
/// # Example
///
/// ```
/// use sumi_audit::crawler::classify_links;
///
/// let links = ["https://example.com/x", "https://other.com/", "not a url"];
/// let sets = classify_links(links, "example.com");
/// assert_eq!(sets.internal, vec!["https://example.com/x"]);
/// assert_eq!(sets.external, vec!["https://other.com/"]);
/// assert_eq!(sets.broken, vec!["not a url"]);
/// ```
pub fn classify_links<'a, I>(links: I, domain: &str) -> LinkSets
where
    I: IntoIterator<Item = &'a str>,
{
    let mut sets = LinkSets::default();

    for link in links {
        match classify_link(link, domain) {
            LinkClass::Internal(url) => {
                sets.add_internal(url.to_string());
            }
            LinkClass::External(url) => {
                sets.add_external(url.to_string());
            }
            LinkClass::Broken => sets.add_broken(link.to_string()),
        }
    }

    sets
}
