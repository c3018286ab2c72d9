//! HTML parser for extracting on-page SEO signals
//!
//! This module extracts, in document order:
//! - The page title
//! - Well-known meta tags (description, keywords, robots, viewport, Open Graph)
//! - h1 to h4 heading texts
//! - Anchor hrefs, resolved against the page URL
//! - Images with their alt text and declared dimensions
//!
//! Extraction goes through the `HtmlDocument` capability so the rules do not
//! depend on a particular HTML library. Parsing is lenient: malformed markup
//! never fails, missing fields come back as `None` or empty.

use crate::state::{Headings, MetaTags};
use crate::url::normalize_url;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Minimal query interface over a parsed HTML document
pub trait HtmlDocument {
    /// Handle to one element of the document
    type Element<'a>: Copy
    where
        Self: 'a;

    /// Elements matching a CSS selector in document order; an invalid
    /// selector matches nothing
    fn query<'a>(&'a self, selector: &str) -> Vec<Self::Element<'a>>;

    /// Value of an attribute of `element`
    fn attribute<'a>(&'a self, element: Self::Element<'a>, name: &str) -> Option<&'a str>;

    /// Concatenated descendant text of `element`
    fn text<'a>(&'a self, element: Self::Element<'a>) -> String;
}

/// `HtmlDocument` backed by the tag-soup tolerant `scraper` parser
pub struct ScraperDocument {
    html: Html,
}

impl ScraperDocument {
    pub fn parse(html: &str) -> Self {
        Self {
            html: Html::parse_document(html),
        }
    }
}

impl HtmlDocument for ScraperDocument {
    type Element<'a> = ElementRef<'a>;

    fn query<'a>(&'a self, selector: &str) -> Vec<ElementRef<'a>> {
        match Selector::parse(selector) {
            Ok(selector) => self.html.select(&selector).collect(),
            Err(_) => {
                tracing::trace!("Invalid selector: {}", selector);
                Vec::new()
            }
        }
    }

    fn attribute<'a>(&'a self, element: ElementRef<'a>, name: &str) -> Option<&'a str> {
        element.value().attr(name)
    }

    fn text<'a>(&'a self, element: ElementRef<'a>) -> String {
        element.text().collect()
    }
}

/// One `<a href>` of a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    /// The href attribute as written
    pub href: String,

    /// Resolved absolute URL, or the raw href when it cannot be resolved;
    /// `None` for hrefs that do not point at a page (javascript:, mailto:, ...)
    pub link: Option<String>,
}

/// One `<img>` of a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInfo {
    pub src: Option<String>,
    pub alt: Option<String>,
    /// Declared width, 0 when absent or not numeric
    pub width: u32,
    /// Declared height, 0 when absent or not numeric
    pub height: u32,
}

impl ImageInfo {
    pub fn has_alt(&self) -> bool {
        self.alt.as_deref().is_some_and(|alt| !alt.trim().is_empty())
    }
}

/// Extracted information from an HTML page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedPage {
    /// Trimmed text of the first `<title>`, `None` when missing or empty
    pub title: Option<String>,

    pub meta_tags: MetaTags,

    pub headings: Headings,

    pub anchors: Vec<Anchor>,

    pub images: Vec<ImageInfo>,

    /// Scripts, stylesheets and images referenced by the page
    pub resource_count: u32,
}

impl ParsedPage {
    /// Links to classify: resolved hrefs, raw ones when unresolvable
    pub fn links(&self) -> impl Iterator<Item = &str> {
        self.anchors.iter().filter_map(|a| a.link.as_deref())
    }

    /// Number of anchors whose href is exactly `#`
    pub fn placeholder_anchor_count(&self) -> usize {
        self.anchors.iter().filter(|a| a.href == "#").count()
    }
}

/// Parses HTML content and extracts SEO signals
///
/// # Example
///
/// ```
/// use sumi_audit::crawler::parse_html;
/// use url::Url;
///
/// let html = r#"<html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let parsed = parse_html(html, &base_url);
/// assert_eq!(parsed.title, Some("Test".to_string()));
/// assert_eq!(parsed.links().collect::<Vec<_>>(), vec!["https://example.com/page"]);
/// ```
pub fn parse_html(html: &str, base_url: &Url) -> ParsedPage {
    let document = ScraperDocument::parse(html);
    extract_page(&document, base_url)
}

/// Extracts SEO signals from any `HtmlDocument`
pub fn extract_page<D: HtmlDocument>(document: &D, base_url: &Url) -> ParsedPage {
    ParsedPage {
        title: extract_title(document),
        meta_tags: extract_meta_tags(document),
        headings: extract_headings(document),
        anchors: extract_anchors(document, base_url),
        images: extract_images(document),
        resource_count: count_resources(document),
    }
}

fn extract_title<D: HtmlDocument>(document: &D) -> Option<String> {
    document
        .query("title")
        .into_iter()
        .next()
        .map(|element| document.text(element).trim().to_string())
        .filter(|s| !s.is_empty())
}

fn meta_content<D: HtmlDocument>(document: &D, selector: &str) -> Option<String> {
    document
        .query(selector)
        .into_iter()
        .next()
        .and_then(|element| document.attribute(element, "content"))
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
}

fn extract_meta_tags<D: HtmlDocument>(document: &D) -> MetaTags {
    MetaTags {
        description: meta_content(document, r#"meta[name="description"]"#),
        keywords: meta_content(document, r#"meta[name="keywords"]"#),
        robots: meta_content(document, r#"meta[name="robots"]"#),
        viewport: meta_content(document, r#"meta[name="viewport"]"#),
        og_title: meta_content(document, r#"meta[property="og:title"]"#),
        og_description: meta_content(document, r#"meta[property="og:description"]"#),
        og_image: meta_content(document, r#"meta[property="og:image"]"#),
    }
}

fn heading_texts<D: HtmlDocument>(document: &D, tag: &str) -> Vec<String> {
    document
        .query(tag)
        .into_iter()
        .map(|element| document.text(element).trim().to_string())
        .collect()
}

fn extract_headings<D: HtmlDocument>(document: &D) -> Headings {
    Headings {
        h1: heading_texts(document, "h1"),
        h2: heading_texts(document, "h2"),
        h3: heading_texts(document, "h3"),
        h4: heading_texts(document, "h4"),
    }
}

fn extract_anchors<D: HtmlDocument>(document: &D, base_url: &Url) -> Vec<Anchor> {
    document
        .query("a[href]")
        .into_iter()
        .filter_map(|element| document.attribute(element, "href"))
        .map(|href| Anchor {
            href: href.to_string(),
            link: resolve_link(href, base_url),
        })
        .collect()
}

/// Resolves an href to an absolute URL
///
/// Returns `None` for hrefs that are not links to pages:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
///
/// Hrefs that fail to resolve are returned unchanged so they can be
/// reported as broken.
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let trimmed = href.trim();
    let lower = trimmed.to_ascii_lowercase();

    if lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
    {
        return None;
    }

    match normalize_url(trimmed, Some(base_url)) {
        Ok(url) => Some(url.to_string()),
        Err(e) => {
            tracing::trace!("Unresolvable href {:?} on {}: {}", href, base_url, e);
            Some(href.to_string())
        }
    }
}

fn extract_images<D: HtmlDocument>(document: &D) -> Vec<ImageInfo> {
    document
        .query("img")
        .into_iter()
        .map(|element| ImageInfo {
            src: document.attribute(element, "src").map(str::to_string),
            alt: document.attribute(element, "alt").map(str::to_string),
            width: parse_dimension(document.attribute(element, "width")),
            height: parse_dimension(document.attribute(element, "height")),
        })
        .collect()
}

/// Reads the leading digits of a dimension attribute ("640", "640px")
fn parse_dimension(value: Option<&str>) -> u32 {
    value
        .map(|v| {
            v.trim()
                .chars()
                .take_while(|c| c.is_ascii_digit())
                .collect::<String>()
        })
        .and_then(|digits| digits.parse().ok())
        .unwrap_or(0)
}

fn count_resources<D: HtmlDocument>(document: &D) -> u32 {
    let scripts = document.query("script[src]").len();
    let stylesheets = document.query(r#"link[rel~="stylesheet"][href]"#).len();
    let images = document.query("img[src]").len();
    (scripts + stylesheets + images) as u32
}
