//! Per-URL analysis pipeline
//!
//! Fetch → parse → classify links → detect issues, producing one
//! `PageRecord`. A failed fetch yields the degraded record instead of an error.

use crate::crawler::classifier::classify_links;
use crate::crawler::fetcher::{fetch_url, FetchResult};
use crate::crawler::parser::{parse_html, ImageInfo};
use crate::seo::{detect_issues, IssueInput};
use crate::state::{CrawlOptions, ImageStats, PageRecord, Performance};
use crate::url::normalize_url;
use crate::Result;
use reqwest::Client;

/// Declared dimension above which an image counts as large
const LARGE_IMAGE_PX: u32 = 1000;

/// A page body as received from the fetcher
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub final_url: String,
    pub status_code: u16,
    pub body: String,
    pub elapsed_ms: u64,
}

/// Fetches and analyzes one URL of a crawl
///
/// Fetch failures are mapped to `PageRecord::unreachable`; an `Err` is only
/// returned for failures after the fetch succeeded.
pub async fn analyze_page(
    client: &Client,
    url: &str,
    domain: &str,
    options: &CrawlOptions,
) -> Result<PageRecord> {
    match fetch_url(client, url, options.max_page_size).await {
        FetchResult::Success {
            final_url,
            status_code,
            body,
            elapsed_ms,
        } => {
            tracing::debug!("Fetched {} ({}, {} ms)", url, status_code, elapsed_ms);
            let fetched = FetchedPage {
                final_url,
                status_code,
                body,
                elapsed_ms,
            };
            build_page_record(url, fetched, domain, options)
        }
        FetchResult::Failure { error } => {
            tracing::warn!("Could not fetch {}: {}", url, error);
            Ok(PageRecord::unreachable(url))
        }
    }
}

/// Turns a fetched page into its analysis record
pub fn build_page_record(
    url: &str,
    fetched: FetchedPage,
    domain: &str,
    options: &CrawlOptions,
) -> Result<PageRecord> {
    let base_url = normalize_url(&fetched.final_url, None)?;
    let parsed = parse_html(&fetched.body, &base_url);
    let links = classify_links(parsed.links(), domain);

    let images = if options.check_images {
        summarize_images(&parsed.images)
    } else {
        ImageStats::default()
    };

    let performance = Performance {
        size: fetched.body.len() as u64,
        load_time: options.check_performance.then_some(fetched.elapsed_ms),
        resource_count: parsed.resource_count,
    };

    let issues = detect_issues(&IssueInput {
        status_code: fetched.status_code,
        title: parsed.title.as_deref(),
        meta_tags: &parsed.meta_tags,
        h1_count: parsed.headings.h1.len(),
        images,
        placeholder_links: parsed.placeholder_anchor_count(),
        load_time: performance.load_time,
        size: performance.size,
    });

    tracing::trace!(
        "{}: {} internal, {} external, {} broken links, {} issues",
        url,
        links.internal.len(),
        links.external.len(),
        links.broken.len(),
        issues.total()
    );

    Ok(PageRecord {
        url: url.to_string(),
        status_code: fetched.status_code,
        title: parsed.title,
        meta_tags: parsed.meta_tags,
        headings: parsed.headings,
        links,
        images,
        performance,
        issues,
        content: fetched.body,
    })
}

/// Counts images with and without alt text and large images
pub fn summarize_images(images: &[ImageInfo]) -> ImageStats {
    let mut stats = ImageStats {
        total: images.len() as u32,
        ..ImageStats::default()
    };

    for image in images {
        if image.has_alt() {
            stats.with_alt += 1;
        } else {
            stats.without_alt += 1;
        }
        if image.width > LARGE_IMAGE_PX || image.height > LARGE_IMAGE_PX {
            stats.large += 1;
        }
    }

    stats
}
