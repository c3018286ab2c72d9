//! Crawler module for fetching and analyzing pages
//!
//! This module contains the crawl machinery, including:
//! - HTTP fetching with timeout and redirect limits
//! - HTML parsing and SEO signal extraction
//! - Link classification
//! - The per-crawl scheduler loop
//! - The crawl manager answering status and result queries

mod analyzer;
mod classifier;
mod fetcher;
mod manager;
mod parser;
mod scheduler;

pub use analyzer::{analyze_page, build_page_record, summarize_images, FetchedPage};
pub use classifier::classify_links;
pub use fetcher::{build_http_client, fetch_url, FetchResult};
pub use manager::CrawlManager;
pub use parser::{
    extract_page, parse_html, Anchor, HtmlDocument, ImageInfo, ParsedPage, ScraperDocument,
};
pub use scheduler::{isolate_page_task, Scheduler, StopReason, Tick};

use crate::state::CrawlState;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Locks a crawl state for reading
///
/// The state is only mutated through short synchronous sections, so a
/// poisoned lock still holds consistent data.
pub(crate) fn read_state(state: &RwLock<CrawlState>) -> RwLockReadGuard<'_, CrawlState> {
    state.read().unwrap_or_else(PoisonError::into_inner)
}

/// Locks a crawl state for writing
pub(crate) fn write_state(state: &RwLock<CrawlState>) -> RwLockWriteGuard<'_, CrawlState> {
    state.write().unwrap_or_else(PoisonError::into_inner)
}
