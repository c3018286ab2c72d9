//! State module for crawl runs
//!
//! # Components
//!
//! - `CrawlState`: queue, visited set, recorded pages and totals of one crawl
//! - `CrawlOptions`: per-crawl limits and toggles
//! - `PageRecord`: analysis result of a single URL

mod crawl_state;
mod page_record;

pub use crawl_state::{CrawlOptions, CrawlState, CrawlStatus, Dequeued, IssueTotals};
pub use page_record::{
    Headings, ImageStats, LinkSets, MetaTags, PageIssues, PageRecord, Performance,
    PAGE_UNREACHABLE,
};
