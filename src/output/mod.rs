//! Output module for crawl artifacts
//!
//! This module handles:
//! - Generating the sitemaps.org sitemap of a crawl
//! - Exporting a crawl as JSON
//! - Rendering a markdown audit report

mod export;
mod report;
mod sitemap;

pub use export::{crawl_data_json, export_crawl_data};
pub use report::{format_markdown_report, generate_markdown_report};
pub use sitemap::{generate_sitemap, write_sitemap, SITEMAP_NAMESPACE};
