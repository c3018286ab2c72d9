//! JSON export of a crawl

use crate::state::CrawlState;
use crate::Result;
use std::fs;
use std::path::Path;

/// Serializes a crawl as pretty-printed JSON
///
/// `pages` is written as an object keyed by URL, in crawl order.
pub fn crawl_data_json(state: &CrawlState) -> Result<String> {
    Ok(serde_json::to_string_pretty(state)?)
}

/// Writes the JSON export of a crawl to disk
pub fn export_crawl_data(state: &CrawlState, path: &Path) -> Result<()> {
    let json = crawl_data_json(state)?;
    fs::write(path, json)?;
    tracing::info!("Crawl {} exported to {}", state.id, path.display());
    Ok(())
}
