//! Crawl manager
//!
//! The manager owns every crawl started in the process, keyed by crawl id.
//! Each crawl is driven by its own [`Scheduler`] task; the manager only
//! hands out snapshots of the state and relays cancellation requests.

use crate::crawler::fetcher::build_http_client;
use crate::crawler::scheduler::Scheduler;
use crate::crawler::read_state;
use crate::output;
use crate::state::{CrawlOptions, CrawlState, CrawlStatus};
use crate::url::normalize_url;
use crate::{AuditError, Result};
use chrono::Utc;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::watch;

/// Everything the manager keeps about one crawl
#[derive(Clone)]
struct CrawlHandle {
    state: Arc<RwLock<CrawlState>>,
    cancelled: Arc<AtomicBool>,
    completed: watch::Receiver<bool>,
}

/// Registry of running and finished crawls
#[derive(Default)]
pub struct CrawlManager {
    crawls: RwLock<HashMap<String, CrawlHandle>>,
}

impl CrawlManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a crawl of the site behind `url` and returns its id
    ///
    /// The seed is normalized first; an unusable seed is the only failure
    /// reported here. Everything that goes wrong once the crawl is running
    /// is recorded in its pages instead. Must be called from within a tokio
    /// runtime.
    ///
    /// # Arguments
    ///
    /// * `url` - Seed URL; `https://` is assumed when no scheme is given
    /// * `options` - Per-crawl options
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The crawl id (UUID v4)
    /// * `Err(AuditError)` - The seed URL is invalid or the HTTP client could not be built
    pub fn start_crawl(&self, url: &str, options: CrawlOptions) -> Result<String> {
        let seed = normalize_url(url, None).map_err(|e| AuditError::InvalidSeed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        let client = build_http_client(&options)?;

        let id = uuid::Uuid::new_v4().to_string();
        let state = Arc::new(RwLock::new(CrawlState::new(id.clone(), &seed, options)));
        let cancelled = Arc::new(AtomicBool::new(false));
        let (tx, rx) = watch::channel(false);

        let scheduler = Scheduler::new(state.clone(), cancelled.clone(), client, tx);
        self.crawls
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                id.clone(),
                CrawlHandle {
                    state,
                    cancelled,
                    completed: rx,
                },
            );

        tracing::info!("Crawl {} registered for {}", id, seed);
        tokio::spawn(scheduler.run());

        Ok(id)
    }

    /// Returns the progress counters of a crawl, `None` for an unknown id
    pub fn get_crawl_status(&self, id: &str) -> Option<CrawlStatus> {
        let handle = self.handle(id)?;
        let status = read_state(&handle.state).status();
        Some(status)
    }

    /// Returns a snapshot of the live or final state of a crawl
    pub fn get_crawl_result(&self, id: &str) -> Option<CrawlState> {
        let handle = self.handle(id)?;
        let state = read_state(&handle.state).clone();
        Some(state)
    }

    /// Requests cancellation of a crawl
    ///
    /// A fetch already in flight completes; no further page is fetched.
    /// Returns false for an unknown id.
    pub fn cancel_crawl(&self, id: &str) -> bool {
        match self.handle(id) {
            Some(handle) => {
                handle.cancelled.store(true, Ordering::SeqCst);
                tracing::info!("Cancellation requested for crawl {}", id);
                true
            }
            None => false,
        }
    }

    /// Waits until a crawl has been finalized and returns its final state
    pub async fn wait_for_completion(&self, id: &str) -> Result<CrawlState> {
        let handle = self.handle(id).ok_or_else(|| unknown(id))?;
        let mut completed = handle.completed;

        if completed.wait_for(|done| *done).await.is_err() {
            // The sender is gone; the scheduler may still have finalized
            // before it was dropped.
            if !read_state(&handle.state).is_completed() {
                return Err(AuditError::CrawlAborted { id: id.to_string() });
            }
        }

        let state = read_state(&handle.state).clone();
        Ok(state)
    }

    /// Returns the sitemap of a crawl
    ///
    /// A finished crawl answers with the sitemap built when it was finalized;
    /// a running one gets a sitemap of the pages recorded so far.
    pub fn generate_sitemap(&self, id: &str) -> Result<String> {
        let handle = self.handle(id).ok_or_else(|| unknown(id))?;
        let state = read_state(&handle.state);

        if let Some(sitemap) = &state.sitemap {
            return Ok(sitemap.clone());
        }
        Ok(output::generate_sitemap(
            state.pages().iter().map(|p| p.url.as_str()),
            Utc::now(),
        ))
    }

    /// Writes the sitemap of a crawl to `path`
    pub fn download_sitemap(&self, id: &str, path: &Path) -> Result<()> {
        let xml = self.generate_sitemap(id)?;
        output::write_sitemap(&xml, path)?;
        tracing::info!("Sitemap for crawl {} written to {}", id, path.display());
        Ok(())
    }

    /// Writes the JSON export of a crawl to `path`
    pub fn export_crawl_data(&self, id: &str, path: &Path) -> Result<()> {
        let state = self.get_crawl_result(id).ok_or_else(|| unknown(id))?;
        output::export_crawl_data(&state, path)
    }

    /// Ids of every crawl started by this manager
    pub fn crawl_ids(&self) -> Vec<String> {
        self.crawls
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    fn handle(&self, id: &str) -> Option<CrawlHandle> {
        self.crawls
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }
}

fn unknown(id: &str) -> AuditError {
    AuditError::UnknownCrawl { id: id.to_string() }
}
