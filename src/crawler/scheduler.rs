//! Scheduler driving one crawl to completion
//!
//! This module handles:
//! - The breadth-first tick loop over the crawl queue
//! - Throttling between page fetches
//! - Cancellation and the overall crawl deadline
//! - Isolating per-URL failures from the loop
//! - Finalizing the crawl (score and sitemap)
//!
//! Exactly one page is in flight per crawl: the next tick starts only after
//! the current URL has been fully processed.

use crate::crawler::analyzer::analyze_page;
use crate::crawler::{read_state, write_state};
use crate::output::generate_sitemap;
use crate::seo::calculate_score;
use crate::state::{CrawlOptions, CrawlState, Dequeued, PageRecord};
use crate::Result;
use chrono::Utc;
use reqwest::Client;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Instant;
use tokio::sync::watch;

/// Outcome of one scheduler tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// A page was fetched and recorded; wait the request delay
    Processed,
    /// The head of the queue was already visited; continue immediately
    Duplicate,
    /// Nothing more to do
    Finished(StopReason),
}

/// Why a crawl stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Queue empty or page cap reached
    Exhausted,
    Cancelled,
    DeadlineExceeded,
}

/// Scheduler owning the tick loop of one crawl
pub struct Scheduler {
    state: Arc<RwLock<CrawlState>>,
    cancelled: Arc<AtomicBool>,
    client: Client,
    completed: watch::Sender<bool>,
    started: Instant,
}

impl Scheduler {
    /// Creates a scheduler for a freshly created crawl state
    ///
    /// # Arguments
    ///
    /// * `state` - The crawl state this scheduler exclusively mutates
    /// * `cancelled` - Flag checked at the top of every tick
    /// * `client` - HTTP client built from the crawl options
    /// * `completed` - Set to `true` once the crawl is finalized
    pub fn new(
        state: Arc<RwLock<CrawlState>>,
        cancelled: Arc<AtomicBool>,
        client: Client,
        completed: watch::Sender<bool>,
    ) -> Self {
        Self {
            state,
            cancelled,
            client,
            completed,
            started: Instant::now(),
        }
    }

    /// Runs ticks until the crawl is exhausted, cancelled or out of time,
    /// then finalizes it
    pub async fn run(self) {
        let (id, delay) = {
            let state = read_state(&self.state);
            (state.id.clone(), state.options.request_delay())
        };
        tracing::info!("Starting crawl {}", id);

        let reason = loop {
            match self.tick().await {
                Tick::Processed => tokio::time::sleep(delay).await,
                Tick::Duplicate => continue,
                Tick::Finished(reason) => break reason,
            }
        };

        self.finalize(reason);
    }

    /// Processes the head of the queue
    pub async fn tick(&self) -> Tick {
        if self.cancelled.load(Ordering::SeqCst) {
            return Tick::Finished(StopReason::Cancelled);
        }

        let (url, domain, options) = {
            let mut state = write_state(&self.state);

            if let Some(deadline) = state.options.crawl_deadline() {
                if self.started.elapsed() >= deadline {
                    return Tick::Finished(StopReason::DeadlineExceeded);
                }
            }
            if state.is_exhausted() {
                return Tick::Finished(StopReason::Exhausted);
            }

            match state.dequeue() {
                None => return Tick::Finished(StopReason::Exhausted),
                Some(Dequeued::Duplicate(url)) => {
                    tracing::debug!("Skipping already visited {}", url);
                    return Tick::Duplicate;
                }
                Some(Dequeued::Fresh(url)) => (url, state.domain.clone(), state.options.clone()),
            }
        };

        let record = self.process_url(&url, domain, options).await;

        let mut state = write_state(&self.state);
        let queued = state.record_page(record);
        tracing::debug!(
            "Recorded {} ({} pages, {} newly queued, {} pending)",
            url,
            state.page_count(),
            queued,
            state.queue_len()
        );

        Tick::Processed
    }

    async fn process_url(&self, url: &str, domain: String, options: CrawlOptions) -> PageRecord {
        let client = self.client.clone();
        let task_url = url.to_string();
        isolate_page_task(url, async move {
            analyze_page(&client, &task_url, &domain, &options).await
        })
        .await
    }

    /// Computes the score and sitemap and marks the crawl completed
    fn finalize(&self, reason: StopReason) {
        let mut state = write_state(&self.state);

        let score = calculate_score(&state.issue_totals, state.page_count());
        let sitemap = generate_sitemap(state.pages().iter().map(|p| p.url.as_str()), Utc::now());
        state.finalize(score, sitemap, reason == StopReason::Cancelled);

        match reason {
            StopReason::Exhausted => tracing::info!(
                "Crawl {} completed: {} pages, score {}",
                state.id,
                state.page_count(),
                score
            ),
            StopReason::Cancelled => tracing::info!(
                "Crawl {} cancelled after {} pages",
                state.id,
                state.page_count()
            ),
            StopReason::DeadlineExceeded => tracing::warn!(
                "Crawl {} stopped at its deadline after {} pages ({} still queued)",
                state.id,
                state.page_count(),
                state.queue_len()
            ),
        }
        drop(state);

        self.completed.send_replace(true);
    }
}

/// Runs the processing of one URL in its own task
///
/// Neither an error nor a panic escapes into the tick loop; both yield the
/// degraded record for `url`.
pub async fn isolate_page_task<F>(url: &str, task: F) -> PageRecord
where
    F: Future<Output = Result<PageRecord>> + Send + 'static,
{
    match tokio::spawn(task).await {
        Ok(Ok(record)) => record,
        Ok(Err(e)) => {
            tracing::warn!("Error processing {}: {}", url, e);
            PageRecord::unreachable(url)
        }
        Err(e) => {
            tracing::error!("Processing {} aborted: {}", url, e);
            PageRecord::unreachable(url)
        }
    }
}
