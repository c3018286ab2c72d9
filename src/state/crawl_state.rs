use crate::config::Config;
use crate::state::page_record::{PageIssues, PageRecord};
use crate::url::extract_domain;
use chrono::{DateTime, Utc};
use serde::ser::Serializer;
use serde::Serialize;
use std::collections::{HashMap, HashSet, VecDeque};
use std::time::Duration;
use url::Url;

/// Per-crawl options
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlOptions {
    /// Maximum number of pages recorded (named "depth" for compatibility)
    pub max_depth: u32,
    pub follow_external_links: bool,
    pub check_images: bool,
    pub check_performance: bool,
    pub user_agent: String,
    /// Pause after each fetched page (milliseconds)
    pub request_delay: u64,
    /// Per-request timeout (milliseconds)
    pub request_timeout: u64,
    pub max_redirects: usize,
    /// Bytes of a response body read at most
    pub max_page_size: usize,
    /// Wall-clock limit for the crawl (seconds)
    pub crawl_deadline: Option<u64>,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl CrawlOptions {
    /// Builds crawl options from the loaded configuration
    pub fn from_config(config: &Config) -> Self {
        let crawler = &config.crawler;
        Self {
            max_depth: crawler.max_depth,
            follow_external_links: crawler.follow_external_links,
            check_images: crawler.check_images,
            check_performance: crawler.check_performance,
            user_agent: config.user_agent.header_value(),
            request_delay: crawler.request_delay,
            request_timeout: crawler.request_timeout,
            max_redirects: crawler.max_redirects,
            max_page_size: crawler.max_page_size,
            crawl_deadline: (crawler.crawl_deadline > 0).then_some(crawler.crawl_deadline),
        }
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout)
    }

    pub fn crawl_deadline(&self) -> Option<Duration> {
        self.crawl_deadline.map(Duration::from_secs)
    }

    /// Page-count cap as a length
    pub fn page_cap(&self) -> usize {
        self.max_depth as usize
    }
}

/// Running counts of findings over every recorded page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IssueTotals {
    pub critical: usize,
    pub important: usize,
    pub opportunities: usize,
}

impl IssueTotals {
    pub fn add(&mut self, issues: &PageIssues) {
        self.critical += issues.critical.len();
        self.important += issues.important.len();
        self.opportunities += issues.opportunities.len();
    }
}

/// Snapshot answered to status polls
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlStatus {
    pub completed: bool,
    pub page_count: usize,
    /// Recorded plus still-queued pages
    pub total_pages: usize,
    /// Head of the queue, if any
    pub current_url: Option<String>,
}

/// Outcome of taking the head of the queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dequeued {
    /// A URL not seen before, now marked visited
    Fresh(String),
    /// A URL already visited; nothing to fetch
    Duplicate(String),
}

/// The full record of one crawl run
///
/// Only the scheduler of the crawl mutates it; once `end_time` is set the
/// state is final.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlState {
    pub id: String,

    /// Hostname of the seed URL
    pub domain: String,

    pub options: CrawlOptions,

    queue: VecDeque<String>,

    #[serde(skip)]
    queued: HashSet<String>,

    visited: HashSet<String>,

    /// Recorded pages in crawl order, serialized as a keyed object
    #[serde(serialize_with = "serialize_pages")]
    pages: Vec<PageRecord>,

    #[serde(skip)]
    page_index: HashMap<String, usize>,

    pub issue_totals: IssueTotals,

    /// Valid only once `end_time` is set
    pub score: Option<u8>,

    pub start_time: DateTime<Utc>,

    pub end_time: Option<DateTime<Utc>>,

    pub cancelled: bool,

    /// Sitemap generated at finalization
    pub sitemap: Option<String>,
}

fn serialize_pages<S: Serializer>(pages: &[PageRecord], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_map(pages.iter().map(|page| (&page.url, page)))
}

impl CrawlState {
    /// Creates a fresh crawl state seeded with one normalized URL
    pub fn new(id: String, seed: &Url, options: CrawlOptions) -> Self {
        let domain = extract_domain(seed).unwrap_or_default();

        let mut state = Self {
            id,
            domain,
            options,
            queue: VecDeque::new(),
            queued: HashSet::new(),
            visited: HashSet::new(),
            pages: Vec::new(),
            page_index: HashMap::new(),
            issue_totals: IssueTotals::default(),
            score: None,
            start_time: Utc::now(),
            end_time: None,
            cancelled: false,
            sitemap: None,
        };
        state.enqueue(seed.to_string());
        state
    }

    /// Returns true once the crawl has been finalized
    pub fn is_completed(&self) -> bool {
        self.end_time.is_some()
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Recorded pages in crawl order
    pub fn pages(&self) -> &[PageRecord] {
        &self.pages
    }

    pub fn page(&self, url: &str) -> Option<&PageRecord> {
        self.page_index.get(url).map(|&i| &self.pages[i])
    }

    /// Pending URLs, head first
    pub fn queue(&self) -> impl Iterator<Item = &str> {
        self.queue.iter().map(String::as_str)
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Returns true when the queue is drained or the page cap is reached
    pub fn is_exhausted(&self) -> bool {
        self.queue.is_empty() || self.pages.len() >= self.options.page_cap()
    }

    /// Appends a URL to the tail of the queue unless it was visited or
    /// is already pending
    pub fn enqueue(&mut self, url: String) -> bool {
        if self.visited.contains(&url) || self.queued.contains(&url) {
            return false;
        }
        self.queued.insert(url.clone());
        self.queue.push_back(url);
        true
    }

    /// Pushes a URL to the tail of the queue without the visited check
    #[cfg(test)]
    pub(crate) fn requeue(&mut self, url: String) {
        self.queue.push_back(url);
    }

    /// Takes the head of the queue, marking it visited when fresh
    pub fn dequeue(&mut self) -> Option<Dequeued> {
        let url = self.queue.pop_front()?;
        self.queued.remove(&url);

        if self.visited.contains(&url) {
            return Some(Dequeued::Duplicate(url));
        }
        self.visited.insert(url.clone());
        Some(Dequeued::Fresh(url))
    }

    /// Stores a page, updates the issue totals and queues its new internal links
    ///
    /// Returns the number of URLs added to the queue.
    pub fn record_page(&mut self, record: PageRecord) -> usize {
        self.issue_totals.add(&record.issues);

        let mut queued = 0;
        for link in &record.links.internal {
            if self.enqueue(link.clone()) {
                queued += 1;
            }
        }

        match self.page_index.get(&record.url) {
            Some(&i) => self.pages[i] = record,
            None => {
                self.page_index.insert(record.url.clone(), self.pages.len());
                self.pages.push(record);
            }
        }
        queued
    }

    /// Copies out the status counters
    pub fn status(&self) -> CrawlStatus {
        CrawlStatus {
            completed: self.is_completed(),
            page_count: self.pages.len(),
            total_pages: self.pages.len() + self.queue.len(),
            current_url: self.queue.front().cloned(),
        }
    }

    /// Marks the crawl as finished
    pub fn finalize(&mut self, score: u8, sitemap: String, cancelled: bool) {
        self.score = Some(score);
        self.sitemap = Some(sitemap);
        self.cancelled = cancelled;
        self.end_time = Some(Utc::now());
    }
}
