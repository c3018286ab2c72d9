//! HTTP fetcher implementation
//!
//! This module performs the single GET request made for every crawled page:
//! - Building a per-crawl client with its user agent, timeout and redirect limit
//! - Timing the request
//! - Mapping transport errors and 5xx responses to a fetch failure
//!
//! Any status below 500 counts as a successful fetch so that 4xx pages are
//! still parsed and analyzed.

use crate::state::CrawlOptions;
use reqwest::{redirect::Policy, Client};
use std::time::{Duration, Instant};

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// The server answered with a status below 500
    Success {
        /// Final URL after redirects
        final_url: String,
        /// HTTP status code
        status_code: u16,
        /// Page body content
        body: String,
        /// Time from sending the request to reading the whole body
        elapsed_ms: u64,
    },

    /// Network error, timeout, too many redirects or a 5xx status
    Failure {
        /// Error description
        error: String,
    },
}

impl FetchResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Builds the HTTP client used by one crawl
///
/// # Example
///
/// ```no_run
/// use sumi_audit::crawler::build_http_client;
/// use sumi_audit::CrawlOptions;
///
/// let client = build_http_client(&CrawlOptions::default()).unwrap();
/// ```
pub fn build_http_client(options: &CrawlOptions) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(options.user_agent.as_str())
        .timeout(options.request_timeout())
        .connect_timeout(Duration::from_secs(10).min(options.request_timeout()))
        .redirect(Policy::limited(options.max_redirects))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL, never returning an error
///
/// | Condition | Result |
/// |-----------|--------|
/// | Status < 500 | Success |
/// | Status >= 500 | Failure |
/// | Timeout | Failure |
/// | Connection refused / DNS / TLS | Failure |
/// | Redirect chain over the limit | Failure |
/// | Body could not be read | Failure |
///
/// At most `max_body_bytes` of the body are read; a longer body is truncated.
/// The body is decoded as UTF-8 with invalid sequences replaced.
pub async fn fetch_url(client: &Client, url: &str, max_body_bytes: usize) -> FetchResult {
    let started = Instant::now();

    let mut response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => {
            return FetchResult::Failure {
                error: classify_error(&e),
            }
        }
    };

    let status = response.status();
    let final_url = response.url().to_string();

    if status.is_server_error() {
        return FetchResult::Failure {
            error: format!("HTTP {}", status.as_u16()),
        };
    }

    let mut body: Vec<u8> = Vec::new();
    loop {
        match response.chunk().await {
            Ok(Some(chunk)) => {
                let room = max_body_bytes.saturating_sub(body.len());
                if chunk.len() > room {
                    body.extend_from_slice(&chunk[..room]);
                    tracing::warn!("Body of {} truncated at {} bytes", final_url, max_body_bytes);
                    break;
                }
                body.extend_from_slice(&chunk);
            }
            Ok(None) => break,
            Err(e) => {
                return FetchResult::Failure {
                    error: classify_error(&e),
                }
            }
        }
    }

    FetchResult::Success {
        final_url,
        status_code: status.as_u16(),
        body: String::from_utf8_lossy(&body).into_owned(),
        elapsed_ms: started.elapsed().as_millis() as u64,
    }
}

fn classify_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "Request timeout".to_string()
    } else if e.is_redirect() {
        "Too many redirects".to_string()
    } else if e.is_connect() {
        "Connection refused".to_string()
    } else {
        e.to_string()
    }
}
