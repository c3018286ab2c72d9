use serde::Deserialize;

/// Main configuration structure for Sumi-Audit
///
/// Every section is optional; a missing file section falls back to the
/// crawler defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default, rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum number of pages recorded per crawl
    ///
    /// Historically named "depth"; it caps the page count, not the link distance.
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Carried for collaborators; traversal only ever follows internal links
    #[serde(rename = "follow-external-links")]
    pub follow_external_links: bool,

    /// Whether image statistics and the missing-alt rule are computed
    #[serde(rename = "check-images")]
    pub check_images: bool,

    /// Whether page load time is recorded
    #[serde(rename = "check-performance")]
    pub check_performance: bool,

    /// Delay between two page fetches of the same crawl (milliseconds)
    #[serde(rename = "request-delay")]
    pub request_delay: u64,

    /// Per-request timeout (milliseconds)
    #[serde(rename = "request-timeout")]
    pub request_timeout: u64,

    /// Maximum number of redirects followed per request
    #[serde(rename = "max-redirects")]
    pub max_redirects: usize,

    /// Bytes of a response body read at most; longer bodies are truncated
    #[serde(rename = "max-page-size")]
    pub max_page_size: usize,

    /// Wall-clock limit for a whole crawl (seconds, 0 disables)
    #[serde(rename = "crawl-deadline")]
    pub crawl_deadline: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: 100,
            follow_external_links: false,
            check_images: true,
            check_performance: true,
            request_delay: 1000,
            request_timeout: 30_000,
            max_redirects: 5,
            max_page_size: 10_000_000,
            crawl_deadline: 1800,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "SumiAudit".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://github.com/sumi-audit/sumi-audit".to_string(),
            contact_email: "crawler@sumi-audit.dev".to_string(),
        }
    }
}

impl UserAgentConfig {
    /// Formats the header value: `CrawlerName/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Where the sitemap XML is written after a crawl
    #[serde(rename = "sitemap-path")]
    pub sitemap_path: Option<String>,

    /// Where the JSON export of the crawl is written
    #[serde(rename = "export-path")]
    pub export_path: Option<String>,

    /// Where the markdown audit report is written
    #[serde(rename = "report-path")]
    pub report_path: Option<String>,
}
