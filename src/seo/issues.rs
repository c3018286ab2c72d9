use crate::state::{ImageStats, MetaTags, PageIssues};

/// Status codes from here on are reported as critical
pub const ERROR_STATUS: u16 = 400;

/// Load times above this are an opportunity (milliseconds)
pub const SLOW_LOAD_MS: u64 = 3000;

/// Pages larger than this are an opportunity (bytes)
pub const LARGE_PAGE_BYTES: u64 = 1_000_000;

/// The signals of one page the rules look at
#[derive(Debug, Clone, Copy)]
pub struct IssueInput<'a> {
    pub status_code: u16,
    pub title: Option<&'a str>,
    pub meta_tags: &'a MetaTags,
    pub h1_count: usize,
    pub images: ImageStats,
    /// Anchors whose href is exactly `#`
    pub placeholder_links: usize,
    pub load_time: Option<u64>,
    pub size: u64,
}

/// Applies the rule table to one page
///
/// | Severity | Rule |
/// |----------|------|
/// | Critical | status >= 400, title missing or empty, meta description missing, no H1 |
/// | Important | more than one H1, viewport missing, images without alt, `href="#"` anchors |
/// | Opportunity | load time > 3000 ms, size > 1,000,000 bytes, meta keywords missing |
pub fn detect_issues(page: &IssueInput<'_>) -> PageIssues {
    let mut issues = PageIssues::default();

    if page.status_code >= ERROR_STATUS {
        issues
            .critical
            .push(format!("Page returns HTTP error status {}", page.status_code));
    }
    if page.title.map_or(true, |t| t.trim().is_empty()) {
        issues.critical.push("Missing page title".to_string());
    }
    if page.meta_tags.description.is_none() {
        issues.critical.push("Missing meta description".to_string());
    }
    if page.h1_count == 0 {
        issues.critical.push("Missing H1 heading".to_string());
    }

    if page.h1_count > 1 {
        issues
            .important
            .push(format!("Multiple H1 headings ({})", page.h1_count));
    }
    if page.meta_tags.viewport.is_none() {
        issues.important.push("Missing viewport meta tag".to_string());
    }
    if page.images.without_alt > 0 {
        issues.important.push(format!(
            "{} image(s) missing alt text",
            page.images.without_alt
        ));
    }
    if page.placeholder_links > 0 {
        issues.important.push(format!(
            "{} link(s) with placeholder href \"#\"",
            page.placeholder_links
        ));
    }

    if let Some(load_time) = page.load_time.filter(|&ms| ms > SLOW_LOAD_MS) {
        issues
            .opportunities
            .push(format!("Slow page load ({} ms)", load_time));
    }
    if page.size > LARGE_PAGE_BYTES {
        issues
            .opportunities
            .push(format!("Large page size ({} bytes)", page.size));
    }
    if page.meta_tags.keywords.is_none() {
        issues.opportunities.push("Missing meta keywords".to_string());
    }

    issues
}
