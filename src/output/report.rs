//! Markdown audit report generation
//!
//! Renders the score, issue totals and per-page findings of a crawl as a
//! human-readable markdown document.

use crate::state::{CrawlState, PageRecord};
use crate::Result;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes the markdown report of a crawl to `output_path`
pub fn generate_markdown_report(state: &CrawlState, output_path: &Path) -> Result<()> {
    let markdown = format_markdown_report(state);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    tracing::info!("Report written to {}", output_path.display());
    Ok(())
}

/// Formats a crawl as markdown
pub fn format_markdown_report(state: &CrawlState) -> String {
    let mut md = String::new();

    md.push_str(&format!("# SEO Audit: {}\n\n", state.domain));

    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Crawl ID**: {}\n", state.id));
    md.push_str(&format!("- **Started**: {}\n", state.start_time.to_rfc3339()));
    match state.end_time {
        Some(end) => {
            md.push_str(&format!("- **Finished**: {}\n", end.to_rfc3339()));
            let seconds = (end - state.start_time).num_seconds();
            md.push_str(&format!("- **Duration**: {} seconds\n", seconds));
        }
        None => md.push_str("- **Status**: running\n"),
    }
    if state.cancelled {
        md.push_str("- **Status**: cancelled\n");
    }
    md.push('\n');

    md.push_str("## Overview\n\n");
    match state.score {
        Some(score) => md.push_str(&format!("- **Score**: {}/100\n", score)),
        None => md.push_str("- **Score**: pending\n"),
    }
    md.push_str(&format!("- **Pages Crawled**: {}\n", state.page_count()));
    let unreachable = state.pages().iter().filter(|p| p.is_unreachable()).count();
    md.push_str(&format!("- **Unreachable Pages**: {}\n\n", unreachable));

    md.push_str("| Severity | Count |\n");
    md.push_str("|----------|-------|\n");
    md.push_str(&format!("| Critical | {} |\n", state.issue_totals.critical));
    md.push_str(&format!("| Important | {} |\n", state.issue_totals.important));
    md.push_str(&format!(
        "| Opportunities | {} |\n\n",
        state.issue_totals.opportunities
    ));

    let broken: Vec<&str> = state
        .pages()
        .iter()
        .flat_map(|p| p.links.broken.iter().map(String::as_str))
        .collect();
    if !broken.is_empty() {
        md.push_str("## Broken Links\n\n");
        for link in broken {
            md.push_str(&format!("- `{}`\n", link));
        }
        md.push('\n');
    }

    md.push_str("## Pages\n\n");
    for page in state.pages() {
        format_page(&mut md, page);
    }

    md
}

fn format_page(md: &mut String, page: &PageRecord) {
    md.push_str(&format!("### {}\n\n", page.url));
    md.push_str(&format!(
        "- **Status**: {}\n",
        if page.is_unreachable() {
            "unreachable".to_string()
        } else {
            page.status_code.to_string()
        }
    ));
    if let Some(title) = &page.title {
        md.push_str(&format!("- **Title**: {}\n", title));
    }
    md.push_str(&format!(
        "- **Links**: {} internal, {} external, {} broken\n",
        page.links.internal.len(),
        page.links.external.len(),
        page.links.broken.len()
    ));

    if page.issues.is_empty() {
        md.push_str("\nNo issues found.\n\n");
        return;
    }

    md.push('\n');
    for (label, findings) in [
        ("Critical", &page.issues.critical),
        ("Important", &page.issues.important),
        ("Opportunity", &page.issues.opportunities),
    ] {
        for finding in findings {
            md.push_str(&format!("- **{}**: {}\n", label, finding));
        }
    }
    md.push('\n');
}
