//! On-page SEO rules and crawl scoring
//!
//! - `issues`: fixed per-page rule table producing critical, important and
//!   opportunity findings
//! - `score`: converts the accumulated findings of a crawl into a 0-100 score

mod issues;
mod score;

pub use issues::{detect_issues, IssueInput, ERROR_STATUS, LARGE_PAGE_BYTES, SLOW_LOAD_MS};
pub use score::{calculate_score, CRITICAL_WEIGHT, IMPORTANT_WEIGHT, OPPORTUNITY_WEIGHT};
