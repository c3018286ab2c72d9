use crate::state::IssueTotals;

/// Points removed per critical finding per page
pub const CRITICAL_WEIGHT: f64 = 50.0;

/// Points removed per important finding per page
pub const IMPORTANT_WEIGHT: f64 = 20.0;

/// Points removed per opportunity per page
pub const OPPORTUNITY_WEIGHT: f64 = 5.0;

/// Converts issue density into a 0-100 score
///
/// `100 - critical/pages*50 - important/pages*20 - opportunities/pages*5`,
/// clamped to 0..=100 and rounded. A crawl without pages scores 0.
///
/// # Example
///
/// ```
/// use sumi_audit::seo::calculate_score;
/// use sumi_audit::state::IssueTotals;
///
/// let totals = IssueTotals { critical: 1, important: 0, opportunities: 2 };
/// assert_eq!(calculate_score(&totals, 4), 85);
/// ```
pub fn calculate_score(totals: &IssueTotals, page_count: usize) -> u8 {
    if page_count == 0 {
        return 0;
    }

    let pages = page_count as f64;
    let score = 100.0
        - (totals.critical as f64 / pages) * CRITICAL_WEIGHT
        - (totals.important as f64 / pages) * IMPORTANT_WEIGHT
        - (totals.opportunities as f64 / pages) * OPPORTUNITY_WEIGHT;

    score.clamp(0.0, 100.0).round() as u8
}
