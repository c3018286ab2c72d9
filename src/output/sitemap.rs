//! Sitemap generation (sitemaps.org protocol 0.9)

use chrono::{DateTime, SecondsFormat, Utc};
use quick_xml::escape::escape;
use std::fs;
use std::path::Path;

/// XML namespace of the sitemap protocol
pub const SITEMAP_NAMESPACE: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

const CHANGE_FREQUENCY: &str = "monthly";
const PRIORITY: &str = "0.8";

/// Serializes crawled URLs to a sitemap document
///
/// Every entry gets `lastmod` = `generated_at`, a monthly change frequency
/// and priority 0.8, so the output only varies with the timestamp.
///
/// # Example
///
/// ```
/// use chrono::Utc;
/// use sumi_audit::output::generate_sitemap;
///
/// let xml = generate_sitemap(["https://example.com/?a=1&b=2"], Utc::now());
/// assert!(xml.contains("<loc>https://example.com/?a=1&amp;b=2</loc>"));
/// ```
pub fn generate_sitemap<'a, I>(urls: I, generated_at: DateTime<Utc>) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let lastmod = generated_at.to_rfc3339_opts(SecondsFormat::Millis, true);

    let mut xml = String::new();
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str(&format!("<urlset xmlns=\"{}\">\n", SITEMAP_NAMESPACE));

    for url in urls {
        xml.push_str("  <url>\n");
        xml.push_str(&format!("    <loc>{}</loc>\n", escape(url)));
        xml.push_str(&format!("    <lastmod>{}</lastmod>\n", lastmod));
        xml.push_str(&format!("    <changefreq>{}</changefreq>\n", CHANGE_FREQUENCY));
        xml.push_str(&format!("    <priority>{}</priority>\n", PRIORITY));
        xml.push_str("  </url>\n");
    }

    xml.push_str("</urlset>\n");
    xml
}

/// Writes a sitemap document to disk
pub fn write_sitemap(xml: &str, path: &Path) -> std::io::Result<()> {
    fs::write(path, xml)?;
    tracing::info!("Sitemap written to {}", path.display());
    Ok(())
}
