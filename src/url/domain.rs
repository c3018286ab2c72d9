use url::Url;

/// Extracts the lowercase hostname of a URL, without port
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sumi_audit::url::extract_domain;
///
/// let url = Url::parse("https://Blog.Example.com:8443/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("blog.example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns true when `url` is served by exactly `domain`
pub fn is_same_host(url: &Url, domain: &str) -> bool {
    url.host_str()
        .map(|h| h.eq_ignore_ascii_case(domain))
        .unwrap_or(false)
}
