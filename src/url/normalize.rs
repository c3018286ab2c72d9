use crate::{UrlError, UrlResult};
use url::Url;

/// Tracking query parameters removed during normalization
const TRACKING_PARAMS: &[&str] = &["fbclid", "gclid", "mc_eid"];

/// Scheme assumed when the input carries none
const DEFAULT_SCHEME: &str = "https://";

/// Normalizes a URL, resolving it against `base` when one is given
///
/// # Normalization Steps
///
/// 1. Without a base, prefix `https://` when the input has no scheme
/// 2. Parse (or join onto the base); reject if malformed
/// 3. Accept only http and https
/// 4. Require a host (lowercased by the parser)
/// 5. Remove the fragment
/// 6. Drop tracking query parameters and an empty `?`
///
/// The remaining query segments keep their order and their encoding as written,
/// so the URL that is fetched is the one the page linked.
///
/// Dot segments are removed and an empty path becomes `/` during parsing.
///
/// # Examples
///
/// ```
/// use sumi_audit::url::normalize_url;
///
/// let url = normalize_url("EXAMPLE.com/page?utm_source=x#top", None).unwrap();
/// assert_eq!(url.as_str(), "https://example.com/page");
/// ```
pub fn normalize_url(input: &str, base: Option<&Url>) -> UrlResult<Url> {
    let input = input.trim();
    if input.is_empty() {
        return Err(UrlError::Parse("empty URL".to_string()));
    }

    let mut url = match base {
        Some(base) => base.join(input),
        None if input.contains("://") => Url::parse(input),
        None => Url::parse(&format!("{}{}", DEFAULT_SCHEME, input)),
    }
    .map_err(|e| UrlError::Parse(format!("{}: {}", input, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => {}
        _ => return Err(UrlError::MissingDomain),
    }

    url.set_fragment(None);

    if let Some(query) = strip_tracking_params(&url) {
        url.set_query(query.as_deref());
    }

    Ok(url)
}

/// Rebuilds the raw query without tracking parameters
///
/// Returns `None` when the query is to be left untouched, `Some(None)` when
/// nothing remains of it.
fn strip_tracking_params(url: &Url) -> Option<Option<String>> {
    let query = url.query()?;
    if query.is_empty() {
        return Some(None);
    }

    let segments: Vec<&str> = query.split('&').collect();
    let kept: Vec<&str> = segments
        .iter()
        .copied()
        .filter(|segment| !is_tracking_param(segment_key(segment)))
        .collect();

    if kept.len() == segments.len() {
        return None;
    }

    let kept: Vec<&str> = kept.into_iter().filter(|s| !s.is_empty()).collect();
    if kept.is_empty() {
        Some(None)
    } else {
        Some(Some(kept.join("&")))
    }
}

/// Key part of a raw `key=value` query segment
fn segment_key(segment: &str) -> &str {
    segment.split_once('=').map_or(segment, |(key, _)| key)
}

fn is_tracking_param(key: &str) -> bool {
    key.starts_with("utm_") || TRACKING_PARAMS.contains(&key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scheme_added() {
        let result = normalize_url("example.com/about", None).unwrap();
        assert_eq!(result.as_str(), "https://example.com/about");
    }

    #[test]
    fn test_http_kept() {
        let result = normalize_url("http://example.com/page", None).unwrap();
        assert_eq!(result.as_str(), "http://example.com/page");
    }

    #[test]
    fn test_host_with_port_without_scheme() {
        let result = normalize_url("localhost:8080/x", None).unwrap();
        assert_eq!(result.as_str(), "https://localhost:8080/x");
    }

    #[test]
    fn test_relative_resolution() {
        let base = Url::parse("https://example.com/blog/post").unwrap();
        let result = normalize_url("../about", Some(&base)).unwrap();
        assert_eq!(result.as_str(), "https://example.com/about");

        let result = normalize_url("//cdn.example.org/lib.js", Some(&base)).unwrap();
        assert_eq!(result.as_str(), "https://cdn.example.org/lib.js");
    }

    #[test]
    fn test_fragment_removed() {
        let result = normalize_url("https://example.com/page#section", None).unwrap();
        assert_eq!(result.as_str(), "https://example.com/page");
    }

    #[test]
    fn test_lowercase_host_keeps_path_case() {
        let result = normalize_url("https://EXAMPLE.COM/Page", None).unwrap();
        assert_eq!(result.as_str(), "https://example.com/Page");
    }

    #[test]
    fn test_empty_path_becomes_root() {
        let result = normalize_url("https://example.com", None).unwrap();
        assert_eq!(result.as_str(), "https://example.com/");
    }

    #[test]
    fn test_tracking_params_removed() {
        let result = normalize_url(
            "https://example.com/page?keep=yes&utm_medium=email&another=value&fbclid=123",
            None,
        )
        .unwrap();
        assert_eq!(result.as_str(), "https://example.com/page?keep=yes&another=value");

        let result = normalize_url("https://example.com/page?utm_source=a&gclid=c", None).unwrap();
        assert_eq!(result.as_str(), "https://example.com/page");
    }

    #[test]
    fn test_query_kept_as_written() {
        for input in [
            "https://example.com/p?flag",
            "https://example.com/p?x=%E9",
            "https://example.com/p?a=1;b=2",
            "https://example.com/p?b=2&a=1",
            "https://example.com/p?q=a+b&r=%20",
        ] {
            assert_eq!(normalize_url(input, None).unwrap().as_str(), input);
        }
    }

    #[test]
    fn test_query_encoding_kept_when_tracking_removed() {
        let result =
            normalize_url("https://example.com/p?flag&utm_source=x&x=%E9&a=1;b=2", None).unwrap();
        assert_eq!(result.as_str(), "https://example.com/p?flag&x=%E9&a=1;b=2");
    }

    #[test]
    fn test_empty_query_dropped() {
        let result = normalize_url("https://example.com/p?", None).unwrap();
        assert_eq!(result.as_str(), "https://example.com/p");
    }

    #[test]
    fn test_invalid_scheme() {
        let result = normalize_url("ftp://example.com/file", None);
        assert!(matches!(result, Err(UrlError::InvalidScheme(_))));
    }

    #[test]
    fn test_malformed_url() {
        assert!(normalize_url("not a url", None).is_err());
        assert!(normalize_url("", None).is_err());
        assert!(normalize_url("https://exa mple.com/", None).is_err());
    }
}
