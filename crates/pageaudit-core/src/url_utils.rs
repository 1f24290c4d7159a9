use url::Url;

/// Placeholder base used to resolve root-relative paths
const PLACEHOLDER_BASE: &str = "http://placeholder.invalid/";

/// Normalize a URL to its origin (scheme + host + optional port).
///
/// Falls back to trimming trailing slashes if the input cannot be parsed.
pub fn normalize_origin(input: &str) -> String {
    match Url::parse(input) {
        Ok(parsed) => parsed
            .origin()
            .ascii_serialization()
            .trim_end_matches('/')
            .to_string(),
        Err(_) => input.trim_end_matches('/').to_string(),
    }
}

/// `{origin}/{path}` for the origin of `page_url`
pub fn origin_url(page_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        normalize_origin(page_url),
        path.trim_start_matches('/')
    )
}

/// Parse an absolute URL, or a root-relative path against a placeholder base.
///
/// Protocol-relative input (`//host/...`) resolves to that host, as a
/// browser would.
pub fn parse_lenient(input: &str) -> Option<Url> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    match Url::parse(input) {
        Ok(url) => Some(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(PLACEHOLDER_BASE)
            .and_then(|base| base.join(input))
            .ok(),
        Err(_) => None,
    }
}
