//! Transport and header hygiene signals

use serde::{Deserialize, Serialize};

use crate::types::Headers;
use crate::url_utils::parse_lenient;

/// Hardening headers reported individually
pub const HARDENING_HEADERS: &[&str] = &[
    "content-security-policy",
    "x-frame-options",
    "x-content-type-options",
    "referrer-policy",
    "permissions-policy",
];

/// Presence of each hardening header
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityHeaders {
    pub present: Vec<String>,
    pub missing: Vec<String>,
}

/// `true` iff the URL scheme is exactly `https`
pub fn is_https(url: &str) -> bool {
    parse_lenient(url).is_some_and(|u| u.scheme() == "https")
}

/// Heuristic: the document references both `http://` and `https://` URLs.
///
/// This is a substring scan, not an active/passive mixed-content audit.
pub fn has_mixed_content(html: &str) -> bool {
    html.contains("http://") && html.contains("https://")
}

/// Neither `Server` nor `X-Powered-By` is disclosed
pub fn is_server_signature_hidden(headers: &Headers) -> bool {
    !headers.contains("server") && !headers.contains("x-powered-by")
}

/// `Strict-Transport-Security` is present
pub fn is_hsts_enabled(headers: &Headers) -> bool {
    headers.contains("strict-transport-security")
}

pub fn security_headers(headers: &Headers) -> SecurityHeaders {
    let (present, missing): (Vec<&str>, Vec<&str>) = HARDENING_HEADERS
        .iter()
        .copied()
        .partition(|name| headers.contains(name));

    SecurityHeaders {
        present: present.into_iter().map(String::from).collect(),
        missing: missing.into_iter().map(String::from).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn https_requires_exact_scheme() {
        assert!(is_https("https://example.com"));
        assert!(is_https("HTTPS://example.com/path"));
        assert!(!is_https("http://example.com"));
        assert!(!is_https("/relative/path"));
        assert!(!is_https("not a url"));
    }

    #[test]
    fn mixed_content_needs_both_schemes() {
        assert!(!has_mixed_content(r#"<img src="https://cdn.example.com/a.png">"#));
        assert!(has_mixed_content(
            r#"<img src="https://cdn.example.com/a.png"><script src="http://old.example.com/x.js"></script>"#
        ));
        assert!(!has_mixed_content(r#"<a href="http://example.com">x</a>"#));
        assert!(!has_mixed_content(""));
    }

    #[test]
    fn server_signature() {
        assert!(is_server_signature_hidden(&Headers::new()));
        let headers: Headers = [("Server", "nginx/1.25")].into_iter().collect();
        assert!(!is_server_signature_hidden(&headers));
        let headers: Headers = [("X-Powered-By", "PHP/8.2")].into_iter().collect();
        assert!(!is_server_signature_hidden(&headers));
    }

    #[test]
    fn hsts_header() {
        let headers: Headers = [("Strict-Transport-Security", "max-age=63072000")]
            .into_iter()
            .collect();
        assert!(is_hsts_enabled(&headers));
        assert!(!is_hsts_enabled(&Headers::new()));
    }

    #[test]
    fn hardening_headers_partition() {
        let headers: Headers = [("X-Frame-Options", "DENY"), ("Content-Security-Policy", "default-src 'self'")]
            .into_iter()
            .collect();
        let report = security_headers(&headers);
        assert_eq!(report.present, vec!["content-security-policy", "x-frame-options"]);
        assert_eq!(report.missing.len(), 3);
    }
}
