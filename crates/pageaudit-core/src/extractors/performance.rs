//! Page weight, request estimate and transfer compression

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::types::Headers;

static RE_RESOURCE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<(link|script|img)\b").expect("invalid resource tag regex"));

static RE_COMPRESSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)gzip|br|deflate").expect("invalid encoding regex"));

/// Estimated HTTP requests by tag type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestCounts {
    pub links: usize,
    pub scripts: usize,
    pub images: usize,
    pub total: usize,
}

/// UTF-8 size of the document in KiB, rounded to 2 decimals
pub fn page_size_kb(html: &str) -> f64 {
    round2(html.len() as f64 / 1024.0)
}

/// Count `<link>`, `<script>` and `<img>` tags in one pass
pub fn count_requests(html: &str) -> RequestCounts {
    let mut counts = RequestCounts::default();
    for cap in RE_RESOURCE_TAG.captures_iter(html) {
        match cap[1].to_ascii_lowercase().as_str() {
            "link" => counts.links += 1,
            "script" => counts.scripts += 1,
            _ => counts.images += 1,
        }
    }
    counts.total = counts.links + counts.scripts + counts.images;
    counts
}

/// `Content-Encoding` names gzip, brotli or deflate
pub fn is_text_compression_enabled(headers: &Headers) -> bool {
    headers
        .get("content-encoding")
        .is_some_and(|encoding| RE_COMPRESSION.is_match(encoding))
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_size_in_kb() {
        assert_eq!(page_size_kb(""), 0.0);
        assert_eq!(page_size_kb(&"a".repeat(1024)), 1.0);
        assert_eq!(page_size_kb(&"a".repeat(1536)), 1.5);
        // multi-byte characters count by encoded length
        assert_eq!(page_size_kb(&"é".repeat(512)), 1.0);
        assert_eq!(page_size_kb(&"a".repeat(100)), 0.1);
    }

    #[test]
    fn request_counts_by_tag() {
        let html = r#"
            <link rel="stylesheet" href="/a.css"><LINK rel="icon" href="/f.ico">
            <script src="/a.js"></script><script>inline()</script>
            <img src="/a.png"><linkset></linkset><imgx>
        "#;
        let counts = count_requests(html);
        assert_eq!(counts.links, 2);
        assert_eq!(counts.scripts, 2);
        assert_eq!(counts.images, 1);
        assert_eq!(counts.total, 5);
    }

    #[test]
    fn compression_from_content_encoding() {
        let headers: Headers = [("content-encoding", "gzip")].into_iter().collect();
        assert!(is_text_compression_enabled(&headers));
        let headers: Headers = [("Content-Encoding", "BR")].into_iter().collect();
        assert!(is_text_compression_enabled(&headers));
        let headers: Headers = [("content-encoding", "identity")].into_iter().collect();
        assert!(!is_text_compression_enabled(&headers));
        assert!(!is_text_compression_enabled(&Headers::new()));
    }
}
