//! Fact extractors over raw HTML and response headers
//!
//! Every function here is pure and total: malformed input yields `None`,
//! `false`, `0` or an empty list, never a panic or an error.

pub mod misc;
pub mod performance;
pub mod security;
pub mod seo;

pub use misc::{extract_charset, text_to_html_ratio};
pub use performance::{RequestCounts, count_requests, is_text_compression_enabled, page_size_kb};
pub use security::{has_mixed_content, is_hsts_enabled, is_https, is_server_signature_hidden};
pub use seo::{
    Canonical, extract_canonical, extract_hreflang, extract_meta_description, extract_title,
    is_noindex, is_seo_friendly_url,
};
