//! Miscellaneous document facts: charset, text ratio, viewport, language,
//! favicon, Open Graph and structured data.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value as JsonValue;
use std::collections::BTreeSet;

use crate::extractors::performance::round2;
use crate::parser::{extract_json_ld_blocks, start_tags};
use crate::types::Headers;

static RE_CHARSET_PARAM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)charset\s*=\s*["']?([a-z0-9_:.\-]+)"#).expect("invalid charset regex")
});

static RE_HTML_LANG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<html\b[^>]*?\blang\s*=\s*["']?([a-z0-9\-_]+)"#).expect("invalid lang regex")
});

/// Declared character set, upper-cased
///
/// Checks `<meta charset>`, then the `http-equiv` content type, then the
/// `Content-Type` response header.
pub fn extract_charset(html: &str, headers: &Headers) -> Option<String> {
    let metas = start_tags(html, "meta");

    let from_meta = metas
        .iter()
        .find_map(|tag| tag.attr("charset").map(str::trim).filter(|c| !c.is_empty()).map(str::to_string))
        .or_else(|| {
            metas
                .iter()
                .filter(|tag| {
                    tag.attr("http-equiv")
                        .is_some_and(|v| v.trim().eq_ignore_ascii_case("content-type"))
                })
                .find_map(|tag| tag.attr("content").and_then(charset_param))
        });

    from_meta
        .or_else(|| headers.get("content-type").and_then(charset_param))
        .map(|charset| charset.to_ascii_uppercase())
}

fn charset_param(value: &str) -> Option<String> {
    RE_CHARSET_PARAM
        .captures(value)
        .map(|cap| cap[1].to_string())
}

/// Trimmed text length over trimmed HTML length, clamped to `[0, 1]`
pub fn text_to_html_ratio(text: &str, html: &str) -> f64 {
    let html_len = html.trim().chars().count();
    if html_len == 0 {
        return 0.0;
    }
    let text_len = text.trim().chars().count();
    round2((text_len as f64 / html_len as f64).clamp(0.0, 1.0))
}

/// A `<meta name="viewport">` is declared
pub fn has_viewport(html: &str) -> bool {
    start_tags(html, "meta").iter().any(|tag| {
        tag.attr("name")
            .is_some_and(|n| n.trim().eq_ignore_ascii_case("viewport"))
    })
}

/// `lang` attribute of the `<html>` element
pub fn document_language(html: &str) -> Option<String> {
    RE_HTML_LANG
        .captures(html)
        .map(|cap| cap[1].to_string())
}

/// The scraper found a favicon, or the document links one
pub fn has_favicon(html: &str, favicon: Option<&str>) -> bool {
    if favicon.is_some_and(|f| !f.trim().is_empty()) {
        return true;
    }
    start_tags(html, "link")
        .iter()
        .any(|tag| tag.attr_has_token("rel", "icon") || tag.attr_has_token("rel", "apple-touch-icon"))
}

/// Any `og:*` meta property is declared
pub fn has_open_graph(html: &str) -> bool {
    start_tags(html, "meta").iter().any(|tag| {
        tag.attr("property")
            .is_some_and(|p| p.trim().to_ascii_lowercase().starts_with("og:"))
    })
}

/// Distinct schema types declared in JSON-LD blocks, sorted
///
/// Blocks that fail to parse are skipped with a warning.
pub fn structured_data_types(html: &str) -> Vec<String> {
    let mut types = BTreeSet::new();
    for block in extract_json_ld_blocks(html) {
        match serde_json::from_str::<JsonValue>(&block) {
            Ok(value) => collect_types(&value, &mut types),
            Err(e) => tracing::warn!(error = %e, "skipping unparseable JSON-LD block"),
        }
    }
    types.into_iter().collect()
}

fn collect_types(value: &JsonValue, types: &mut BTreeSet<String>) {
    match value {
        JsonValue::Object(map) => {
            match map.get("@type") {
                Some(JsonValue::String(s)) => {
                    types.insert(shorten_type(s));
                }
                Some(JsonValue::Array(items)) => {
                    for item in items.iter().filter_map(JsonValue::as_str) {
                        types.insert(shorten_type(item));
                    }
                }
                _ => {}
            }
            if let Some(graph) = map.get("@graph") {
                collect_types(graph, types);
            }
        }
        JsonValue::Array(items) => {
            for item in items {
                collect_types(item, types);
            }
        }
        _ => {}
    }
}

fn shorten_type(iri: &str) -> String {
    iri.rsplit(['/', '#']).next().unwrap_or(iri).to_string()
}
