//! On-page SEO facts: title, meta description, canonical, robots directives,
//! hreflang, URL shape and image alt coverage.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::parser::{decode_entities, normalize_whitespace, start_tags};
use crate::types::Headers;
use crate::url_utils::parse_lenient;

static RE_TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<title\b[^>]*>(.*?)</title\s*>").expect("invalid title regex"));

static RE_SLUG_SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").expect("invalid slug regex"));

const MIN_PATH_LENGTH: usize = 3;
const MAX_PATH_LENGTH: usize = 2048;

/// Canonical link presence and target
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Canonical {
    pub present: bool,
    pub url: Option<String>,
}

/// Image alt attribute coverage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageAltSummary {
    pub total: usize,
    pub missing_alt: usize,
    pub empty_alt: usize,
}

/// Text of the first `<title>`, whitespace-normalized
///
/// Empty titles are reported as absent.
pub fn extract_title(html: &str) -> Option<String> {
    let raw = RE_TITLE.captures(html)?.get(1)?.as_str();
    let title = normalize_whitespace(&decode_entities(raw));
    if title.is_empty() { None } else { Some(title) }
}

/// Content of `<meta name="description">`, whitespace-normalized
pub fn extract_meta_description(html: &str) -> Option<String> {
    meta_content(html, "description")
        .map(|content| normalize_whitespace(&content))
        .filter(|content| !content.is_empty())
}

/// `content` of the first `<meta name=...>` with the given name
pub(crate) fn meta_content(html: &str, name: &str) -> Option<String> {
    start_tags(html, "meta")
        .into_iter()
        .find(|tag| {
            tag.attr("name")
                .is_some_and(|n| n.trim().eq_ignore_ascii_case(name))
        })
        .and_then(|tag| tag.attr("content").map(str::to_string))
}

/// First `<link rel="canonical">`
pub fn extract_canonical(html: &str) -> Canonical {
    match start_tags(html, "link")
        .into_iter()
        .find(|tag| tag.attr_has_token("rel", "canonical"))
    {
        Some(tag) => Canonical {
            present: true,
            url: tag
                .attr("href")
                .map(str::trim)
                .filter(|href| !href.is_empty())
                .map(str::to_string),
        },
        None => Canonical::default(),
    }
}

/// Whether a robots meta tag or the `X-Robots-Tag` header says `noindex`
pub fn is_noindex(html: &str, headers: &Headers) -> bool {
    let meta_noindex = start_tags(html, "meta")
        .iter()
        .filter(|tag| {
            tag.attr("name")
                .is_some_and(|n| n.trim().eq_ignore_ascii_case("robots"))
        })
        .filter_map(|tag| tag.attr("content"))
        .any(has_noindex_token);

    let header_noindex = headers.get("x-robots-tag").is_some_and(has_noindex_token);

    meta_noindex || header_noindex
}

fn has_noindex_token(directives: &str) -> bool {
    directives
        .split(|c: char| c.is_whitespace() || c == ',')
        .any(|token| token.eq_ignore_ascii_case("noindex"))
}

/// `hreflang` values of `<link>` tags in document order, duplicates kept
pub fn extract_hreflang(html: &str) -> Vec<String> {
    start_tags(html, "link")
        .iter()
        .filter_map(|tag| tag.attr("hreflang"))
        .map(str::trim)
        .filter(|lang| !lang.is_empty())
        .map(str::to_string)
        .collect()
}

/// Whether the URL path is lowercase, hyphen-delimited and of sane length
///
/// Accepts absolute URLs or root-relative paths. Anything unparseable is
/// simply not SEO-friendly.
pub fn is_seo_friendly_url(url_or_path: &str) -> bool {
    let Some(url) = parse_lenient(url_or_path) else {
        return false;
    };
    let path = url.path();

    if !(MIN_PATH_LENGTH..=MAX_PATH_LENGTH).contains(&path.len()) {
        return false;
    }

    let segments: Vec<&str> = path
        .strip_prefix('/')
        .unwrap_or(path)
        .split('/')
        .collect();
    let last = segments.len() - 1;
    segments.iter().enumerate().all(|(i, segment)| {
        if segment.is_empty() {
            // only a trailing slash may leave an empty segment
            i == last && i > 0
        } else {
            RE_SLUG_SEGMENT.is_match(segment)
        }
    })
}

/// Count `<img>` tags and how many lack a usable `alt`
pub fn count_images_missing_alt(html: &str) -> ImageAltSummary {
    let mut summary = ImageAltSummary::default();
    for tag in start_tags(html, "img") {
        summary.total += 1;
        match tag.attr("alt") {
            None => summary.missing_alt += 1,
            Some(alt) if alt.trim().is_empty() => summary.empty_alt += 1,
            Some(_) => {}
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_is_trimmed_and_normalized() {
        let html = "<html><head><title lang=\"en\">\n   My   Page \n Title  </title></head></html>";
        assert_eq!(extract_title(html).as_deref(), Some("My Page Title"));
    }

    #[test]
    fn title_with_entities() {
        let html = "<TITLE>Fish &amp; Chips</TITLE>";
        assert_eq!(extract_title(html).as_deref(), Some("Fish & Chips"));
    }

    #[test]
    fn missing_or_empty_title_is_none() {
        assert_eq!(extract_title("<html><head></head></html>"), None);
        assert_eq!(extract_title("<title>   </title>"), None);
        assert_eq!(extract_title(""), None);
    }

    #[test]
    fn meta_description_any_attribute_order() {
        let a = r#"<meta name="description" content="First  description">"#;
        let b = "<meta\n content='Second\n description'\n NAME=\"Description\" />";
        assert_eq!(extract_meta_description(a).as_deref(), Some("First description"));
        assert_eq!(extract_meta_description(b).as_deref(), Some("Second description"));
        assert_eq!(extract_meta_description("<meta name=\"keywords\" content=\"x\">"), None);
    }

    #[test]
    fn canonical_is_case_insensitive() {
        let html = r#"<LINK HREF="https://example.com/page" REL="Canonical">"#;
        let canonical = extract_canonical(html);
        assert!(canonical.present);
        assert_eq!(canonical.url.as_deref(), Some("https://example.com/page"));

        let missing = extract_canonical(r#"<link rel="stylesheet" href="/a.css">"#);
        assert_eq!(missing, Canonical::default());
    }

    #[test]
    fn noindex_from_meta_token() {
        let headers = Headers::new();
        assert!(is_noindex(r#"<meta name="robots" content="noindex, nofollow">"#, &headers));
        assert!(is_noindex(r#"<meta content="NOINDEX" name="ROBOTS">"#, &headers));
        assert!(!is_noindex(r#"<meta name="robots" content="index,follow">"#, &headers));
        // token must stand alone
        assert!(!is_noindex(r#"<meta name="robots" content="noindexer">"#, &headers));
    }

    #[test]
    fn noindex_from_header() {
        let headers: Headers = [("X-Robots-Tag", "googlebot: noindex")].into_iter().collect();
        assert!(is_noindex("", &headers));

        let headers: Headers = [("X-Robots-Tag", "nosnippet")].into_iter().collect();
        assert!(!is_noindex("", &headers));
    }

    #[test]
    fn hreflang_preserves_order_and_duplicates() {
        let html = r#"
            <link rel="alternate" hreflang="en" href="/en">
            <link rel="alternate" hreflang="de" href="/de">
            <link rel="alternate" hreflang="en" href="/en-2">
            <link rel="stylesheet" href="/a.css">
        "#;
        assert_eq!(extract_hreflang(html), vec!["en", "de", "en"]);
    }

    #[test]
    fn seo_friendly_paths() {
        assert!(is_seo_friendly_url("/blog/my-post"));
        assert!(is_seo_friendly_url("https://example.com/blog/my-post/"));
        assert!(!is_seo_friendly_url("/Blog/My_Post"));
        assert!(!is_seo_friendly_url("//double-slash"));
        assert!(!is_seo_friendly_url("https://example.com/a//b"));
        assert!(!is_seo_friendly_url("https://example.com//double-slash"));
        assert!(!is_seo_friendly_url("https://example.com///my-post"));
        assert!(!is_seo_friendly_url("/my--post"));
        assert!(!is_seo_friendly_url("/-post"));
        assert!(!is_seo_friendly_url("/"));
        assert!(!is_seo_friendly_url("https://example.com"));
        assert!(!is_seo_friendly_url("http://[broken"));
        assert!(!is_seo_friendly_url(""));
    }

    #[test]
    fn seo_friendly_path_length_bounds() {
        assert!(is_seo_friendly_url("/ab"));
        let long = format!("/{}", "a".repeat(2047));
        assert!(is_seo_friendly_url(&long));
        let too_long = format!("/{}", "a".repeat(2048));
        assert!(!is_seo_friendly_url(&too_long));
    }

    #[test]
    fn image_alt_summary() {
        let html = r#"<img src="a.png" alt="A cat"><img src="b.png"><img src="c.png" alt="">"#;
        let summary = count_images_missing_alt(html);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.missing_alt, 1);
        assert_eq!(summary.empty_alt, 1);
    }
}
