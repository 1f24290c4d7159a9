//! Link classification and anchor-text checks
//!
//! Internal vs external is a plain string-prefix test against the analyzed
//! page URL, not a scheme/host comparison. Consumers rely on exactly this
//! behavior, including its false negatives for absolute same-site URLs on
//! other paths.

use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};

use crate::config::AnalyzerConfig;
use crate::parser::normalize_whitespace;

static ANCHOR_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("invalid anchor selector"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkRecord {
    pub href: String,
    pub anchor_text: String,
    pub is_internal: bool,
    pub nofollow: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkAnalysis {
    pub links: Vec<LinkRecord>,
    pub internal_count: usize,
    pub external_count: usize,
    pub nofollow_count: usize,
    pub non_descriptive_count: usize,
    pub violations: Vec<String>,
}

/// Internal iff root-relative or prefixed by the exact page URL string
pub fn is_internal_link(href: &str, page_url: &str) -> bool {
    href.starts_with('/') || (!page_url.is_empty() && href.starts_with(page_url))
}

/// Anchor text that is not a generic phrase and is longer than 3 characters
pub fn is_descriptive_anchor(text: &str, generic_phrases: &[String]) -> bool {
    let text = text.trim();
    let generic = generic_phrases
        .iter()
        .any(|phrase| phrase.trim().eq_ignore_ascii_case(text));
    !generic && text.chars().count() > 3
}

/// Classify every anchor with a non-empty `href`
pub fn analyze_links(html: &str, page_url: &str, config: &AnalyzerConfig) -> LinkAnalysis {
    let document = Html::parse_document(html);
    let mut analysis = LinkAnalysis::default();

    for element in document.select(&ANCHOR_SELECTOR) {
        let Some(href) = element
            .value()
            .attr("href")
            .map(str::trim)
            .filter(|href| !href.is_empty())
        else {
            continue;
        };

        let anchor_text = normalize_whitespace(&element.text().collect::<String>());
        let nofollow = element
            .value()
            .attr("rel")
            .is_some_and(|rel| {
                rel.split_ascii_whitespace()
                    .any(|token| token.eq_ignore_ascii_case("nofollow"))
            });
        let is_internal = is_internal_link(href, page_url);

        if is_internal {
            analysis.internal_count += 1;
        } else {
            analysis.external_count += 1;
        }
        if nofollow {
            analysis.nofollow_count += 1;
        }

        if !is_descriptive_anchor(&anchor_text, &config.generic_anchor_phrases) {
            analysis.non_descriptive_count += 1;
            analysis.violations.push(format!(
                "Non-descriptive anchor text \"{}\" for link {}",
                anchor_text, href
            ));
        }
        if !is_internal && !nofollow {
            analysis
                .violations
                .push(format!("External link {} has no rel=\"nofollow\"", href));
        }

        analysis.links.push(LinkRecord {
            href: href.to_string(),
            anchor_text,
            is_internal,
            nofollow,
        });
    }

    analysis
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "https://example.com/blog";

    #[test]
    fn internal_classification_is_prefix_based() {
        assert!(is_internal_link("/about", PAGE));
        assert!(is_internal_link("https://example.com/blog/post-1", PAGE));
        // same host, different path prefix: counted as external
        assert!(!is_internal_link("https://example.com/shop", PAGE));
        assert!(!is_internal_link("https://other.com/", PAGE));
        assert!(!is_internal_link("post-2", PAGE));
        assert!(!is_internal_link("https://other.com", ""));
    }

    #[test]
    fn descriptive_anchor_rules() {
        let phrases = AnalyzerConfig::default().generic_anchor_phrases;
        assert!(!is_descriptive_anchor("Click Here", &phrases));
        assert!(!is_descriptive_anchor(" read more ", &phrases));
        assert!(!is_descriptive_anchor("Details", &phrases));
        assert!(!is_descriptive_anchor("Go", &phrases));
        assert!(!is_descriptive_anchor("abc", &phrases));
        assert!(is_descriptive_anchor("abcd", &phrases));
        assert!(is_descriptive_anchor("Pricing for teams", &phrases));
    }

    #[test]
    fn analyze_links_counts_and_violations() {
        let html = r#"
            <a href="/pricing">Pricing for teams</a>
            <a href="https://example.com/blog/launch">click here</a>
            <a href="https://partner.com/" rel="noopener nofollow">Our partner site</a>
            <a href="https://news.com/story">Industry news</a>
            <a href="">Empty</a>
            <a>No href</a>
        "#;
        let analysis = analyze_links(html, PAGE, &AnalyzerConfig::default());

        assert_eq!(analysis.links.len(), 4);
        assert_eq!(analysis.internal_count, 2);
        assert_eq!(analysis.external_count, 2);
        assert_eq!(analysis.nofollow_count, 1);
        assert_eq!(analysis.non_descriptive_count, 1);
        assert_eq!(analysis.violations.len(), 2);
        assert!(analysis.violations[0].contains("click here"));
        assert!(analysis.violations[1].contains("https://news.com/story"));

        let partner = &analysis.links[2];
        assert!(partner.nofollow);
        assert!(!partner.is_internal);
        assert_eq!(partner.anchor_text, "Our partner site");
    }
}
