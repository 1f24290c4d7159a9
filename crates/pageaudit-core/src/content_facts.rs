//! Structured text facts pulled from a page's DOM
//!
//! The facts record is what the content analyzer reads: tagged text
//! fragments plus a few named zones of the page.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::headings::heading_level;
use crate::parser::normalize_whitespace;

static TEXT_TAG_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("h1, h2, h3, h4, h5, h6, p, li, a, span, div, section, article, footer, blockquote")
        .expect("invalid text tag selector")
});
static PARAGRAPH_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("p").expect("invalid paragraph selector"));
static MAIN_PARAGRAPH_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("main p, article p").expect("invalid main selector"));
static LIST_ITEM_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("li").expect("invalid list item selector"));
static FOOTER_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("footer").expect("invalid footer selector"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagText {
    pub tag: String,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentZones {
    pub introduction: Option<String>,
    pub main_content: Vec<String>,
    pub list_items: Vec<String>,
    pub footer_content: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentFacts {
    pub id: Uuid,
    pub tags: Vec<TagText>,
    pub tag_counts: BTreeMap<String, usize>,
    pub zones: ContentZones,
    pub headings_by_level: BTreeMap<String, Vec<String>>,
}

impl ContentFacts {
    /// Zone text joined by newlines, each paragraph once
    pub fn combined_text(&self) -> String {
        let zones = &self.zones;
        let mut parts: Vec<&str> = Vec::new();
        if let Some(intro) = zones.introduction.as_deref() {
            if !zones.main_content.iter().any(|p| p == intro) {
                parts.push(intro);
            }
        }
        parts.extend(zones.main_content.iter().map(String::as_str));
        parts.extend(zones.list_items.iter().map(String::as_str));
        if let Some(footer) = zones.footer_content.as_deref() {
            parts.push(footer);
        }
        parts.join("\n")
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    normalize_whitespace(&element.text().collect::<String>())
}

fn texts(document: &Html, selector: &Selector) -> Vec<String> {
    document
        .select(selector)
        .map(element_text)
        .filter(|text| !text.is_empty())
        .collect()
}

pub fn extract_content_facts(html: &str) -> ContentFacts {
    let document = Html::parse_document(html);

    let mut tags = Vec::new();
    let mut tag_counts = BTreeMap::new();
    let mut headings_by_level: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for element in document.select(&TEXT_TAG_SELECTOR) {
        let text = element_text(element);
        if text.is_empty() {
            continue;
        }
        let tag = element.value().name().to_ascii_lowercase();
        *tag_counts.entry(tag.clone()).or_insert(0) += 1;
        if heading_level(&tag) > 0 {
            headings_by_level
                .entry(tag.clone())
                .or_default()
                .push(text.clone());
        }
        tags.push(TagText { tag, text });
    }

    let paragraphs = texts(&document, &PARAGRAPH_SELECTOR);
    let mut main_content = texts(&document, &MAIN_PARAGRAPH_SELECTOR);
    if main_content.is_empty() {
        main_content = paragraphs.clone();
    }

    let footer_parts = texts(&document, &FOOTER_SELECTOR);
    let footer_content = (!footer_parts.is_empty()).then(|| footer_parts.join(" "));

    let facts = ContentFacts {
        id: Uuid::new_v4(),
        tags,
        tag_counts,
        zones: ContentZones {
            introduction: paragraphs.into_iter().next(),
            main_content,
            list_items: texts(&document, &LIST_ITEM_SELECTOR),
            footer_content,
        },
        headings_by_level,
    };

    if facts.tags.is_empty() {
        tracing::warn!("no text-bearing elements found in document");
    }
    facts
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <header><p>Site banner</p></header>
          <main>
            <h1>Fast pages</h1>
            <p>Speed   matters for users.</p>
            <h2>Why</h2>
            <p>Slow pages lose visitors.</p>
            <ul><li>Compress assets</li><li>Cache</li><li>   </li></ul>
          </main>
          <footer>Copyright <a href="/legal">Legal</a></footer>
        </body></html>
    "#;

    #[test]
    fn tags_and_counts() {
        let facts = extract_content_facts(PAGE);
        assert_eq!(facts.tag_counts["p"], 3);
        assert_eq!(facts.tag_counts["li"], 2);
        assert_eq!(facts.tag_counts["footer"], 1);
        assert_eq!(facts.tags[0], TagText { tag: "p".into(), text: "Site banner".into() });
        assert!(facts.tags.iter().any(|t| t.tag == "a" && t.text == "Legal"));
    }

    #[test]
    fn zones() {
        let facts = extract_content_facts(PAGE);
        assert_eq!(facts.zones.introduction.as_deref(), Some("Site banner"));
        assert_eq!(
            facts.zones.main_content,
            vec!["Speed matters for users.", "Slow pages lose visitors."]
        );
        assert_eq!(facts.zones.list_items, vec!["Compress assets", "Cache"]);
        assert_eq!(facts.zones.footer_content.as_deref(), Some("Copyright Legal"));
    }

    #[test]
    fn headings_grouped_by_level() {
        let facts = extract_content_facts(PAGE);
        assert_eq!(facts.headings_by_level["h1"], vec!["Fast pages"]);
        assert_eq!(facts.headings_by_level["h2"], vec!["Why"]);
        assert!(!facts.headings_by_level.contains_key("h3"));
    }

    #[test]
    fn main_content_falls_back_to_all_paragraphs() {
        let facts = extract_content_facts("<div><p>One</p><p>Two</p></div>");
        assert_eq!(facts.zones.main_content, vec!["One", "Two"]);
        assert_eq!(facts.zones.introduction.as_deref(), Some("One"));
        // the introduction is already part of the main content
        assert_eq!(facts.combined_text(), "One\nTwo");
    }

    #[test]
    fn combined_text_includes_every_zone() {
        let facts = extract_content_facts(PAGE);
        assert_eq!(
            facts.combined_text(),
            "Site banner\nSpeed matters for users.\nSlow pages lose visitors.\nCompress assets\nCache\nCopyright Legal"
        );
    }

    #[test]
    fn empty_document_and_fresh_ids() {
        let a = extract_content_facts("");
        let b = extract_content_facts("");
        assert!(a.tags.is_empty());
        assert_eq!(a.zones, ContentZones::default());
        assert_eq!(a.combined_text(), "");
        assert_ne!(a.id, b.id);
    }
}
