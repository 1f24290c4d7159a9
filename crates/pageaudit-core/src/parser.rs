//! Low-level HTML scanning helpers shared by the extractors
//!
//! Start tags are located with regexes and their attributes parsed in any
//! order and any quoting style. Anything that needs real nesting (text
//! content, headings, links) goes through `scraper` instead.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};

static RE_START_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<([a-z][a-z0-9-]*)\b((?:[^>\x22']|\x22[^\x22]*\x22|'[^']*')*)/?>")
        .expect("invalid start tag regex")
});

static RE_ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)([^\s"'<>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#)
        .expect("invalid attribute regex")
});

static RE_WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("invalid whitespace regex"));

static SCRIPT_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("script").expect("invalid script selector"));

static BODY_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("body").expect("invalid body selector"));

/// A start tag with its attributes in source order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartTag {
    pub name: String,
    pub attributes: Vec<(String, String)>,
}

impl StartTag {
    /// Attribute value by case-insensitive name
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Whether a space-separated attribute (like `rel`) contains `token`
    pub fn attr_has_token(&self, name: &str, token: &str) -> bool {
        self.attr(name)
            .map(|value| {
                value
                    .split_ascii_whitespace()
                    .any(|t| t.eq_ignore_ascii_case(token))
            })
            .unwrap_or(false)
    }
}

/// All start tags named `name` (case-insensitive), in document order
pub fn start_tags(html: &str, name: &str) -> Vec<StartTag> {
    RE_START_TAG
        .captures_iter(html)
        .filter(|cap| cap[1].eq_ignore_ascii_case(name))
        .map(|cap| StartTag {
            name: cap[1].to_ascii_lowercase(),
            attributes: parse_attributes(cap.get(2).map_or("", |m| m.as_str())),
        })
        .collect()
}

/// Parse the attribute section of a start tag
pub fn parse_attributes(source: &str) -> Vec<(String, String)> {
    RE_ATTRIBUTE
        .captures_iter(source)
        .map(|cap| {
            let value = cap
                .get(2)
                .or_else(|| cap.get(3))
                .or_else(|| cap.get(4))
                .map(|m| decode_entities(m.as_str()))
                .unwrap_or_default();
            (cap[1].to_ascii_lowercase(), value)
        })
        .collect()
}

/// Collapse whitespace runs to single spaces and trim
pub fn normalize_whitespace(text: &str) -> String {
    RE_WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

/// Decode the handful of entities that show up in titles and attributes
pub fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Extract JSON-LD script blocks from HTML
pub fn extract_json_ld_blocks(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    document
        .select(&SCRIPT_SELECTOR)
        .filter_map(|element| {
            let script_type = element
                .value()
                .attr("type")
                .map(|t| t.trim().to_ascii_lowercase())
                .unwrap_or_default();

            // Use contains() to catch variations like "application/ld+json; charset=utf-8"
            if script_type.contains("ld+json") {
                let text = element.text().collect::<String>().trim().to_string();
                if text.is_empty() { None } else { Some(text) }
            } else {
                None
            }
        })
        .collect()
}

/// Sanitize HTML by removing script, style, and other non-visible elements
pub fn sanitize_html(html: &str) -> String {
    static RE_TAG_BLOCKS: Lazy<Vec<Regex>> = Lazy::new(|| {
        [
            r"(?is)<script[^>]*?>[\s\S]*?</script>",
            r"(?is)<style[^>]*?>[\s\S]*?</style>",
            r"(?is)<noscript[^>]*?>[\s\S]*?</noscript>",
            r"(?is)<template[^>]*?>[\s\S]*?</template>",
        ]
        .into_iter()
        .map(|pattern| Regex::new(pattern).expect("invalid block regex"))
        .collect()
    });
    static RE_COMMENT: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?is)<!--.*?-->").expect("invalid comment regex"));

    let mut clean = html.to_string();
    for re in RE_TAG_BLOCKS.iter() {
        clean = re.replace_all(&clean, "").into_owned();
    }

    RE_COMMENT.replace_all(&clean, "").into_owned()
}

/// Visible text of the document body with whitespace normalized
pub fn extract_text(html: &str) -> String {
    let document = Html::parse_document(&sanitize_html(html));
    let text = match document.select(&BODY_SELECTOR).next() {
        Some(body) => body.text().collect::<Vec<_>>().join(" "),
        None => document.root_element().text().collect::<Vec<_>>().join(" "),
    };
    normalize_whitespace(&text)
}
