//! Heading extraction, hierarchy and structure checks
//!
//! Headings are read from a real parse tree so nesting and entities are
//! handled the way a browser would.

use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::config::AnalyzerConfig;
use crate::parser::normalize_whitespace;

static HEADING_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h1, h2, h3, h4, h5, h6").expect("invalid heading selector"));

/// A heading as it appears in the document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadingRecord {
    pub tag: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
}

impl HeadingRecord {
    pub fn new(tag: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            text: text.into(),
            id: None,
            class: None,
        }
    }

    /// Numeric suffix of the tag (`h3` -> 3); 0 for anything else
    pub fn level(&self) -> u8 {
        heading_level(&self.tag)
    }
}

/// A heading linked to the heading directly above it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadingNode {
    pub tag: String,
    pub text: String,
    pub level: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

/// Heading counts per level, h1 first
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadingCounts {
    pub h1: usize,
    pub h2: usize,
    pub h3: usize,
    pub h4: usize,
    pub h5: usize,
    pub h6: usize,
}

impl HeadingCounts {
    fn bump(&mut self, level: u8) {
        match level {
            1 => self.h1 += 1,
            2 => self.h2 += 1,
            3 => self.h3 += 1,
            4 => self.h4 += 1,
            5 => self.h5 += 1,
            6 => self.h6 += 1,
            _ => {}
        }
    }

    pub fn total(&self) -> usize {
        self.h1 + self.h2 + self.h3 + self.h4 + self.h5 + self.h6
    }
}

/// Level jumps that skip one or more heading levels
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SequenceCheck {
    pub has_issues: bool,
    pub skipped_levels: Vec<String>,
    pub issues: Vec<String>,
}

/// Heading roll-up used by the SEO section of the metrics bundle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadingSummary {
    pub counts: HeadingCounts,
    pub multiple_h1: bool,
    pub missing_h1: bool,
    pub h1_matches_title: bool,
    pub sequence: SequenceCheck,
    pub duplicates: Vec<String>,
    pub too_short: Vec<String>,
    pub too_long: Vec<String>,
}

pub fn heading_level(tag: &str) -> u8 {
    let tag = tag.trim();
    match tag.as_bytes() {
        [b'h' | b'H', d @ b'1'..=b'6'] => d - b'0',
        _ => 0,
    }
}

/// All headings in document order
pub fn extract_headings(html: &str) -> Vec<HeadingRecord> {
    let document = Html::parse_document(html);
    document
        .select(&HEADING_SELECTOR)
        .map(|element| {
            let attrs = element.value();
            HeadingRecord {
                tag: attrs.name().to_ascii_lowercase(),
                text: normalize_whitespace(&element.text().collect::<String>()),
                id: attrs.attr("id").map(str::to_string),
                class: attrs.attr("class").map(str::to_string),
            }
        })
        .collect()
}

/// Link each heading to the previous one when it goes one or more levels deeper
///
/// Only the immediately preceding heading is ever used as a parent; this is
/// not an ancestor chain.
pub fn build_hierarchy(headings: &[HeadingRecord]) -> Vec<HeadingNode> {
    let mut nodes = Vec::with_capacity(headings.len());
    let mut last_level = 0u8;
    let mut previous_text: Option<&str> = None;

    for heading in headings {
        let level = heading.level();
        let parent = if level > last_level {
            previous_text.map(str::to_string)
        } else {
            None
        };

        nodes.push(HeadingNode {
            tag: heading.tag.clone(),
            text: heading.text.clone(),
            level,
            parent,
        });

        last_level = level;
        previous_text = Some(heading.text.as_str());
    }

    nodes
}

/// Flag consecutive headings that jump more than one level deeper
pub fn check_sequence(headings: &[HeadingRecord]) -> SequenceCheck {
    let levels: Vec<u8> = headings
        .iter()
        .map(HeadingRecord::level)
        .filter(|level| *level > 0)
        .collect();

    let mut skipped = BTreeSet::new();
    let mut issues = Vec::new();

    for window in levels.windows(2) {
        let (prev, curr) = (window[0], window[1]);
        if curr > prev + 1 {
            skipped.extend(prev + 1..curr);
            issues.push(format!(
                "Heading level skip: <h{}> follows <h{}> (missing <h{}>)",
                curr,
                prev,
                prev + 1
            ));
        }
    }

    SequenceCheck {
        has_issues: !issues.is_empty(),
        skipped_levels: skipped.into_iter().map(|l| format!("h{l}")).collect(),
        issues,
    }
}

/// Heading roll-up against the page title and configured length bounds
pub fn summarize(
    headings: &[HeadingRecord],
    title: Option<&str>,
    config: &AnalyzerConfig,
) -> HeadingSummary {
    let mut counts = HeadingCounts::default();
    for heading in headings {
        counts.bump(heading.level());
    }

    let h1_matches_title = match (
        title.map(str::trim),
        headings.iter().find(|h| h.level() == 1),
    ) {
        (Some(title), Some(h1)) => !title.is_empty() && h1.text.trim() == title,
        _ => false,
    };

    let bounds = config.heading_length;
    let mut too_short = Vec::new();
    let mut too_long = Vec::new();
    for heading in headings {
        let len = heading.text.trim().chars().count();
        if len < bounds.min {
            too_short.push(heading.text.clone());
        } else if len > bounds.max {
            too_long.push(heading.text.clone());
        }
    }

    HeadingSummary {
        counts,
        multiple_h1: counts.h1 > 1,
        missing_h1: counts.h1 == 0,
        h1_matches_title,
        sequence: check_sequence(headings),
        duplicates: duplicate_texts(headings),
        too_short,
        too_long,
    }
}

fn duplicate_texts(headings: &[HeadingRecord]) -> Vec<String> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    let mut duplicates = Vec::new();
    for heading in headings {
        let text = heading.text.trim();
        if text.is_empty() {
            continue;
        }
        let count = seen.entry(text).or_insert(0);
        *count += 1;
        if *count == 2 {
            duplicates.push(text.to_string());
        }
    }
    duplicates
}
