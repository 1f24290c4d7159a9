//! Metrics aggregation
//!
//! Runs every extractor over one content record and assembles the versioned
//! [`MetricsBundle`]. Only the URL is mandatory: every other missing input
//! degrades to a default (logged at warn level) so a partial scrape still
//! yields a complete bundle.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::{AnalyzerConfig, LengthBand};
use crate::error::{Error, Result};
use crate::extractors::misc::{
    document_language, extract_charset, has_favicon, has_open_graph, has_viewport,
    structured_data_types, text_to_html_ratio,
};
use crate::extractors::performance::{
    RequestCounts, count_requests, is_text_compression_enabled, page_size_kb,
};
use crate::extractors::security::{
    SecurityHeaders, has_mixed_content, is_hsts_enabled, is_https, is_server_signature_hidden,
    security_headers,
};
use crate::extractors::seo::{
    Canonical, ImageAltSummary, count_images_missing_alt, extract_canonical, extract_hreflang,
    extract_meta_description, extract_title, is_noindex, is_seo_friendly_url,
};
use crate::headings::{HeadingSummary, extract_headings, summarize};
use crate::links::{LinkAnalysis, analyze_links};
use crate::parser::extract_text;
use crate::reachability::SiteReachability;
use crate::robots_txt::is_path_allowed;
use crate::types::ContentRecord;

/// Schema version stamped on every bundle
pub const METRICS_VERSION: u32 = 1;

/// Where a measured length falls relative to a [`LengthBand`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthClass {
    Missing,
    Short,
    Long,
    Optimal,
}

impl LengthClass {
    /// Classify a trimmed text by character count
    pub fn of(text: Option<&str>, band: LengthBand) -> Self {
        match text.map(|t| t.trim().chars().count()) {
            None | Some(0) => Self::Missing,
            Some(len) if len < band.min => Self::Short,
            Some(len) if len > band.max => Self::Long,
            Some(_) => Self::Optimal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TitleMessage {
    #[serde(rename = "TITLE_MISSING")]
    Missing,
    #[serde(rename = "TITLE_SHORT")]
    Short,
    #[serde(rename = "TITLE_LONG")]
    Long,
    #[serde(rename = "TITLE_OPTIMAL")]
    Optimal,
}

impl From<LengthClass> for TitleMessage {
    fn from(class: LengthClass) -> Self {
        match class {
            LengthClass::Missing => Self::Missing,
            LengthClass::Short => Self::Short,
            LengthClass::Long => Self::Long,
            LengthClass::Optimal => Self::Optimal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DescriptionMessage {
    #[serde(rename = "DESCRIPTION_MISSING")]
    Missing,
    #[serde(rename = "DESCRIPTION_SHORT")]
    Short,
    #[serde(rename = "DESCRIPTION_LONG")]
    Long,
    #[serde(rename = "DESCRIPTION_OPTIMAL")]
    Optimal,
}

impl From<LengthClass> for DescriptionMessage {
    fn from(class: LengthClass) -> Self {
        match class {
            LengthClass::Missing => Self::Missing,
            LengthClass::Short => Self::Short,
            LengthClass::Long => Self::Long,
            LengthClass::Optimal => Self::Optimal,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeoMetrics {
    pub title: Option<String>,
    pub title_length: usize,
    pub title_message: TitleMessage,
    pub meta_description: Option<String>,
    pub meta_description_length: usize,
    pub description_message: DescriptionMessage,
    pub canonical: Canonical,
    pub noindex: bool,
    pub hreflang: Vec<String>,
    pub seo_friendly_url: bool,
    pub headings: HeadingSummary,
    pub images: ImageAltSummary,
    pub links: LinkAnalysis,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityMetrics {
    pub https: bool,
    pub mixed_content: bool,
    pub server_signature_hidden: bool,
    pub hsts_enabled: bool,
    pub headers: SecurityHeaders,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetrics {
    pub page_size_kb: f64,
    pub requests: RequestCounts,
    pub text_compression: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MiscellaneousMetrics {
    pub charset: Option<String>,
    pub text_to_html_ratio: f64,
    pub viewport: bool,
    pub language: Option<String>,
    pub favicon: bool,
    pub open_graph: bool,
    pub structured_data: Vec<String>,
    pub sitemap_found: bool,
    pub robots_txt_found: bool,
    pub crawl_allowed: bool,
}

/// Everything measured for one `(userId, url)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsBundle {
    pub version: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub url: String,
    pub seo: SeoMetrics,
    pub security: SecurityMetrics,
    pub performance: PerformanceMetrics,
    pub miscellaneous: MiscellaneousMetrics,
}

/// Validate the record URL; blank is missing, unparseable is invalid
pub fn validate_url(record: &ContentRecord) -> Result<Url> {
    let raw = record
        .url
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or(Error::MissingUrl)?;
    Url::parse(raw).map_err(|source| Error::InvalidUrl {
        url: raw.to_string(),
        source,
    })
}

/// Compute a full bundle for one content record
///
/// `reachability` carries the result of a sitemap/robots probe, or
/// [`SiteReachability::unknown`] when none was run.
pub fn calculate_metrics(
    record: &ContentRecord,
    reachability: &SiteReachability,
    config: &AnalyzerConfig,
) -> Result<MetricsBundle> {
    let url = validate_url(record)?;
    let page_url = record.url.as_deref().unwrap_or_default().trim();
    let html = record.html();
    let headers = &record.headers;

    if html.trim().is_empty() {
        tracing::warn!(url = page_url, "content record has no HTML; HTML facts use defaults");
    }
    if headers.is_empty() {
        tracing::warn!(url = page_url, "content record has no response headers");
    }

    Ok(MetricsBundle {
        version: METRICS_VERSION,
        user_id: record.user_id.clone(),
        url: page_url.to_string(),
        seo: seo_metrics(record, page_url, config),
        security: SecurityMetrics {
            https: is_https(page_url),
            mixed_content: has_mixed_content(html),
            server_signature_hidden: is_server_signature_hidden(headers),
            hsts_enabled: is_hsts_enabled(headers),
            headers: security_headers(headers),
        },
        performance: PerformanceMetrics {
            page_size_kb: page_size_kb(html),
            requests: count_requests(html),
            text_compression: is_text_compression_enabled(headers),
        },
        miscellaneous: misc_metrics(record, &url, reachability),
    })
}

fn seo_metrics(record: &ContentRecord, page_url: &str, config: &AnalyzerConfig) -> SeoMetrics {
    let html = record.html();

    let title = record
        .metadata_title()
        .map(|t| t.trim().to_string())
        .or_else(|| extract_title(html));
    let meta_description = record
        .metadata_description()
        .map(|d| d.trim().to_string())
        .or_else(|| extract_meta_description(html));

    let title_class = LengthClass::of(title.as_deref(), config.title_length);
    let description_class = LengthClass::of(meta_description.as_deref(), config.description_length);

    let headings = extract_headings(html);

    SeoMetrics {
        title_length: title.as_deref().map_or(0, |t| t.chars().count()),
        title_message: title_class.into(),
        meta_description_length: meta_description.as_deref().map_or(0, |d| d.chars().count()),
        description_message: description_class.into(),
        canonical: extract_canonical(html),
        noindex: is_noindex(html, &record.headers),
        hreflang: extract_hreflang(html),
        seo_friendly_url: is_seo_friendly_url(page_url),
        headings: summarize(&headings, title.as_deref(), config),
        images: count_images_missing_alt(html),
        links: analyze_links(html, page_url, config),
        title,
        meta_description,
    }
}

fn misc_metrics(
    record: &ContentRecord,
    url: &Url,
    reachability: &SiteReachability,
) -> MiscellaneousMetrics {
    let html = record.html();

    let text = match record.text_content.as_deref().filter(|t| !t.trim().is_empty()) {
        Some(text) => text.to_string(),
        None => extract_text(html),
    };

    let crawl_allowed = reachability
        .robots
        .as_ref()
        .is_none_or(|robots| is_path_allowed(url.path(), "*", robots));

    MiscellaneousMetrics {
        charset: extract_charset(html, &record.headers),
        text_to_html_ratio: text_to_html_ratio(&text, html),
        viewport: has_viewport(html),
        language: document_language(html),
        favicon: has_favicon(html, record.favicon.as_deref()),
        open_graph: has_open_graph(html),
        structured_data: structured_data_types(html),
        sitemap_found: reachability.sitemap_found,
        robots_txt_found: reachability.robots_txt_found(),
        crawl_allowed,
    }
}
