//! Plain-text summaries for the terminal

use std::fmt::Write as FmtWrite;

use pageaudit_core::audit::CategorizedMetric;
use pageaudit_core::content::ContentAnalysis;
use pageaudit_core::headings::HeadingNode;
use pageaudit_core::{CategorizedAudit, MetricsBundle};
use serde::Serialize;

const DIVIDER: &str = "─────────────────────────────────────────────────────────────";
const LABEL_WIDTH: usize = 20;
const MAX_LISTED: usize = 10;

/// Everything reported for one page
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageReport {
    pub metrics: MetricsBundle,
    pub content: ContentAnalysis,
    pub heading_tree: Vec<HeadingNode>,
}

fn push_section_header(buf: &mut String, icon: &str, title: &str) {
    let _ = writeln!(buf, "{DIVIDER}");
    let _ = writeln!(buf, "{icon} {title}");
    let _ = writeln!(buf, "{DIVIDER}");
}

fn push_key_value(buf: &mut String, label: &str, value: &str) {
    if value.is_empty() {
        return;
    }
    let _ = writeln!(buf, "• {:<width$} : {}", label, value, width = LABEL_WIDTH);
}

fn push_list(buf: &mut String, items: &[String]) {
    for item in items.iter().take(MAX_LISTED) {
        let _ = writeln!(buf, "    - {item}");
    }
    if items.len() > MAX_LISTED {
        let _ = writeln!(buf, "    … {} more", items.len() - MAX_LISTED);
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

fn message_text<T: Serialize>(message: &T) -> String {
    serde_json::to_value(message)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}

pub fn render_page_report(report: &PageReport) -> String {
    let mut out = String::new();
    let bundle = &report.metrics;
    let seo = &bundle.seo;

    push_section_header(&mut out, "🔎", &format!("SEO: {}", bundle.url));
    push_key_value(&mut out, "Title", seo.title.as_deref().unwrap_or("(none)"));
    push_key_value(
        &mut out,
        "Title length",
        &format!("{} ({})", seo.title_length, message_text(&seo.title_message)),
    );
    push_key_value(
        &mut out,
        "Description length",
        &format!(
            "{} ({})",
            seo.meta_description_length,
            message_text(&seo.description_message)
        ),
    );
    push_key_value(
        &mut out,
        "Canonical",
        seo.canonical.url.as_deref().unwrap_or(if seo.canonical.present {
            "(empty href)"
        } else {
            "(none)"
        }),
    );
    push_key_value(&mut out, "Noindex", yes_no(seo.noindex));
    push_key_value(&mut out, "SEO-friendly URL", yes_no(seo.seo_friendly_url));
    push_key_value(&mut out, "Hreflang", &seo.hreflang.join(", "));

    let counts = &seo.headings.counts;
    push_key_value(
        &mut out,
        "Headings",
        &format!(
            "h1 {} · h2 {} · h3 {} · h4 {} · h5 {} · h6 {}",
            counts.h1, counts.h2, counts.h3, counts.h4, counts.h5, counts.h6
        ),
    );
    if seo.headings.missing_h1 {
        push_key_value(&mut out, "H1", "missing");
    } else if seo.headings.multiple_h1 {
        push_key_value(&mut out, "H1", "multiple");
    }
    push_key_value(&mut out, "H1 matches title", yes_no(seo.headings.h1_matches_title));
    push_key_value(
        &mut out,
        "Skipped levels",
        &seo.headings.sequence.skipped_levels.join(", "),
    );
    push_key_value(
        &mut out,
        "Images",
        &format!(
            "{} total, {} without alt, {} empty alt",
            seo.images.total, seo.images.missing_alt, seo.images.empty_alt
        ),
    );
    push_key_value(
        &mut out,
        "Links",
        &format!(
            "{} internal, {} external, {} nofollow",
            seo.links.internal_count, seo.links.external_count, seo.links.nofollow_count
        ),
    );
    if !seo.links.violations.is_empty() {
        push_key_value(
            &mut out,
            "Link violations",
            &seo.links.violations.len().to_string(),
        );
        push_list(&mut out, &seo.links.violations);
    }
    let _ = writeln!(&mut out);

    let security = &bundle.security;
    push_section_header(&mut out, "🔒", "Security");
    push_key_value(&mut out, "HTTPS", yes_no(security.https));
    push_key_value(&mut out, "Mixed content", yes_no(security.mixed_content));
    push_key_value(&mut out, "HSTS", yes_no(security.hsts_enabled));
    push_key_value(
        &mut out,
        "Server signature",
        if security.server_signature_hidden { "hidden" } else { "disclosed" },
    );
    push_key_value(&mut out, "Missing headers", &security.headers.missing.join(", "));
    let _ = writeln!(&mut out);

    let performance = &bundle.performance;
    push_section_header(&mut out, "⚡", "Performance");
    push_key_value(&mut out, "Page size", &format!("{:.2} KB", performance.page_size_kb));
    push_key_value(
        &mut out,
        "Requests",
        &format!(
            "{} ({} links, {} scripts, {} images)",
            performance.requests.total,
            performance.requests.links,
            performance.requests.scripts,
            performance.requests.images
        ),
    );
    push_key_value(&mut out, "Text compression", yes_no(performance.text_compression));
    let _ = writeln!(&mut out);

    let misc = &bundle.miscellaneous;
    push_section_header(&mut out, "🧭", "Miscellaneous");
    push_key_value(&mut out, "Charset", misc.charset.as_deref().unwrap_or("(none)"));
    push_key_value(&mut out, "Language", misc.language.as_deref().unwrap_or("(none)"));
    push_key_value(&mut out, "Text/HTML ratio", &format!("{:.2}", misc.text_to_html_ratio));
    push_key_value(&mut out, "Viewport", yes_no(misc.viewport));
    push_key_value(&mut out, "Favicon", yes_no(misc.favicon));
    push_key_value(&mut out, "Open Graph", yes_no(misc.open_graph));
    push_key_value(&mut out, "Structured data", &misc.structured_data.join(", "));
    push_key_value(&mut out, "Sitemap", yes_no(misc.sitemap_found));
    push_key_value(&mut out, "robots.txt", yes_no(misc.robots_txt_found));
    push_key_value(&mut out, "Crawl allowed", yes_no(misc.crawl_allowed));
    let _ = writeln!(&mut out);

    let content = &report.content;
    push_section_header(&mut out, "📝", "Content");
    push_key_value(
        &mut out,
        "Words",
        &format!("{} ({} unique)", content.total_words, content.unique_words),
    );
    push_key_value(&mut out, "Reading time", &content.reading_time.text);
    push_key_value(
        &mut out,
        "Sentiment",
        &format!(
            "{} (comparative {:.3})",
            content.sentiment.score, content.sentiment.comparative
        ),
    );
    let keywords: Vec<String> = content
        .top_keywords
        .iter()
        .map(|k| {
            let density = content
                .keyword_density
                .get(&k.word)
                .map(String::as_str)
                .unwrap_or("");
            format!("{} ×{} {}", k.word, k.count, density)
        })
        .collect();
    if !keywords.is_empty() {
        let _ = writeln!(&mut out, "• {:<width$} :", "Top keywords", width = LABEL_WIDTH);
        push_list(&mut out, &keywords);
    }

    out
}

fn render_metric_lines(buf: &mut String, icon: &str, metrics: &[CategorizedMetric]) {
    for metric in metrics {
        let _ = writeln!(buf, "  {icon} {}: {}", metric.name, metric.feedback);
    }
}

pub fn render_audits(audits: &[CategorizedAudit]) -> String {
    let mut out = String::new();
    for audit in audits {
        push_section_header(&mut out, "📊", &format!("Lighthouse: {}", audit.family));
        push_key_value(
            &mut out,
            "Score",
            &audit
                .score
                .map_or_else(|| "n/a".to_string(), |s| format!("{s}/100")),
        );
        if let Some(reported) = audit.reported_score {
            push_key_value(&mut out, "Reported score", &format!("{reported}/100"));
        }
        push_key_value(
            &mut out,
            "Checks",
            &format!(
                "{} passed, {} failed, {} manual",
                audit.passed.len(),
                audit.failed.len(),
                audit.manual.len()
            ),
        );
        render_metric_lines(&mut out, "❌", &audit.failed);
        render_metric_lines(&mut out, "❔", &audit.manual);
        render_metric_lines(&mut out, "✅", &audit.passed);
        let _ = writeln!(&mut out);
    }
    out
}
