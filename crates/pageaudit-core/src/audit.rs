//! Lighthouse audit categorization
//!
//! Maps the audits of a Lighthouse-style report onto a curated check
//! catalog, producing passed / failed / manual buckets and an aggregate
//! 0-100 score per family.
//!
//! Two coverage policies exist. Catalog-driven families (accessibility,
//! performance) emit one metric per catalog entry and turn missing audits
//! into manual placeholders. The report-driven family (SEO) walks the
//! report instead: catalog entries without an audit are left out and
//! audits without a catalog entry keep their own title and description.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Feedback for a catalog entry the report has no audit for
pub const MISSING_AUDIT_FEEDBACK: &str = "Metric data is not available.";

const ACCESSIBILITY_CATALOG: &str = include_str!("../catalog/accessibility.json");
const PERFORMANCE_CATALOG: &str = include_str!("../catalog/performance.json");
const SEO_CATALOG: &str = include_str!("../catalog/seo.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogFamily {
    Accessibility,
    Performance,
    Seo,
}

impl CatalogFamily {
    pub const ALL: [CatalogFamily; 3] = [Self::Accessibility, Self::Performance, Self::Seo];

    /// Key of the family in a report's `categories` map
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accessibility => "accessibility",
            Self::Performance => "performance",
            Self::Seo => "seo",
        }
    }

    pub fn default_policy(&self) -> CoveragePolicy {
        match self {
            Self::Accessibility | Self::Performance => CoveragePolicy::CatalogDriven,
            Self::Seo => CoveragePolicy::ReportDriven,
        }
    }
}

impl fmt::Display for CatalogFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CatalogFamily {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "accessibility" | "a11y" => Ok(Self::Accessibility),
            "performance" | "perf" => Ok(Self::Performance),
            "seo" => Ok(Self::Seo),
            other => Err(format!("unknown audit family: {other}")),
        }
    }
}

/// Which side drives the iteration when catalog and report disagree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoveragePolicy {
    /// One metric per catalog entry; missing audits become manual placeholders
    CatalogDriven,
    /// One metric per report audit; unmatched catalog entries are omitted
    ReportDriven,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// One curated check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckDefinition {
    pub id: String,
    pub name: String,
    pub positive_text: String,
    pub negative_text: String,
    #[serde(default)]
    pub tooltip: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
}

/// The checks of one family, ids unique
#[derive(Debug, Clone)]
pub struct Catalog {
    family: CatalogFamily,
    checks: Vec<CheckDefinition>,
    index: HashMap<String, usize>,
}

impl Catalog {
    pub fn new(family: CatalogFamily, checks: Vec<CheckDefinition>) -> Result<Self> {
        let mut index = HashMap::with_capacity(checks.len());
        for (i, check) in checks.iter().enumerate() {
            if index.insert(check.id.clone(), i).is_some() {
                return Err(Error::DuplicateCheck {
                    family,
                    id: check.id.clone(),
                });
            }
        }
        Ok(Self {
            family,
            checks,
            index,
        })
    }

    /// Parse a JSON array of check definitions
    pub fn from_json(family: CatalogFamily, json: &str) -> Result<Self> {
        let checks = serde_json::from_str(json).map_err(|source| Error::Catalog { family, source })?;
        Self::new(family, checks)
    }

    /// The catalog shipped with the crate
    pub fn builtin(family: CatalogFamily) -> Result<Self> {
        let json = match family {
            CatalogFamily::Accessibility => ACCESSIBILITY_CATALOG,
            CatalogFamily::Performance => PERFORMANCE_CATALOG,
            CatalogFamily::Seo => SEO_CATALOG,
        };
        Self::from_json(family, json)
    }

    pub fn family(&self) -> CatalogFamily {
        self.family
    }

    pub fn get(&self, id: &str) -> Option<&CheckDefinition> {
        self.index.get(id).map(|&i| &self.checks[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &CheckDefinition> {
        self.checks.iter()
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }
}

/// Built-in catalogs for every family, loaded once at startup
#[derive(Debug, Clone)]
pub struct CatalogSet {
    accessibility: Catalog,
    performance: Catalog,
    seo: Catalog,
}

impl CatalogSet {
    pub fn builtin() -> Result<Self> {
        Ok(Self {
            accessibility: Catalog::builtin(CatalogFamily::Accessibility)?,
            performance: Catalog::builtin(CatalogFamily::Performance)?,
            seo: Catalog::builtin(CatalogFamily::Seo)?,
        })
    }

    pub fn get(&self, family: CatalogFamily) -> &Catalog {
        match family {
            CatalogFamily::Accessibility => &self.accessibility,
            CatalogFamily::Performance => &self.performance,
            CatalogFamily::Seo => &self.seo,
        }
    }
}

/// Numbers clamp to `[0, 1]`; anything else is `null`
fn lenient_score<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = JsonValue::deserialize(deserializer)?;
    Ok(match value {
        JsonValue::Number(n) => n.as_f64().map(|s| s.clamp(0.0, 1.0)),
        JsonValue::Null => None,
        other => {
            tracing::warn!(score = %other, "non-numeric audit score treated as null");
            None
        }
    })
}

/// A `null` map is empty; `null` or malformed entries are dropped
fn lenient_map<'de, D, T>(deserializer: D) -> std::result::Result<BTreeMap<String, T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Option::<BTreeMap<String, JsonValue>>::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(id, value)| {
            if value.is_null() {
                tracing::warn!(id, "null report entry skipped");
                return None;
            }
            match serde_json::from_value(value) {
                Ok(entry) => Some((id, entry)),
                Err(e) => {
                    tracing::warn!(id, error = %e, "malformed report entry skipped");
                    None
                }
            }
        })
        .collect())
}

/// One audit result from the report
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    #[serde(default, deserialize_with = "lenient_score")]
    pub score: Option<f64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_display_mode: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRef {
    pub id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResult {
    #[serde(default, deserialize_with = "lenient_score")]
    pub score: Option<f64>,
    #[serde(default)]
    pub audit_refs: Vec<AuditRef>,
}

/// A Lighthouse-compatible report; every part may be missing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditReport {
    #[serde(deserialize_with = "lenient_map")]
    pub audits: BTreeMap<String, AuditEntry>,
    #[serde(deserialize_with = "lenient_map")]
    pub categories: BTreeMap<String, CategoryResult>,
}

impl AuditReport {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(Error::Report)
    }

    /// Audit ids the report files under `family`, when it lists any
    fn audit_refs(&self, family: CatalogFamily) -> Option<Vec<&str>> {
        self.categories
            .get(family.as_str())
            .filter(|category| !category.audit_refs.is_empty())
            .map(|category| category.audit_refs.iter().map(|r| r.id.as_str()).collect())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorizedMetric {
    pub id: String,
    pub name: String,
    pub tooltip: String,
    pub feedback: String,
    pub score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score_display_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorizedAudit {
    pub family: CatalogFamily,
    pub passed: Vec<CategorizedMetric>,
    pub failed: Vec<CategorizedMetric>,
    pub manual: Vec<CategorizedMetric>,
    /// `round(100 * mean)` over every defined score
    pub score: Option<u8>,
    /// The report's own category score, scaled to 0-100
    pub reported_score: Option<u8>,
}

impl CategorizedAudit {
    pub fn total(&self) -> usize {
        self.passed.len() + self.failed.len() + self.manual.len()
    }
}

/// `round(100 * mean)` of the defined scores, `None` when there are none
pub fn aggregate_score<I>(scores: I) -> Option<u8>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let (sum, count) = scores
        .into_iter()
        .flatten()
        .fold((0.0, 0usize), |(sum, count), s| (sum + s, count + 1));
    (count > 0).then(|| to_percent(sum / count as f64))
}

fn to_percent(score: f64) -> u8 {
    (score.clamp(0.0, 1.0) * 100.0).round() as u8
}

fn catalog_metric(check: &CheckDefinition, audit: &AuditEntry) -> CategorizedMetric {
    let feedback = if audit.score == Some(1.0) {
        &check.positive_text
    } else {
        &check.negative_text
    };
    CategorizedMetric {
        id: check.id.clone(),
        name: check.name.clone(),
        tooltip: check.tooltip.clone(),
        feedback: feedback.clone(),
        score: audit.score,
        details: audit.details.clone(),
        score_display_mode: audit.score_display_mode.clone(),
        priority: check.priority,
    }
}

fn placeholder_metric(check: &CheckDefinition) -> CategorizedMetric {
    CategorizedMetric {
        id: check.id.clone(),
        name: check.name.clone(),
        tooltip: check.tooltip.clone(),
        feedback: MISSING_AUDIT_FEEDBACK.to_string(),
        score: None,
        details: None,
        score_display_mode: None,
        priority: check.priority,
    }
}

fn uncataloged_metric(id: &str, audit: &AuditEntry) -> CategorizedMetric {
    let title = audit.title.clone().unwrap_or_else(|| id.to_string());
    CategorizedMetric {
        id: id.to_string(),
        name: title.clone(),
        tooltip: audit.description.clone().unwrap_or_default(),
        feedback: audit.description.clone().unwrap_or(title),
        score: audit.score,
        details: audit.details.clone(),
        score_display_mode: audit.score_display_mode.clone(),
        priority: None,
    }
}

/// Bucket the report's audits against `catalog`
pub fn categorize(
    catalog: &Catalog,
    report: &AuditReport,
    policy: CoveragePolicy,
) -> CategorizedAudit {
    let family = catalog.family();

    let metrics: Vec<CategorizedMetric> = match policy {
        CoveragePolicy::CatalogDriven => catalog
            .iter()
            .map(|check| match report.audits.get(&check.id) {
                Some(audit) => catalog_metric(check, audit),
                None => {
                    tracing::warn!(%family, id = %check.id, "catalog check has no audit in report");
                    placeholder_metric(check)
                }
            })
            .collect(),
        CoveragePolicy::ReportDriven => {
            let ids: Vec<&str> = report
                .audit_refs(family)
                .unwrap_or_else(|| report.audits.keys().map(String::as_str).collect());

            for check in catalog.iter().filter(|c| !report.audits.contains_key(&c.id)) {
                tracing::debug!(%family, id = %check.id, "catalog check omitted, no audit in report");
            }

            ids.into_iter()
                .filter_map(|id| report.audits.get_key_value(id))
                .map(|(id, audit)| match catalog.get(id) {
                    Some(check) => catalog_metric(check, audit),
                    None => uncataloged_metric(id, audit),
                })
                .collect()
        }
    };

    let score = aggregate_score(metrics.iter().map(|m| m.score));
    let reported_score = report
        .categories
        .get(family.as_str())
        .and_then(|category| category.score)
        .map(to_percent);

    let mut result = CategorizedAudit {
        family,
        passed: Vec::new(),
        failed: Vec::new(),
        manual: Vec::new(),
        score,
        reported_score,
    };
    for metric in metrics {
        match metric.score {
            Some(s) if s == 1.0 => result.passed.push(metric),
            Some(_) => result.failed.push(metric),
            None => result.manual.push(metric),
        }
    }
    result
}

/// Categorize one family with its built-in catalog and default policy
pub fn categorize_family(
    catalogs: &CatalogSet,
    report: &AuditReport,
    family: CatalogFamily,
) -> CategorizedAudit {
    categorize(catalogs.get(family), report, family.default_policy())
}
