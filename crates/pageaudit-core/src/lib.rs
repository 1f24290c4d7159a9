//! # pageaudit-core
//!
//! Core library for auditing web pages.
//!
//! This library provides:
//! - Pure extractors for SEO, security, performance and miscellaneous facts
//! - A metrics aggregator producing a versioned [`MetricsBundle`] per page
//! - Body-text analysis (keywords, n-grams, density, sentiment, reading time)
//! - Link and heading analyzers
//! - Lighthouse audit categorization against curated check catalogs
//!
//! ## Features
//!
//! - `default`: everything except network access
//! - `live-probe`: live sitemap.xml / robots.txt reachability probing
//!
//! ## Example
//!
//! ```
//! use pageaudit_core::{AnalyzerConfig, ContentRecord, SiteReachability, calculate_metrics};
//!
//! # fn example() -> pageaudit_core::Result<()> {
//! let record = ContentRecord {
//!     html_content: Some("<title>Hello</title><h1>Hello</h1>".into()),
//!     ..ContentRecord::new("https://example.com/hello")
//! };
//!
//! let bundle = calculate_metrics(&record, &SiteReachability::unknown(), &AnalyzerConfig::default())?;
//! assert_eq!(bundle.seo.title.as_deref(), Some("Hello"));
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod audit;
pub mod config;
pub mod content;
pub mod content_facts;
pub mod error;
pub mod extractors;
pub mod headings;
pub mod links;
pub mod metrics;
pub mod parser;
pub mod reachability;
pub mod robots_txt;
pub mod store;
pub mod types;
pub mod url_utils;

// Re-export commonly used types
pub use audit::{
    AuditReport, Catalog, CatalogFamily, CatalogSet, CategorizedAudit, CategorizedMetric,
    CoveragePolicy, categorize, categorize_family,
};
pub use config::AnalyzerConfig;
pub use content::{ContentAnalysis, ContentAnalyzer};
pub use content_facts::{ContentFacts, extract_content_facts};
pub use error::{Error, Result};
pub use metrics::{METRICS_VERSION, MetricsBundle, calculate_metrics};
pub use reachability::SiteReachability;
pub use types::{ContentRecord, Headers, PageMetadata};

#[cfg(feature = "live-probe")]
pub use reachability::HttpSiteProbe;
