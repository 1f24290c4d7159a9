//! Analyzer configuration
//!
//! All thresholds the extractors and analyzers apply. Defaults match the
//! bands used by the reports; a JSON document may override any subset.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{Error, Result};

/// Inclusive length band; shorter is `SHORT`, longer is `LONG`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LengthBand {
    pub min: usize,
    pub max: usize,
}

impl LengthBand {
    pub const fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnalyzerConfig {
    /// Optimal `<title>` length in characters
    pub title_length: LengthBand,

    /// Optimal meta description length in characters
    pub description_length: LengthBand,

    /// Acceptable heading text length in characters
    pub heading_length: LengthBand,

    /// Anchor texts that do not describe their target
    pub generic_anchor_phrases: Vec<String>,

    /// Reading speed used for reading-time estimates
    pub words_per_minute: f64,

    /// Per-request timeout for sitemap/robots probes
    pub probe_timeout_secs: u64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            title_length: LengthBand::new(50, 60),
            description_length: LengthBand::new(150, 160),
            heading_length: LengthBand::new(5, 70),
            generic_anchor_phrases: ["click here", "read more", "learn more", "details"]
                .into_iter()
                .map(String::from)
                .collect(),
            words_per_minute: 200.0,
            probe_timeout_secs: 5,
        }
    }
}

impl AnalyzerConfig {
    /// Parse a (possibly partial) JSON configuration
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(Error::Config)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}
