//! Error types for the audit core.
//!
//! Only input validation and configuration problems are errors. Extraction
//! problems never surface here; extractors fall back to safe defaults.

use thiserror::Error;

use crate::audit::CatalogFamily;

#[derive(Debug, Error)]
pub enum Error {
    /// The content record carries no URL (or only whitespace)
    #[error("content record has no URL")]
    MissingUrl,

    /// The content record URL could not be parsed
    #[error("invalid URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// A check catalog could not be decoded
    #[error("failed to load {family} catalog: {source}")]
    Catalog {
        family: CatalogFamily,
        #[source]
        source: serde_json::Error,
    },

    /// Two catalog entries in one family share an id
    #[error("duplicate check id {id:?} in {family} catalog")]
    DuplicateCheck { family: CatalogFamily, id: String },

    /// An audit report could not be decoded
    #[error("failed to parse audit report: {0}")]
    Report(#[source] serde_json::Error),

    /// Analyzer configuration could not be decoded
    #[error("failed to parse analyzer configuration: {0}")]
    Config(#[source] serde_json::Error),

    /// The HTTP client for live probing could not be built
    #[cfg(feature = "live-probe")]
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
