//! Input records shared by the extractors and the aggregator

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

/// Case-insensitive HTTP response header map
///
/// Keys are lower-cased on insertion. Repeated headers, whether collected
/// one by one or reported as arrays, are joined with `", "`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Headers(BTreeMap<String, String>);

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.0
            .insert(name.as_ref().trim().to_ascii_lowercase(), value.into());
    }

    /// Add a value, joining it onto any existing one with `", "`
    pub fn append(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        let value = value.into();
        self.0
            .entry(name.as_ref().trim().to_ascii_lowercase())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert_with(|| value.clone());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(&name.to_ascii_lowercase())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (name, value) in iter {
            headers.append(name, value);
        }
        headers
    }
}

impl<'de> Deserialize<'de> for Headers {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<BTreeMap<String, JsonValue>>::deserialize(deserializer)?;
        let mut headers = Headers::new();
        for (name, value) in raw.unwrap_or_default() {
            let value = match value {
                JsonValue::String(s) => s,
                JsonValue::Array(items) => items
                    .iter()
                    .map(header_value_text)
                    .collect::<Vec<_>>()
                    .join(", "),
                JsonValue::Null => continue,
                other => header_value_text(&other),
            };
            headers.append(name, value);
        }
        Ok(headers)
    }
}

fn header_value_text(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Metadata captured by the scraper alongside the raw HTML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PageMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Raw scraped material for one page
///
/// Every field may be missing; only `url` is required by the aggregator and
/// its absence is reported as an error there rather than at decode time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContentRecord {
    pub user_id: Option<String>,
    pub url: Option<String>,
    pub html_content: Option<String>,
    pub headers: Headers,
    pub metadata: Option<PageMetadata>,
    pub favicon: Option<String>,
    pub text_content: Option<String>,
}

impl ContentRecord {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Default::default()
        }
    }

    pub fn html(&self) -> &str {
        self.html_content.as_deref().unwrap_or_default()
    }

    pub fn metadata_title(&self) -> Option<&str> {
        self.metadata
            .as_ref()
            .and_then(|m| m.title.as_deref())
            .filter(|t| !t.trim().is_empty())
    }

    pub fn metadata_description(&self) -> Option<&str> {
        self.metadata
            .as_ref()
            .and_then(|m| m.description.as_deref())
            .filter(|d| !d.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_is_case_insensitive() {
        let headers: Headers = [("Content-Encoding", "gzip")].into_iter().collect();
        assert_eq!(headers.get("content-encoding"), Some("gzip"));
        assert_eq!(headers.get("CONTENT-ENCODING"), Some("gzip"));
        assert!(headers.contains("Content-encoding"));
        assert!(!headers.contains("server"));
    }

    #[test]
    fn repeated_headers_are_joined() {
        let headers: Headers = [
            ("Set-Cookie", "a=1"),
            ("set-cookie", "b=2"),
            ("Server", "nginx"),
        ]
        .into_iter()
        .collect();
        assert_eq!(headers.get("set-cookie"), Some("a=1, b=2"));
        assert_eq!(headers.get("server"), Some("nginx"));

        let mut headers = headers;
        headers.insert("Set-Cookie", "c=3");
        assert_eq!(headers.get("set-cookie"), Some("c=3"));
    }

    #[test]
    fn headers_accept_array_values() {
        let headers: Headers =
            serde_json::from_str(r#"{"Set-Cookie": ["a=1", "b=2"], "X-Empty": null, "Age": 12}"#)
                .unwrap();
        assert_eq!(headers.get("set-cookie"), Some("a=1, b=2"));
        assert_eq!(headers.get("age"), Some("12"));
        assert!(!headers.contains("x-empty"));
    }

    #[test]
    fn record_tolerates_missing_fields() {
        let record: ContentRecord = serde_json::from_str(r#"{"url": "https://example.com"}"#).unwrap();
        assert_eq!(record.url.as_deref(), Some("https://example.com"));
        assert_eq!(record.html(), "");
        assert!(record.headers.is_empty());
        assert!(record.metadata_title().is_none());
    }

    #[test]
    fn record_null_headers_decode_to_empty() {
        let record: ContentRecord =
            serde_json::from_str(r#"{"url": "https://example.com", "headers": null}"#).unwrap();
        assert!(record.headers.is_empty());
    }

    #[test]
    fn blank_metadata_title_is_ignored() {
        let record: ContentRecord = serde_json::from_str(
            r#"{"url": "https://example.com", "metadata": {"title": "   ", "description": "About us"}}"#,
        )
        .unwrap();
        assert!(record.metadata_title().is_none());
        assert_eq!(record.metadata_description(), Some("About us"));
    }
}
