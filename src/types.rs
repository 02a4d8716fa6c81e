//! Canonical data model shared by every provider.

use crate::classifier::Quality;
use crate::config::{DEFAULT_PAGE_SIZE, DEFAULT_START_PAGE};
use crate::error::{ProviderError, ProviderResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Static descriptor of a provider plus its mutable configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderInfo {
    pub id: String,
    pub label: String,
    pub version: String,
    pub site: String,
    pub enabled: bool,
    pub remote: bool,
    pub require_secret_key: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,
    pub support_search: bool,
    pub support_download: bool,
}

impl ProviderInfo {
    pub fn has_secret_key(&self) -> bool {
        self.secret_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty())
    }
}

/// Orientation filter understood by every adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Landscape,
    Portrait,
}

impl Orientation {
    /// Wire discriminator ("1" landscape, "2" portrait).
    pub fn discriminator(&self) -> &'static str {
        match self {
            Orientation::Landscape => "1",
            Orientation::Portrait => "2",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Orientation::Landscape => write!(f, "landscape"),
            Orientation::Portrait => write!(f, "portrait"),
        }
    }
}

impl std::str::FromStr for Orientation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1" | "landscape" => Ok(Orientation::Landscape),
            "2" | "portrait" => Ok(Orientation::Portrait),
            _ => Err(format!("Unknown orientation: {}", s)),
        }
    }
}

fn default_start_page() -> u32 {
    DEFAULT_START_PAGE
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

/// Caller input, shared by every provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    #[serde(default)]
    pub keywords: String,
    #[serde(default = "default_start_page")]
    pub start_page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Orientation discriminators; only a single element acts as a filter.
    #[serde(default)]
    pub orientation: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,
}

impl SearchQuery {
    pub fn new(keywords: impl Into<String>) -> Self {
        Self {
            keywords: keywords.into(),
            start_page: DEFAULT_START_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
            orientation: Vec::new(),
            secret_key: None,
        }
    }

    pub fn page(mut self, start_page: u32, page_size: u32) -> Self {
        self.start_page = start_page;
        self.page_size = page_size;
        self
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = vec![orientation.discriminator().to_string()];
        self
    }

    pub fn with_secret_key(mut self, key: impl Into<String>) -> Self {
        self.secret_key = Some(key.into());
        self
    }

    /// The requested orientation, if exactly one recognised value was given.
    pub fn orientation_filter(&self) -> Option<Orientation> {
        match self.orientation.as_slice() {
            [single] => single.parse().ok(),
            _ => None,
        }
    }

    pub fn validate(&self) -> ProviderResult<()> {
        if self.start_page == 0 {
            return Err(ProviderError::InvalidQuery(
                "startPage must be a positive integer".to_string(),
            ));
        }
        if self.page_size == 0 {
            return Err(ProviderError::InvalidQuery(
                "pageSize must be a positive integer".to_string(),
            ));
        }
        Ok(())
    }
}

/// Canonical image record produced by every adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageResult {
    pub provider_id: String,
    pub file_name: String,
    pub file_ext: String,
    pub link: String,
    pub author: String,
    pub title: String,
    pub desc: String,
    pub url: String,
    pub quality: Quality,
    pub width: u32,
    pub height: u32,
    pub is_landscape: bool,
}

/// Per-call response envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub start_page: u32,
    pub page_size: u32,
    pub list: Vec<ImageResult>,
    pub total: u64,
}

impl SearchResult {
    /// Empty result echoing the query's paging, used when a provider fails.
    pub fn empty(query: &SearchQuery) -> Self {
        Self {
            start_page: query.start_page,
            page_size: query.page_size,
            list: Vec::new(),
            total: 0,
        }
    }
}

/// Drops the query string (and fragment) from a URL. Idempotent.
pub fn strip_query(url: &str) -> &str {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    &url[..end]
}

/// Lower-cased extension of the trailing path segment, or empty when absent.
pub fn file_ext(url: &str) -> String {
    let stripped = strip_query(url);
    let without_scheme = stripped
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(stripped);
    let Some((_, path)) = without_scheme.split_once('/') else {
        return String::new();
    };
    let segment = path.rsplit('/').next().unwrap_or_default();
    match segment.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => ext.to_lowercase(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use test_case::test_case;

    #[test_case("https://a.com/x.jpg?w=100" => "https://a.com/x.jpg")]
    #[test_case("https://a.com/x.jpg" => "https://a.com/x.jpg")]
    #[test_case("https://a.com/x.jpg#frag" => "https://a.com/x.jpg")]
    #[test_case("?only" => "")]
    fn test_strip_query(url: &str) -> &str {
        strip_query(url)
    }

    #[test_case("https://images.pexels.com/photos/1/pexels-photo-1.JPEG?auto=compress" => "jpeg")]
    #[test_case("https://i.loli.net/2024/01/01/abc.png" => "png")]
    #[test_case("https://example.com/download" => "")]
    #[test_case("https://example.com" => "" ; "no path")]
    #[test_case("https://example.com/.hidden" => "")]
    fn test_file_ext(url: &str) -> String {
        file_ext(url)
    }

    #[test]
    fn test_orientation_filter_requires_single_value() {
        let mut query = SearchQuery::new("moon");
        assert_eq!(query.orientation_filter(), None);

        query.orientation = vec!["1".into()];
        assert_eq!(query.orientation_filter(), Some(Orientation::Landscape));

        query.orientation = vec!["2".into()];
        assert_eq!(query.orientation_filter(), Some(Orientation::Portrait));

        query.orientation = vec!["1".into(), "2".into()];
        assert_eq!(query.orientation_filter(), None);

        query.orientation = vec!["diagonal".into()];
        assert_eq!(query.orientation_filter(), None);
    }

    #[test]
    fn test_query_payload_defaults() {
        let query: SearchQuery = serde_json::from_str(r#"{"keywords":"sea"}"#).unwrap();
        assert_eq!(query.start_page, DEFAULT_START_PAGE);
        assert_eq!(query.page_size, DEFAULT_PAGE_SIZE);
        assert!(query.orientation.is_empty());
        assert!(query.validate().is_ok());

        let bad = SearchQuery::new("sea").page(0, 10);
        assert!(bad.validate().is_err());
    }

    proptest! {
        #[test]
        fn strip_is_idempotent(url in ".*") {
            let once = strip_query(&url);
            prop_assert_eq!(strip_query(once), once);
            prop_assert!(!once.contains('?'));
        }
    }
}
