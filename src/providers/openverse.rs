use super::source::{build_url, decode_item, fetch_json, id_string, ProviderAdapter, SearchContext};
use crate::error::ProviderResult;
use crate::normalize::RawImage;
use crate::transport::HttpRequest;
use crate::types::{ImageResult, Orientation, ProviderInfo, SearchQuery, SearchResult};
use serde::Deserialize;

pub const ID: &str = "openverse";
const DEFAULT_BASE_URL: &str = "https://api.openverse.org";

/// Openverse openly-licensed media search.
pub struct OpenverseSource {
    base_url: String,
}

impl OpenverseSource {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    fn aspect_ratio(orientation: Orientation) -> &'static str {
        match orientation {
            Orientation::Landscape => "wide",
            Orientation::Portrait => "tall",
        }
    }

    fn build_request(&self, query: &SearchQuery) -> HttpRequest {
        let mut request = HttpRequest::get(build_url(&self.base_url, "/v1/images"))
            .query("q", &query.keywords)
            .query("page", query.start_page)
            .query("page_size", query.page_size);
        if let Some(orientation) = query.orientation_filter() {
            request = request.query("aspect_ratio", Self::aspect_ratio(orientation));
        }
        request
    }
}

impl Default for OpenverseSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ProviderAdapter for OpenverseSource {
    fn id(&self) -> &'static str {
        ID
    }

    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            id: ID.to_string(),
            label: "Openverse".to_string(),
            version: "1.0.0".to_string(),
            site: "https://openverse.org".to_string(),
            enabled: true,
            remote: true,
            require_secret_key: false,
            secret_key: None,
            support_search: true,
            support_download: true,
        }
    }

    async fn try_search(
        &self,
        ctx: SearchContext<'_>,
        query: &SearchQuery,
    ) -> ProviderResult<SearchResult> {
        let parsed: OpenverseResponse = fetch_json(ctx, ID, self.build_request(query)).await?;

        let list: Vec<ImageResult> = parsed
            .results
            .into_iter()
            .filter_map(|item| decode_item::<OpenverseImage>(ID, item))
            .filter_map(|image| image.into_raw().normalize(ID, ctx.classifier))
            .collect();

        let total = parsed.result_count.unwrap_or(list.len() as u64);
        Ok(SearchResult {
            start_page: query.start_page,
            page_size: query.page_size,
            list,
            total,
        })
    }
}

#[derive(Debug, Deserialize)]
struct OpenverseResponse {
    #[serde(default)]
    result_count: Option<u64>,
    results: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct OpenverseImage {
    #[serde(default)]
    id: Option<serde_json::Value>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    foreign_landing_url: Option<String>,
    #[serde(default)]
    creator: Option<String>,
    #[serde(default)]
    width: Option<u64>,
    #[serde(default)]
    height: Option<u64>,
    #[serde(default)]
    tags: Vec<OpenverseTag>,
}

#[derive(Debug, Deserialize)]
struct OpenverseTag {
    #[serde(default)]
    name: Option<String>,
}

impl OpenverseImage {
    fn into_raw(self) -> RawImage {
        let desc = self
            .tags
            .into_iter()
            .filter_map(|tag| tag.name)
            .collect::<Vec<_>>()
            .join(", ");
        RawImage {
            id: id_string(self.id.as_ref()),
            url: self.url,
            link: self.foreign_landing_url,
            author: self.creator,
            title: self.title,
            desc: Some(desc),
            width: self.width,
            height: self.height,
        }
    }
}
