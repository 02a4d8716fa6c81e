use super::source::{
    build_url, decode_item, fetch_json, id_string, AuthScheme, ProviderAdapter, SearchContext,
};
use crate::error::ProviderResult;
use crate::normalize::RawImage;
use crate::transport::HttpRequest;
use crate::types::{ImageResult, Orientation, ProviderInfo, SearchQuery, SearchResult};
use serde::Deserialize;

pub const ID: &str = "pexels";
const DEFAULT_BASE_URL: &str = "https://api.pexels.com";

/// Pexels photo search. Requires an API key sent verbatim as `Authorization`.
pub struct PexelsSource {
    base_url: String,
}

impl PexelsSource {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    fn orientation_param(orientation: Orientation) -> &'static str {
        match orientation {
            Orientation::Landscape => "landscape",
            Orientation::Portrait => "portrait",
        }
    }

    fn build_request(&self, query: &SearchQuery) -> ProviderResult<HttpRequest> {
        let mut request = HttpRequest::get(build_url(&self.base_url, "/v1/search"))
            .query("query", &query.keywords)
            .query("page", query.start_page)
            .query("per_page", query.page_size);
        if let Some(orientation) = query.orientation_filter() {
            request = request.query("orientation", Self::orientation_param(orientation));
        }
        self.auth_scheme()
            .apply(ID, request, query.secret_key.as_deref())
    }
}

impl Default for PexelsSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ProviderAdapter for PexelsSource {
    fn id(&self) -> &'static str {
        ID
    }

    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            id: ID.to_string(),
            label: "Pexels".to_string(),
            version: "1.0.0".to_string(),
            site: "https://www.pexels.com".to_string(),
            enabled: false,
            remote: true,
            require_secret_key: true,
            secret_key: None,
            support_search: true,
            support_download: true,
        }
    }

    fn auth_scheme(&self) -> AuthScheme {
        AuthScheme::RawHeader
    }

    async fn try_search(
        &self,
        ctx: SearchContext<'_>,
        query: &SearchQuery,
    ) -> ProviderResult<SearchResult> {
        let request = self.build_request(query)?;
        let parsed: PexelsResponse = fetch_json(ctx, ID, request).await?;

        let list: Vec<ImageResult> = parsed
            .photos
            .into_iter()
            .filter_map(|item| decode_item::<PexelsPhoto>(ID, item))
            .filter_map(|photo| photo.into_raw().normalize(ID, ctx.classifier))
            .collect();

        let total = parsed.total_results.unwrap_or(list.len() as u64);
        Ok(SearchResult {
            start_page: query.start_page,
            page_size: query.page_size,
            list,
            total,
        })
    }
}

#[derive(Debug, Deserialize)]
struct PexelsResponse {
    #[serde(default)]
    total_results: Option<u64>,
    photos: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct PexelsPhoto {
    #[serde(default)]
    id: Option<serde_json::Value>,
    #[serde(default)]
    width: Option<u64>,
    #[serde(default)]
    height: Option<u64>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    photographer: Option<String>,
    #[serde(default)]
    alt: Option<String>,
    #[serde(default)]
    src: Option<PexelsSrc>,
}

#[derive(Debug, Deserialize)]
struct PexelsSrc {
    #[serde(default)]
    original: Option<String>,
}

impl PexelsPhoto {
    fn into_raw(self) -> RawImage {
        RawImage {
            id: id_string(self.id.as_ref()),
            url: self.src.and_then(|src| src.original),
            link: self.url,
            author: self.photographer,
            title: self.alt.clone(),
            desc: self.alt,
            width: self.width,
            height: self.height,
        }
    }
}
