use super::source::{decode_item, fetch_json, build_url, ProviderAdapter, SearchContext};
use crate::classifier::Classifier;
use crate::error::ProviderResult;
use crate::normalize::RawImage;
use crate::transport::HttpRequest;
use crate::types::{ImageResult, ProviderInfo, SearchQuery, SearchResult};
use serde::Deserialize;

pub const ID: &str = "nasa";
const DEFAULT_BASE_URL: &str = "https://images-api.nasa.gov";
const DETAILS_URL: &str = "https://images.nasa.gov/details";
const CANONICAL_REL: &str = "canonical";

/// NASA Image and Video Library.
pub struct NasaSource {
    base_url: String,
}

impl NasaSource {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    fn build_request(&self, query: &SearchQuery) -> HttpRequest {
        HttpRequest::get(build_url(&self.base_url, "/search"))
            .query("q", &query.keywords)
            .query("media_type", "image")
            .query("page", query.start_page)
            .query("page_size", query.page_size)
    }

    fn item_to_image(&self, item: NasaItem, classifier: &dyn Classifier) -> Option<ImageResult> {
        let canonical = item
            .links
            .into_iter()
            .find(|link| link.rel.as_deref() == Some(CANONICAL_REL))?;
        let data = item.data.into_iter().next().unwrap_or_default();
        let link = data
            .nasa_id
            .as_ref()
            .map(|id| format!("{}/{}", DETAILS_URL, id));
        let author = data
            .photographer
            .or(data.secondary_creator)
            .or(data.center);

        RawImage {
            id: data.nasa_id,
            url: canonical.href,
            link,
            author,
            title: data.title,
            desc: data.description,
            width: canonical.width,
            height: canonical.height,
        }
        .normalize(ID, classifier)
    }
}

impl Default for NasaSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ProviderAdapter for NasaSource {
    fn id(&self) -> &'static str {
        ID
    }

    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            id: ID.to_string(),
            label: "NASA Image Library".to_string(),
            version: "1.0.0".to_string(),
            site: "https://images.nasa.gov".to_string(),
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
        let parsed: NasaSearchResponse = fetch_json(ctx, ID, self.build_request(query)).await?;
        let collection = parsed.collection;

        let list: Vec<ImageResult> = collection
            .items
            .into_iter()
            .filter_map(|item| decode_item::<NasaItem>(ID, item))
            .filter_map(|item| self.item_to_image(item, ctx.classifier))
            .collect();

        let total = collection
            .metadata
            .and_then(|m| m.total_hits)
            .unwrap_or(list.len() as u64);

        Ok(SearchResult {
            start_page: query.start_page,
            page_size: query.page_size,
            list,
            total,
        })
    }
}

#[derive(Debug, Deserialize)]
struct NasaSearchResponse {
    collection: NasaCollection,
}

#[derive(Debug, Deserialize)]
struct NasaCollection {
    items: Vec<serde_json::Value>,
    #[serde(default)]
    metadata: Option<NasaMetadata>,
}

#[derive(Debug, Deserialize)]
struct NasaMetadata {
    #[serde(default)]
    total_hits: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct NasaItem {
    #[serde(default)]
    data: Vec<NasaData>,
    #[serde(default)]
    links: Vec<NasaLink>,
}

#[derive(Debug, Deserialize, Default)]
struct NasaData {
    #[serde(default)]
    nasa_id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    photographer: Option<String>,
    #[serde(default)]
    secondary_creator: Option<String>,
    #[serde(default)]
    center: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NasaLink {
    #[serde(default)]
    href: Option<String>,
    #[serde(default)]
    rel: Option<String>,
    #[serde(default)]
    width: Option<u64>,
    #[serde(default)]
    height: Option<u64>,
}
