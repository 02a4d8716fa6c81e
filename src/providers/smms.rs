use super::source::{build_url, decode_item, fetch_json, AuthScheme, ProviderAdapter, SearchContext};
use crate::error::{ProviderError, ProviderResult};
use crate::normalize::RawImage;
use crate::pagination::PageCounters;
use crate::transport::HttpRequest;
use crate::types::{ImageResult, ProviderInfo, SearchQuery, SearchResult};
use serde::Deserialize;

pub const ID: &str = "smms";
const DEFAULT_BASE_URL: &str = "https://sm.ms";

/// SM.MS image hosting. The endpoint lists the account's upload history, so
/// keywords and orientation are ignored, and it only reports page counters.
pub struct SmmsSource {
    base_url: String,
}

impl SmmsSource {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    fn build_request(&self, query: &SearchQuery) -> ProviderResult<HttpRequest> {
        let request = HttpRequest::get(build_url(&self.base_url, "/api/v2/upload_history"))
            .query("page", query.start_page);
        self.auth_scheme()
            .apply(ID, request, query.secret_key.as_deref())
    }
}

impl Default for SmmsSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ProviderAdapter for SmmsSource {
    fn id(&self) -> &'static str {
        ID
    }

    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            id: ID.to_string(),
            label: "SM.MS".to_string(),
            version: "1.0.0".to_string(),
            site: "https://sm.ms".to_string(),
            enabled: false,
            remote: true,
            require_secret_key: true,
            secret_key: None,
            support_search: false,
            support_download: true,
        }
    }

    fn auth_scheme(&self) -> AuthScheme {
        AuthScheme::Basic
    }

    async fn try_search(
        &self,
        ctx: SearchContext<'_>,
        query: &SearchQuery,
    ) -> ProviderResult<SearchResult> {
        let request = self.build_request(query)?;
        let parsed: SmmsResponse = fetch_json(ctx, ID, request).await?;

        if !parsed.success {
            return Err(ProviderError::malformed(
                ID,
                format!(
                    "upstream reported failure ({}): {}",
                    parsed.code.unwrap_or_default(),
                    parsed.message.unwrap_or_default()
                ),
            ));
        }
        let items = parsed
            .data
            .ok_or_else(|| ProviderError::malformed(ID, "missing field `data`"))?;

        let counters = PageCounters {
            items_on_current_page: items.len() as u64,
            page_size: parsed.per_page.unwrap_or(u64::from(query.page_size)),
            current_page: parsed.current_page.unwrap_or(u64::from(query.start_page)),
            total_pages: parsed.total_pages.unwrap_or(1),
        };

        let list: Vec<ImageResult> = items
            .into_iter()
            .filter_map(|item| decode_item::<SmmsUpload>(ID, item))
            .filter_map(|upload| upload.into_raw().normalize(ID, ctx.classifier))
            .collect();

        Ok(SearchResult {
            start_page: query.start_page,
            page_size: query.page_size,
            list,
            total: counters.total(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct SmmsResponse {
    success: bool,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<Vec<serde_json::Value>>,
    #[serde(rename = "CurrentPage")]
    #[serde(default)]
    current_page: Option<u64>,
    #[serde(rename = "TotalPages")]
    #[serde(default)]
    total_pages: Option<u64>,
    #[serde(rename = "PerPage")]
    #[serde(default)]
    per_page: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct SmmsUpload {
    #[serde(default)]
    hash: Option<String>,
    #[serde(default)]
    filename: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    page: Option<String>,
    #[serde(default)]
    width: Option<u64>,
    #[serde(default)]
    height: Option<u64>,
}

impl SmmsUpload {
    fn into_raw(self) -> RawImage {
        RawImage {
            id: self.hash,
            url: self.url,
            link: self.page,
            author: None,
            title: self.filename,
            desc: None,
            width: self.width,
            height: self.height,
        }
    }
}
