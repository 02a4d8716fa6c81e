use crate::classifier::Classifier;
use crate::error::{ProviderError, ProviderResult};
use crate::transport::{HttpRequest, Transport};
use crate::types::{ProviderInfo, SearchQuery, SearchResult};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

/// Collaborators injected into every search call.
#[derive(Clone, Copy)]
pub struct SearchContext<'a> {
    pub transport: &'a dyn Transport,
    pub classifier: &'a dyn Classifier,
}

impl<'a> SearchContext<'a> {
    pub fn new(transport: &'a dyn Transport, classifier: &'a dyn Classifier) -> Self {
        Self {
            transport,
            classifier,
        }
    }
}

/// How a provider expects its secret key on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    None,
    /// `Authorization: <secretKey>` verbatim.
    RawHeader,
    /// `Authorization: Basic <secretKey>`; the key is already encoded.
    Basic,
}

impl AuthScheme {
    pub fn requires_secret_key(&self) -> bool {
        !matches!(self, AuthScheme::None)
    }

    pub fn apply(
        &self,
        provider: &str,
        request: HttpRequest,
        secret_key: Option<&str>,
    ) -> ProviderResult<HttpRequest> {
        if *self == AuthScheme::None {
            return Ok(request);
        }
        let key = secret_key
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ProviderError::MissingSecretKey(provider.to_string()))?;
        Ok(match self {
            AuthScheme::None => request,
            AuthScheme::RawHeader => request.header("Authorization", key),
            AuthScheme::Basic => request.header("Authorization", format!("Basic {}", key)),
        })
    }
}

#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Stable identifier, also used as the file-name namespace.
    fn id(&self) -> &'static str;

    /// Static descriptor with default enablement. Must not perform I/O.
    fn info(&self) -> ProviderInfo;

    fn auth_scheme(&self) -> AuthScheme {
        AuthScheme::None
    }

    /// One upstream call, with failures reported as errors.
    async fn try_search(
        &self,
        ctx: SearchContext<'_>,
        query: &SearchQuery,
    ) -> ProviderResult<SearchResult>;

    /// One upstream call. Failures are logged and degrade to an empty result.
    async fn search(&self, ctx: SearchContext<'_>, query: &SearchQuery) -> SearchResult {
        match self.try_search(ctx, query).await {
            Ok(result) => result,
            Err(err) => {
                warn!(
                    provider = self.id(),
                    category = ?err.category(),
                    "search degraded to empty result: {}",
                    err
                );
                SearchResult::empty(query)
            }
        }
    }
}

pub(crate) fn build_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Send `request` and decode the top-level payload shape.
pub(crate) async fn fetch_json<T: DeserializeOwned>(
    ctx: SearchContext<'_>,
    provider: &str,
    request: HttpRequest,
) -> ProviderResult<T> {
    debug!(provider, url = %request.url, query = ?request.query, "requesting provider");
    let response = ctx.transport.get(request).await?;
    if !response.is_success() {
        return Err(ProviderError::HttpStatus {
            provider: provider.to_string(),
            status: response.status,
        });
    }
    serde_json::from_str(&response.body)
        .map_err(|e| ProviderError::malformed(provider, e.to_string()))
}

/// Decode one list item, skipping it (with a debug log) when malformed.
pub(crate) fn decode_item<T: DeserializeOwned>(provider: &str, item: serde_json::Value) -> Option<T> {
    match serde_json::from_value(item) {
        Ok(decoded) => Some(decoded),
        Err(err) => {
            debug!(provider, "skipping malformed item: {}", err);
            None
        }
    }
}

/// Upstream ids come as strings or numbers depending on the provider.
pub(crate) fn id_string(value: Option<&serde_json::Value>) -> Option<String> {
    match value? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_auth_schemes() {
        let raw = AuthScheme::RawHeader
            .apply("pexels", HttpRequest::get("u"), Some("k1"))
            .unwrap();
        assert_eq!(raw.header_value("Authorization"), Some("k1"));

        let basic = AuthScheme::Basic
            .apply("smms", HttpRequest::get("u"), Some("dXNlcg=="))
            .unwrap();
        assert_eq!(basic.header_value("Authorization"), Some("Basic dXNlcg=="));

        let none = AuthScheme::None
            .apply("nasa", HttpRequest::get("u"), Some("ignored"))
            .unwrap();
        assert!(none.headers.is_empty());
    }

    #[test]
    fn test_missing_key_is_configuration_error() {
        let err = AuthScheme::Basic
            .apply("smms", HttpRequest::get("u"), Some("   "))
            .unwrap_err();
        assert!(matches!(err, ProviderError::MissingSecretKey(ref id) if id == "smms"));
    }

    #[test]
    fn test_build_url_joins_slashes() {
        assert_eq!(build_url("https://a.com/", "/v1/search"), "https://a.com/v1/search");
        assert_eq!(build_url("https://a.com", "search"), "https://a.com/search");
    }

    #[test]
    fn test_id_string_accepts_numbers() {
        assert_eq!(id_string(Some(&json!(123))), Some("123".to_string()));
        assert_eq!(id_string(Some(&json!("abc"))), Some("abc".to_string()));
        assert_eq!(id_string(Some(&json!(null))), None);
        assert_eq!(id_string(None), None);
    }
}
