use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};
use wallsource::{
    builtin_adapters, merge, ConfigPatch, DefaultClassifier, ErrorCategory, HttpRequest,
    HttpResponse, ImageSearchService, MergePolicy, ProviderError, ProviderOutcome,
    ProviderResult, ProvidersConfig, Registry, SearchQuery, SearchRequest, Transport,
};

const NASA_BODY: &str = r#"{"collection": {
    "items": [{
        "data": [{"nasa_id": "as11-40-5874", "title": "Footprint", "center": "JSC"}],
        "links": [{"href": "https://images-assets.nasa.gov/image/as11/orig.jpg", "rel": "canonical", "width": 3840, "height": 2160}]
    }],
    "metadata": {"total_hits": 1}
}}"#;

const PEXELS_BODY: &str = r#"{"total_results": 2, "photos": [
    {"id": 1, "width": 1080, "height": 1920, "url": "https://www.pexels.com/photo/1/",
     "photographer": "Ana", "alt": "Tall", "src": {"original": "https://images.pexels.com/photos/1/a.jpeg"}},
    {"id": 2, "width": 7680, "height": 4320, "url": "https://www.pexels.com/photo/2/",
     "photographer": "Ben", "alt": "Wide", "src": {"original": "https://images.pexels.com/photos/2/b.png"}}
]}"#;

/// Routes on host name; requests to `stall_host` never finish in time.
struct RoutingTransport {
    stall_host: Option<&'static str>,
    seen: Mutex<Vec<String>>,
}

impl RoutingTransport {
    fn new(stall_host: Option<&'static str>) -> Self {
        Self {
            stall_host,
            seen: Mutex::new(Vec::new()),
        }
    }

    fn call_count(&self) -> usize {
        self.seen.lock().len()
    }
}

#[async_trait]
impl Transport for RoutingTransport {
    async fn get(&self, request: HttpRequest) -> ProviderResult<HttpResponse> {
        self.seen.lock().push(request.url.clone());

        if self.stall_host.is_some_and(|host| request.url.contains(host)) {
            tokio::time::sleep(Duration::from_secs(30)).await;
        }

        let body = if request.url.contains("nasa") {
            NASA_BODY
        } else if request.url.contains("pexels") {
            PEXELS_BODY
        } else {
            r#"{"result_count": 0, "results": []}"#
        };
        Ok(HttpResponse {
            status: 200,
            body: body.to_string(),
        })
    }
}

fn service(transport: Arc<RoutingTransport>, timeout: Duration) -> ImageSearchService {
    let registry = Registry::new(
        builtin_adapters(&ProvidersConfig::default()),
        transport,
        Arc::new(DefaultClassifier),
    )
    .expect("builtin adapters have distinct ids");
    ImageSearchService::new(Arc::new(registry), timeout)
}

fn ids(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn slow_provider_degrades_without_blocking_the_rest() {
    let transport = Arc::new(RoutingTransport::new(Some("openverse")));
    let service = service(transport.clone(), Duration::from_millis(100));
    assert_ok!(service.configure("pexels", ConfigPatch {
        enabled: Some(true),
        secret_key: Some("pexels-key".into()),
    }));

    let requested = ids(&["nasa", "openverse", "pexels"]);
    let outcomes = service
        .search_many(&requested, &SearchQuery::new("moon"))
        .await;

    assert_eq!(outcomes.len(), 3);
    assert_eq!(outcomes.values().filter(|o| o.is_degraded()).count(), 1);
    assert!(matches!(
        outcomes["openverse"].error(),
        Some(ProviderError::Timeout { .. })
    ));
    assert!(outcomes["openverse"].result().unwrap().list.is_empty());
    assert_eq!(outcomes["nasa"].result().unwrap().list.len(), 1);
    assert_eq!(outcomes["pexels"].result().unwrap().total, 2);
    assert_eq!(transport.call_count(), 3);
}

#[tokio::test]
async fn disabled_and_unknown_providers_are_rejected_per_entry() {
    let transport = Arc::new(RoutingTransport::new(None));
    let service = service(transport.clone(), Duration::from_secs(5));

    let requested = ids(&["nasa", "smms", "flickr", "nasa"]);
    let outcomes = service
        .search_many(&requested, &SearchQuery::new("moon"))
        .await;

    assert_eq!(outcomes.len(), 3);
    assert!(outcomes["nasa"].is_ok());
    assert!(matches!(
        outcomes["smms"],
        ProviderOutcome::Rejected(ProviderError::ProviderDisabled(_))
    ));
    assert!(matches!(
        outcomes["flickr"],
        ProviderOutcome::Rejected(ProviderError::ProviderNotFound(_))
    ));
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test]
async fn enabling_keyed_provider_without_key_changes_nothing() {
    let transport = Arc::new(RoutingTransport::new(None));
    let service = service(transport.clone(), Duration::from_secs(5));

    let err = assert_err!(service.configure("pexels", ConfigPatch::enable()));
    assert_eq!(err.category(), ErrorCategory::Configuration);
    assert!(!service.resource_map()["pexels"].enabled);

    let request = SearchRequest {
        provider_id: "pexels".into(),
        query: SearchQuery::new("forest"),
    };
    let err = assert_err!(service.search_images(&request).await);
    assert!(matches!(err, ProviderError::ProviderDisabled(_)));
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn zero_page_size_is_rejected_before_any_request() {
    let transport = Arc::new(RoutingTransport::new(None));
    let service = service(transport.clone(), Duration::from_secs(5));
    let query = SearchQuery::new("moon").page(1, 0);

    let outcomes = service.search_many(&ids(&["nasa", "openverse"]), &query).await;
    assert!(outcomes
        .values()
        .all(|o| matches!(o, ProviderOutcome::Rejected(ProviderError::InvalidQuery(_)))));
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn quality_first_merge_puts_largest_images_first() {
    let transport = Arc::new(RoutingTransport::new(None));
    let service = service(transport, Duration::from_secs(5));
    assert_ok!(service.configure("pexels", ConfigPatch {
        enabled: Some(true),
        secret_key: Some("pexels-key".into()),
    }));

    let order = ids(&["nasa", "pexels"]);
    let outcomes = service.search_many(&order, &SearchQuery::new("moon")).await;
    let merged = merge(&outcomes, &order, MergePolicy::QualityFirst);

    let names: Vec<&str> = merged.iter().map(|i| i.file_name.as_str()).collect();
    assert_eq!(names, vec!["pexels_2", "nasa_as11-40-5874", "pexels_1"]);
    assert_eq!(merged[0].quality.label(), "8K");
    assert!(!merged[2].is_landscape);
}
