//! Facade consumed by the UI/IPC layer.

use crate::classifier::{Classifier, DefaultClassifier};
use crate::config::ProvidersConfig;
use crate::dispatcher::{DispatchResult, Dispatcher};
use crate::error::{ProviderError, ProviderResult};
use crate::providers::builtin_adapters;
use crate::registry::{ConfigPatch, Registry};
use crate::transport::{ReqwestTransport, Transport};
use crate::types::{ProviderInfo, SearchQuery, SearchResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// `searchImages` payload: the target provider plus the canonical query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub provider_id: String,
    #[serde(flatten)]
    pub query: SearchQuery,
}

pub struct ImageSearchService {
    dispatcher: Dispatcher,
}

impl ImageSearchService {
    pub fn new(registry: Arc<Registry>, timeout: Duration) -> Self {
        Self {
            dispatcher: Dispatcher::new(registry, timeout),
        }
    }

    /// Built-in providers over a `reqwest` transport, configured from `config`.
    pub fn from_config(config: &ProvidersConfig) -> ProviderResult<Self> {
        let transport = Arc::new(ReqwestTransport::with_timeout(config.timeout())?);
        Self::with_transport(config, transport)
    }

    pub fn with_transport(
        config: &ProvidersConfig,
        transport: Arc<dyn Transport>,
    ) -> ProviderResult<Self> {
        Self::with_collaborators(config, transport, Arc::new(DefaultClassifier))
    }

    pub fn with_collaborators(
        config: &ProvidersConfig,
        transport: Arc<dyn Transport>,
        classifier: Arc<dyn Classifier>,
    ) -> ProviderResult<Self> {
        config.validate()?;
        let registry = Registry::new(builtin_adapters(config), transport, classifier)?;
        let service = Self::new(Arc::new(registry), config.timeout());
        service.apply_config(config)?;
        Ok(service)
    }

    pub fn registry(&self) -> &Registry {
        self.dispatcher.registry()
    }

    /// Search a single provider. Configuration problems (unknown or disabled
    /// provider, missing key, invalid paging) are errors; upstream failures
    /// yield an empty result.
    pub async fn search_images(&self, request: &SearchRequest) -> ProviderResult<SearchResult> {
        self.dispatcher
            .search_one(&request.provider_id, &request.query)
            .await
    }

    /// Search several providers concurrently.
    pub async fn search_many(&self, provider_ids: &[String], query: &SearchQuery) -> DispatchResult {
        self.dispatcher.dispatch(provider_ids, query).await
    }

    /// Every provider with its current configuration and capability flags.
    pub fn resource_map(&self) -> BTreeMap<String, ProviderInfo> {
        self.registry()
            .list()
            .into_iter()
            .map(|info| (info.id.clone(), info))
            .collect()
    }

    pub fn configure(&self, provider_id: &str, patch: ConfigPatch) -> ProviderResult<ProviderInfo> {
        self.registry().configure(provider_id, patch)
    }

    /// Push persisted settings into the registry. Unknown ids are ignored so an
    /// old config file keeps working after a provider is removed, and a
    /// provider enabled without its secret key stays disabled.
    pub fn apply_config(&self, config: &ProvidersConfig) -> ProviderResult<()> {
        for (id, settings) in &config.providers {
            let patch = ConfigPatch {
                enabled: settings.enabled,
                secret_key: settings.secret_key.clone(),
            };
            if patch == ConfigPatch::default() {
                continue;
            }
            match self.configure(id, patch.clone()) {
                Ok(_) => {}
                Err(ProviderError::ProviderNotFound(_)) => {
                    warn!(provider = %id, "ignoring settings for unknown provider");
                }
                Err(ProviderError::MissingSecretKey(_)) => {
                    warn!(provider = %id, "enabled without a secret key, keeping it disabled");
                    self.configure(
                        id,
                        ConfigPatch {
                            enabled: Some(false),
                            ..patch
                        },
                    )?;
                }
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }
}
