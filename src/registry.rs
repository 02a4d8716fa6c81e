//! Provider registry: sole owner of the adapters and their mutable settings.

use crate::classifier::Classifier;
use crate::error::{ProviderError, ProviderResult};
use crate::providers::{ProviderAdapter, SearchContext};
use crate::transport::Transport;
use crate::types::{ProviderInfo, SearchQuery};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// Partial update applied by [`Registry::configure`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,
}

impl ConfigPatch {
    pub fn enable() -> Self {
        Self {
            enabled: Some(true),
            ..Self::default()
        }
    }

    pub fn disable() -> Self {
        Self {
            enabled: Some(false),
            ..Self::default()
        }
    }

    pub fn secret_key(key: impl Into<String>) -> Self {
        Self {
            secret_key: Some(key.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone)]
struct ProviderState {
    enabled: bool,
    secret_key: Option<String>,
}

/// An enabled adapter together with the configuration it was resolved under.
pub struct ResolvedProvider<'a> {
    pub adapter: &'a dyn ProviderAdapter,
    secret_key: Option<String>,
}

impl ResolvedProvider<'_> {
    pub fn id(&self) -> &'static str {
        self.adapter.id()
    }

    /// Copy of `query` carrying a secret key only when the provider needs one.
    /// A key supplied by the caller wins over the configured one.
    pub fn prepare_query(&self, query: &SearchQuery) -> SearchQuery {
        let mut prepared = query.clone();
        prepared.secret_key = if self.adapter.auth_scheme().requires_secret_key() {
            query
                .secret_key
                .clone()
                .filter(|k| !k.trim().is_empty())
                .or_else(|| self.secret_key.clone())
        } else {
            None
        };
        prepared
    }
}

pub struct Registry {
    adapters: Vec<Box<dyn ProviderAdapter>>,
    states: RwLock<HashMap<&'static str, ProviderState>>,
    transport: Arc<dyn Transport>,
    classifier: Arc<dyn Classifier>,
}

impl Registry {
    pub fn new(
        adapters: Vec<Box<dyn ProviderAdapter>>,
        transport: Arc<dyn Transport>,
        classifier: Arc<dyn Classifier>,
    ) -> ProviderResult<Self> {
        let mut states = HashMap::new();
        for adapter in &adapters {
            let info = adapter.info();
            if info.id != adapter.id() {
                return Err(ProviderError::InvalidConfig(format!(
                    "Provider '{}' reports mismatching id '{}'",
                    adapter.id(),
                    info.id
                )));
            }
            let state = ProviderState {
                enabled: info.enabled,
                secret_key: info.secret_key,
            };
            if states.insert(adapter.id(), state).is_some() {
                return Err(ProviderError::InvalidConfig(format!(
                    "Provider '{}' registered twice",
                    adapter.id()
                )));
            }
        }

        Ok(Self {
            adapters,
            states: RwLock::new(states),
            transport,
            classifier,
        })
    }

    pub fn context(&self) -> SearchContext<'_> {
        SearchContext::new(self.transport.as_ref(), self.classifier.as_ref())
    }

    fn adapter(&self, id: &str) -> ProviderResult<&dyn ProviderAdapter> {
        self.adapters
            .iter()
            .find(|a| a.id() == id)
            .map(|a| a.as_ref())
            .ok_or_else(|| ProviderError::ProviderNotFound(id.to_string()))
    }

    fn describe(adapter: &dyn ProviderAdapter, state: Option<&ProviderState>) -> ProviderInfo {
        let mut info = adapter.info();
        if let Some(state) = state {
            info.enabled = state.enabled;
            info.secret_key = state.secret_key.clone();
        }
        info
    }

    /// Descriptors in registration order, reflecting current configuration.
    pub fn list(&self) -> Vec<ProviderInfo> {
        let states = self.states.read();
        self.adapters
            .iter()
            .map(|a| Self::describe(a.as_ref(), states.get(a.id())))
            .collect()
    }

    pub fn info(&self, id: &str) -> ProviderResult<ProviderInfo> {
        let adapter = self.adapter(id)?;
        Ok(Self::describe(adapter, self.states.read().get(adapter.id())))
    }

    /// The adapter for `id`, failing when it is unknown or disabled.
    pub fn get(&self, id: &str) -> ProviderResult<&dyn ProviderAdapter> {
        let adapter = self.adapter(id)?;
        let enabled = self
            .states
            .read()
            .get(adapter.id())
            .is_some_and(|s| s.enabled);
        if !enabled {
            return Err(ProviderError::ProviderDisabled(id.to_string()));
        }
        Ok(adapter)
    }

    /// Resolve every id under a single read lock so the whole batch sees one
    /// configuration.
    pub fn resolve_all<'a>(&'a self, ids: &[String]) -> Vec<(String, ProviderResult<ResolvedProvider<'a>>)> {
        let states = self.states.read();
        ids.iter()
            .map(|id| {
                let resolved = self.adapter(id).and_then(|adapter| {
                    let state = states
                        .get(adapter.id())
                        .ok_or_else(|| ProviderError::ProviderNotFound(id.clone()))?;
                    if !state.enabled {
                        return Err(ProviderError::ProviderDisabled(id.clone()));
                    }
                    Ok(ResolvedProvider {
                        adapter,
                        secret_key: state.secret_key.clone(),
                    })
                });
                (id.clone(), resolved)
            })
            .collect()
    }

    pub fn resolve(&self, id: &str) -> ProviderResult<ResolvedProvider<'_>> {
        let (_, resolved) = self
            .resolve_all(&[id.to_string()])
            .pop()
            .ok_or_else(|| ProviderError::ProviderNotFound(id.to_string()))?;
        resolved
    }

    /// Update `enabled` and/or the secret key. The change applies entirely or
    /// not at all.
    pub fn configure(&self, id: &str, patch: ConfigPatch) -> ProviderResult<ProviderInfo> {
        let adapter = self.adapter(id)?;
        let requires_key = adapter.auth_scheme().requires_secret_key();

        let mut states = self.states.write();
        let current = states
            .get(adapter.id())
            .cloned()
            .ok_or_else(|| ProviderError::ProviderNotFound(id.to_string()))?;

        let mut next = current;
        if let Some(key) = patch.secret_key {
            let key = key.trim().to_string();
            next.secret_key = (!key.is_empty()).then_some(key);
        }
        if let Some(enabled) = patch.enabled {
            next.enabled = enabled;
        }

        if next.enabled && requires_key && next.secret_key.is_none() {
            return Err(ProviderError::MissingSecretKey(id.to_string()));
        }

        info!(
            provider = adapter.id(),
            enabled = next.enabled,
            has_secret_key = next.secret_key.is_some(),
            "provider configured"
        );
        states.insert(adapter.id(), next);
        drop(states);

        self.info(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::DefaultClassifier;
    use crate::config::ProvidersConfig;
    use crate::providers::builtin_adapters;
    use crate::providers::test_support::RecordingTransport;

    fn registry_with(transport: Arc<RecordingTransport>) -> Registry {
        Registry::new(
            builtin_adapters(&ProvidersConfig::default()),
            transport,
            Arc::new(DefaultClassifier),
        )
        .unwrap()
    }

    fn registry() -> Registry {
        registry_with(Arc::new(RecordingTransport::ok("{}")))
    }

    #[test]
    fn test_list_keeps_registration_order() {
        let ids: Vec<_> = registry().list().into_iter().map(|i| i.id).collect();
        assert_eq!(ids, vec!["nasa", "openverse", "pexels", "smms"]);
    }

    #[test]
    fn test_duplicate_ids_are_rejected() {
        let mut adapters = builtin_adapters(&ProvidersConfig::default());
        adapters.extend(builtin_adapters(&ProvidersConfig::default()));
        let result = Registry::new(
            adapters,
            Arc::new(RecordingTransport::ok("{}")),
            Arc::new(DefaultClassifier),
        );
        assert!(matches!(result, Err(ProviderError::InvalidConfig(_))));
    }

    #[test]
    fn test_get_unknown_and_disabled() {
        let registry = registry();
        assert!(registry.get("nasa").is_ok());
        assert!(matches!(
            registry.get("flickr"),
            Err(ProviderError::ProviderNotFound(_))
        ));
        assert!(matches!(
            registry.get("pexels"),
            Err(ProviderError::ProviderDisabled(_))
        ));
    }

    #[test]
    fn test_enable_without_key_fails_before_any_call() {
        let transport = Arc::new(RecordingTransport::ok("{}"));
        let registry = registry_with(transport.clone());

        let err = registry.configure("pexels", ConfigPatch::enable()).unwrap_err();
        assert!(matches!(err, ProviderError::MissingSecretKey(_)));
        assert!(err.is_configuration());
        assert!(!registry.info("pexels").unwrap().enabled);
        assert_eq!(transport.call_count(), 0);
    }

    #[test]
    fn test_configure_key_then_enable() {
        let registry = registry();
        registry
            .configure("pexels", ConfigPatch::secret_key("abc"))
            .unwrap();
        let info = registry.configure("pexels", ConfigPatch::enable()).unwrap();
        assert!(info.enabled);
        assert_eq!(info.secret_key.as_deref(), Some("abc"));
        assert!(registry.get("pexels").is_ok());
    }

    #[test]
    fn test_clearing_key_of_enabled_provider_is_rejected_atomically() {
        let registry = registry();
        registry
            .configure(
                "smms",
                ConfigPatch {
                    enabled: Some(true),
                    secret_key: Some("k".into()),
                },
            )
            .unwrap();

        let err = registry.configure("smms", ConfigPatch::secret_key(""));
        assert!(err.is_err());
        let info = registry.info("smms").unwrap();
        assert!(info.enabled);
        assert_eq!(info.secret_key.as_deref(), Some("k"));
    }

    #[test]
    fn test_disable_does_not_need_key() {
        let registry = registry();
        let info = registry.configure("nasa", ConfigPatch::disable()).unwrap();
        assert!(!info.enabled);
        assert!(registry.configure("pexels", ConfigPatch::disable()).is_ok());
    }

    #[test]
    fn test_prepare_query_injects_key_only_where_required() {
        let registry = registry();
        registry
            .configure(
                "pexels",
                ConfigPatch {
                    enabled: Some(true),
                    secret_key: Some("stored".into()),
                },
            )
            .unwrap();

        let query = SearchQuery::new("sky").with_secret_key("stray");
        let nasa = registry.resolve("nasa").unwrap();
        assert_eq!(nasa.prepare_query(&query).secret_key, None);

        let pexels = registry.resolve("pexels").unwrap();
        assert_eq!(
            pexels.prepare_query(&query).secret_key.as_deref(),
            Some("stray")
        );
        assert_eq!(
            pexels
                .prepare_query(&SearchQuery::new("sky"))
                .secret_key
                .as_deref(),
            Some("stored")
        );
    }
}
