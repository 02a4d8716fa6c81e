//! Concurrent fan-out of one query to several providers.

use crate::error::{ProviderError, ProviderResult};
use crate::registry::{Registry, ResolvedProvider};
use crate::types::{SearchQuery, SearchResult};
use futures::future::join_all;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Outcome of one provider's call inside a dispatch.
#[derive(Debug)]
pub enum ProviderOutcome {
    Ok(SearchResult),
    /// The call failed upstream; `result` is the empty fallback.
    Degraded {
        result: SearchResult,
        error: ProviderError,
    },
    /// Never called: unknown, disabled, or missing its secret key.
    Rejected(ProviderError),
}

impl ProviderOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, ProviderOutcome::Ok(_))
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, ProviderOutcome::Degraded { .. })
    }

    /// The usable result, including the empty fallback of a degraded call.
    pub fn result(&self) -> Option<&SearchResult> {
        match self {
            ProviderOutcome::Ok(result) | ProviderOutcome::Degraded { result, .. } => Some(result),
            ProviderOutcome::Rejected(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ProviderError> {
        match self {
            ProviderOutcome::Ok(_) => None,
            ProviderOutcome::Degraded { error, .. } | ProviderOutcome::Rejected(error) => {
                Some(error)
            }
        }
    }
}

/// Keyed by provider id; iteration order says nothing about completion order.
pub type DispatchResult = BTreeMap<String, ProviderOutcome>;

pub struct Dispatcher {
    registry: Arc<Registry>,
    timeout: Duration,
}

impl Dispatcher {
    pub fn new(registry: Arc<Registry>, timeout: Duration) -> Self {
        Self { registry, timeout }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Query every provider in `provider_ids` concurrently. The returned map has
    /// exactly one entry per distinct requested id.
    pub async fn dispatch(&self, provider_ids: &[String], query: &SearchQuery) -> DispatchResult {
        let mut outcomes = DispatchResult::new();
        if let Err(err) = query.validate() {
            let message = match err {
                ProviderError::InvalidQuery(message) => message,
                other => other.to_string(),
            };
            for id in provider_ids {
                outcomes.insert(
                    id.clone(),
                    ProviderOutcome::Rejected(ProviderError::InvalidQuery(message.clone())),
                );
            }
            return outcomes;
        }

        let mut ids: Vec<String> = Vec::with_capacity(provider_ids.len());
        for id in provider_ids {
            if !ids.contains(id) {
                ids.push(id.clone());
            }
        }

        let mut tasks = Vec::new();
        for (id, resolved) in self.registry.resolve_all(&ids) {
            match resolved {
                Ok(provider) => tasks.push(self.run_one(id, provider, query)),
                Err(err) => {
                    debug!(provider = %id, "provider rejected before dispatch: {}", err);
                    outcomes.insert(id, ProviderOutcome::Rejected(err));
                }
            }
        }

        for (id, outcome) in join_all(tasks).await {
            outcomes.insert(id, outcome);
        }
        outcomes
    }

    /// Single-provider search. Configuration problems are returned as errors;
    /// upstream failures degrade to an empty result.
    pub async fn search_one(
        &self,
        provider_id: &str,
        query: &SearchQuery,
    ) -> ProviderResult<SearchResult> {
        query.validate()?;
        let provider = self.registry.resolve(provider_id)?;
        match self.run_one(provider_id.to_string(), provider, query).await.1 {
            ProviderOutcome::Ok(result) => Ok(result),
            ProviderOutcome::Degraded { result, .. } => Ok(result),
            ProviderOutcome::Rejected(err) => Err(err),
        }
    }

    async fn run_one(
        &self,
        id: String,
        provider: ResolvedProvider<'_>,
        query: &SearchQuery,
    ) -> (String, ProviderOutcome) {
        let prepared = provider.prepare_query(query);
        let ctx = self.registry.context();
        let call = provider.adapter.try_search(ctx, &prepared);

        let outcome = match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(result)) => ProviderOutcome::Ok(result),
            Ok(Err(err)) if err.is_configuration() => ProviderOutcome::Rejected(err),
            Ok(Err(err)) => degraded(&id, query, err),
            Err(_) => degraded(
                &id,
                query,
                ProviderError::Timeout {
                    provider: id.clone(),
                    timeout_ms: millis(self.timeout),
                },
            ),
        };
        (id, outcome)
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn degraded(id: &str, query: &SearchQuery, error: ProviderError) -> ProviderOutcome {
    warn!(
        provider = id,
        category = ?error.category(),
        "provider call degraded: {}",
        error
    );
    ProviderOutcome::Degraded {
        result: SearchResult::empty(query),
        error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::DefaultClassifier;
    use crate::config::ProvidersConfig;
    use crate::error::ErrorCategory;
    use crate::providers::builtin_adapters;
    use crate::providers::test_support::{FailingTransport, RecordingTransport};
    use crate::registry::ConfigPatch;
    use crate::transport::Transport;

    const OPENVERSE_BODY: &str = r#"{"result_count": 1, "results": [
        {"id": "a", "url": "https://x.org/a.jpg", "width": 10, "height": 5}
    ]}"#;

    fn dispatcher(transport: Arc<dyn Transport>) -> Dispatcher {
        let registry = Registry::new(
            builtin_adapters(&ProvidersConfig::default()),
            transport,
            Arc::new(DefaultClassifier),
        )
        .unwrap();
        Dispatcher::new(Arc::new(registry), Duration::from_secs(5))
    }

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_one_entry_per_requested_provider() {
        let dispatcher = dispatcher(Arc::new(RecordingTransport::ok(OPENVERSE_BODY)));
        let result = dispatcher
            .dispatch(
                &ids(&["openverse", "pexels", "flickr", "openverse"]),
                &SearchQuery::new("a"),
            )
            .await;

        assert_eq!(result.len(), 3);
        assert!(result["openverse"].is_ok());
        assert_eq!(result["openverse"].result().unwrap().list.len(), 1);
        assert!(matches!(
            result["pexels"],
            ProviderOutcome::Rejected(ProviderError::ProviderDisabled(_))
        ));
        assert!(matches!(
            result["flickr"],
            ProviderOutcome::Rejected(ProviderError::ProviderNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_transport_failure_is_degraded_not_raised() {
        let dispatcher = dispatcher(Arc::new(FailingTransport));
        let query = SearchQuery::new("a").page(3, 7);

        let result = dispatcher.dispatch(&ids(&["nasa"]), &query).await;
        let outcome = &result["nasa"];
        assert!(outcome.is_degraded());
        assert_eq!(outcome.result(), Some(&SearchResult::empty(&query)));
        assert_eq!(
            outcome.error().map(|e| e.category()),
            Some(ErrorCategory::Transport)
        );

        let single = dispatcher.search_one("nasa", &query).await.unwrap();
        assert!(single.list.is_empty());
    }

    #[tokio::test]
    async fn test_search_one_surfaces_configuration_errors() {
        let transport = Arc::new(RecordingTransport::ok(OPENVERSE_BODY));
        let dispatcher = dispatcher(transport.clone());

        let err = dispatcher
            .search_one("pexels", &SearchQuery::new("a"))
            .await
            .unwrap_err();
        assert!(err.is_configuration());

        let err = dispatcher
            .search_one("openverse", &SearchQuery::new("a").page(1, 0))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::InvalidQuery(_)));
        assert_eq!(transport.call_count(), 0);
    }

    #[test]
    fn test_timeout_millis_saturates() {
        assert_eq!(millis(Duration::from_millis(1500)), 1500);
        assert_eq!(millis(Duration::MAX), u64::MAX);
    }

    #[tokio::test]
    async fn test_configured_key_reaches_the_wire() {
        let transport = Arc::new(RecordingTransport::ok(r#"{"photos": []}"#));
        let dispatcher = dispatcher(transport.clone());
        dispatcher
            .registry()
            .configure(
                "pexels",
                ConfigPatch {
                    enabled: Some(true),
                    secret_key: Some("live-key".into()),
                },
            )
            .unwrap();

        let result = dispatcher
            .dispatch(&ids(&["pexels"]), &SearchQuery::new("a"))
            .await;
        assert!(result["pexels"].is_ok());
        assert_eq!(
            transport.last_request().header_value("Authorization"),
            Some("live-key")
        );
    }
}
