//! Wallsource Library
//!
//! Aggregates wallpaper/image search across remote providers (NASA Image
//! Library, Openverse, Pexels, SM.MS) behind one normalized result shape.
//!
//! ```no_run
//! use wallsource::{ImageSearchService, ProvidersConfig, SearchQuery, SearchRequest};
//!
//! # async fn run() -> wallsource::ProviderResult<()> {
//! let service = ImageSearchService::from_config(&ProvidersConfig::default())?;
//! let request = SearchRequest {
//!     provider_id: "nasa".into(),
//!     query: SearchQuery::new("nebula"),
//! };
//! let page = service.search_images(&request).await?;
//! println!("{} of {}", page.list.len(), page.total);
//! # Ok(())
//! # }
//! ```

pub mod classifier;
pub mod commands;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod merge;
pub mod normalize;
pub mod pagination;
pub mod providers;
pub mod registry;
pub mod service;
pub mod transport;
pub mod types;
pub mod utils;

// Re-export commonly used types for convenience
pub use classifier::{Classifier, DefaultClassifier, Quality};
pub use config::{ConfigStore, ProviderSettings, ProvidersConfig};
pub use dispatcher::{DispatchResult, Dispatcher, ProviderOutcome};
pub use error::{ErrorCategory, ProviderError, ProviderResult};
pub use merge::{merge, MergePolicy};
pub use pagination::{reconcile_total, PageCounters};
pub use providers::{builtin_adapters, AuthScheme, ProviderAdapter, SearchContext};
pub use registry::{ConfigPatch, Registry, ResolvedProvider};
pub use service::{ImageSearchService, SearchRequest};
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};
pub use types::{ImageResult, Orientation, ProviderInfo, SearchQuery, SearchResult};
