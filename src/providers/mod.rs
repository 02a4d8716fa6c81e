//! Built-in image providers.
//!
//! Each adapter translates the canonical [`SearchQuery`](crate::types::SearchQuery)
//! into its upstream's parameters and normalizes the response into
//! [`ImageResult`](crate::types::ImageResult)s.

pub mod nasa;
pub mod openverse;
pub mod pexels;
pub mod smms;
pub mod source;

pub use nasa::NasaSource;
pub use openverse::OpenverseSource;
pub use pexels::PexelsSource;
pub use smms::SmmsSource;
pub use source::{AuthScheme, ProviderAdapter, SearchContext};

use crate::config::ProvidersConfig;

/// All built-in adapters in display order, honouring base URL overrides.
pub fn builtin_adapters(config: &ProvidersConfig) -> Vec<Box<dyn ProviderAdapter>> {
    let base_url = |id: &str| {
        config
            .providers
            .get(id)
            .and_then(|settings| settings.base_url.clone())
    };

    let mut adapters: Vec<Box<dyn ProviderAdapter>> = Vec::new();
    adapters.push(Box::new(match base_url(nasa::ID) {
        Some(url) => NasaSource::with_base_url(url),
        None => NasaSource::new(),
    }));
    adapters.push(Box::new(match base_url(openverse::ID) {
        Some(url) => OpenverseSource::with_base_url(url),
        None => OpenverseSource::new(),
    }));
    adapters.push(Box::new(match base_url(pexels::ID) {
        Some(url) => PexelsSource::with_base_url(url),
        None => PexelsSource::new(),
    }));
    adapters.push(Box::new(match base_url(smms::ID) {
        Some(url) => SmmsSource::with_base_url(url),
        None => SmmsSource::new(),
    }));
    adapters
}
