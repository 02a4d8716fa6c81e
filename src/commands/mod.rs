//! Command handlers for the `wallsource` binary.

pub mod parser;

pub use parser::{Cli, Commands};

use crate::config::{ConfigStore, ProvidersConfig};
use crate::dispatcher::ProviderOutcome;
use crate::error::ProviderError;
use crate::merge::{merge, MergePolicy};
use crate::registry::ConfigPatch;
use crate::service::{ImageSearchService, SearchRequest};
use crate::types::{ImageResult, Orientation, ProviderInfo, SearchQuery};
use anyhow::{anyhow, Context, Result};
use colored::Colorize;
use std::collections::BTreeMap;

const REDACTED: &str = "********";

/// Everything a command needs: the persisted config and a service built from it.
pub struct CommandContext {
    store: ConfigStore,
    config: ProvidersConfig,
    service: ImageSearchService,
}

impl CommandContext {
    pub fn load(store: ConfigStore) -> Result<Self> {
        let config = store
            .load()
            .with_context(|| format!("Failed to load {}", store.path().display()))?;

        // Environment keys apply to this run only and are never written back.
        let mut effective = config.clone();
        let ids: Vec<String> = crate::providers::builtin_adapters(&config)
            .iter()
            .map(|a| a.id().to_string())
            .collect();
        effective.apply_env_overrides(&ids);
        let service = ImageSearchService::from_config(&effective)?;
        Ok(Self {
            store,
            config,
            service,
        })
    }

    pub async fn execute(&mut self, command: Commands) -> Result<()> {
        match command {
            Commands::Providers { json } => self.list_providers(json),
            Commands::Search {
                keywords,
                providers,
                page,
                page_size,
                orientation,
                merge,
                secret_key,
                json,
            } => {
                let mut query = SearchQuery::new(keywords.join(" ")).page(page, page_size);
                if let Some(orientation) = orientation {
                    query = query.with_orientation(orientation);
                }
                query.secret_key = secret_key;
                self.search(providers, query, merge, json).await
            }
            Commands::Configure {
                id,
                enable,
                disable,
                secret_key,
            } => {
                let enabled = match (enable, disable) {
                    (true, _) => Some(true),
                    (_, true) => Some(false),
                    _ => None,
                };
                self.configure(&id, ConfigPatch { enabled, secret_key })
            }
        }
    }

    fn list_providers(&self, json: bool) -> Result<()> {
        if json {
            let map: BTreeMap<String, ProviderInfo> = self
                .service
                .resource_map()
                .into_iter()
                .map(|(id, info)| (id, redacted(info)))
                .collect();
            println!("{}", serde_json::to_string_pretty(&map)?);
            return Ok(());
        }

        for info in self.service.registry().list() {
            print_provider(&info);
        }
        Ok(())
    }

    async fn search(
        &self,
        providers: Vec<String>,
        query: SearchQuery,
        policy: MergePolicy,
        json: bool,
    ) -> Result<()> {
        let targets = if providers.is_empty() {
            self.service
                .registry()
                .list()
                .into_iter()
                .filter(|info| info.enabled && info.support_search)
                .map(|info| info.id)
                .collect()
        } else {
            providers
        };

        match targets.as_slice() {
            [] => Err(anyhow!("No enabled provider supports search")),
            [single] => {
                let request = SearchRequest {
                    provider_id: single.clone(),
                    query,
                };
                let result = self.service.search_images(&request).await?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&result)?);
                } else {
                    println!(
                        "🔍 {} results from {} (page {}, total {})",
                        result.list.len(),
                        single.cyan(),
                        result.start_page,
                        result.total
                    );
                    result.list.iter().for_each(print_image);
                }
                Ok(())
            }
            many => {
                let outcomes = self.service.search_many(many, &query).await;
                for (id, outcome) in &outcomes {
                    match outcome {
                        ProviderOutcome::Ok(result) => {
                            tracing::debug!(provider = %id, total = result.total, "provider ok")
                        }
                        ProviderOutcome::Degraded { error, .. } => {
                            eprintln!("{} {}: {}", "degraded".yellow(), id, error)
                        }
                        ProviderOutcome::Rejected(error) => {
                            eprintln!("{} {}: {}", "skipped".red(), id, error)
                        }
                    }
                }

                let merged = merge(&outcomes, many, policy);
                if json {
                    println!("{}", serde_json::to_string_pretty(&merged)?);
                } else {
                    println!("🔍 {} results from {} providers", merged.len(), many.len());
                    merged.iter().for_each(print_image);
                }
                Ok(())
            }
        }
    }

    fn configure(&mut self, id: &str, patch: ConfigPatch) -> Result<()> {
        let requires_key = self.service.registry().info(id)?.require_secret_key;

        let mut settings = self.config.providers.get(id).cloned().unwrap_or_default();
        if let Some(enabled) = patch.enabled {
            settings.enabled = Some(enabled);
        }
        if let Some(key) = &patch.secret_key {
            let key = key.trim();
            settings.secret_key = (!key.is_empty()).then(|| key.to_string());
        }

        // Checked against the file alone; environment keys are never saved.
        if requires_key && settings.enabled == Some(true) && settings.secret_key.is_none() {
            return Err(ProviderError::MissingSecretKey(id.to_string()).into());
        }

        let info = self.service.configure(id, patch)?;
        self.config.providers.insert(id.to_string(), settings);
        self.store.save(&self.config)?;

        println!("✅ Saved {}", self.store.path().display());
        print_provider(&info);
        Ok(())
    }
}

/// Stored keys never reach stdout; the mask only signals that one is set.
fn redacted(mut info: ProviderInfo) -> ProviderInfo {
    if info.has_secret_key() {
        info.secret_key = Some(REDACTED.to_string());
    } else {
        info.secret_key = None;
    }
    info
}

fn print_provider(info: &ProviderInfo) {
    let status = if info.enabled {
        "enabled".green()
    } else {
        "disabled".dimmed()
    };
    let key = match (info.require_secret_key, info.has_secret_key()) {
        (false, _) => "no key needed".normal(),
        (true, true) => "key set".green(),
        (true, false) => "key missing".red(),
    };
    println!(
        "{:<10} {:<20} {:<9} {:<14} {}",
        info.id.cyan(),
        info.label,
        status,
        key,
        info.site.dimmed()
    );
}

fn print_image(image: &ImageResult) {
    let orientation = if image.is_landscape {
        Orientation::Landscape
    } else {
        Orientation::Portrait
    };
    println!(
        "{:<7} {:>5}x{:<5} {:<9} {}",
        image.quality.to_string().bold(),
        image.width,
        image.height,
        orientation,
        image.url
    );
    if !image.title.is_empty() {
        println!("        {}", image.title.dimmed());
    }
}
