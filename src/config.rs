//! Persistent provider configuration (enabled flags, secret keys, endpoints).

use crate::error::{ProviderError, ProviderResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_DIRECTORY: &str = ".wallsource";
pub const PROVIDERS_JSON: &str = "providers.json";
const DEFAULT_SCHEMA_URL: &str = "https://wallsource.dev/schema/providers.json";

/// Prefix of the per-provider secret key override, e.g. `WALLSOURCE_PEXELS_KEY`.
pub const SECRET_KEY_ENV_PREFIX: &str = "WALLSOURCE_";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_START_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 20;

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

/// Root of `providers.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvidersConfig {
    #[serde(rename = "$schema", skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Per-provider call deadline in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub providers: BTreeMap<String, ProviderSettings>,
}

/// User-controlled settings for one provider. Absent fields keep the
/// registry's current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,

    /// Endpoint override, mostly for self-hosted mirrors and tests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            schema: Some(DEFAULT_SCHEMA_URL.to_string()),
            timeout_secs: default_timeout_secs(),
            providers: BTreeMap::new(),
        }
    }
}

impl ProvidersConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn settings_mut(&mut self, id: &str) -> &mut ProviderSettings {
        self.providers.entry(id.to_string()).or_default()
    }

    /// Overlay `WALLSOURCE_<ID>_KEY` variables onto the configured keys.
    pub fn apply_env_overrides(&mut self, ids: &[String]) {
        self.apply_overrides_from(ids, |name| std::env::var(name).ok());
    }

    fn apply_overrides_from(&mut self, ids: &[String], lookup: impl Fn(&str) -> Option<String>) {
        for id in ids {
            if let Some(key) = lookup(&secret_key_env_var(id)).filter(|k| !k.trim().is_empty()) {
                self.settings_mut(id).secret_key = Some(key);
            }
        }
    }

    pub fn validate(&self) -> ProviderResult<()> {
        if self.timeout_secs == 0 {
            return Err(ProviderError::InvalidConfig(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }
        for (id, settings) in &self.providers {
            if let Some(base_url) = &settings.base_url {
                validate_base_url(id, base_url)?;
            }
        }
        Ok(())
    }
}

pub fn secret_key_env_var(id: &str) -> String {
    format!(
        "{}{}_KEY",
        SECRET_KEY_ENV_PREFIX,
        id.to_ascii_uppercase().replace(['-', '.'], "_")
    )
}

pub fn validate_base_url(id: &str, base_url: &str) -> ProviderResult<()> {
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(ProviderError::InvalidConfig(format!(
            "Base URL for provider '{}' must start with http:// or https://",
            id
        )));
    }
    url::Url::parse(base_url).map_err(|e| {
        ProviderError::InvalidConfig(format!("Base URL for provider '{}' is invalid: {}", id, e))
    })?;
    Ok(())
}

/// Loads and saves `providers.json`.
pub struct ConfigStore {
    config_path: PathBuf,
}

impl ConfigStore {
    /// Store under `~/.wallsource/providers.json`.
    pub fn new() -> ProviderResult<Self> {
        Ok(Self {
            config_path: Self::default_config_path()?,
        })
    }

    /// Store at an explicit path (useful for testing)
    pub fn with_path<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            config_path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    fn default_config_path() -> ProviderResult<PathBuf> {
        let home_dir = dirs::home_dir().ok_or_else(|| {
            ProviderError::ConfigLoadError("Cannot find home directory".to_string())
        })?;
        Ok(home_dir.join(CONFIG_DIRECTORY).join(PROVIDERS_JSON))
    }

    /// Load the configuration, falling back to defaults when the file is missing.
    pub fn load(&self) -> ProviderResult<ProvidersConfig> {
        if !self.config_path.exists() {
            return Ok(ProvidersConfig::default());
        }

        let content = fs::read_to_string(&self.config_path)
            .map_err(|e| ProviderError::ConfigLoadError(e.to_string()))?;
        let config: ProvidersConfig = serde_json::from_str(&content)
            .map_err(|e| ProviderError::ConfigLoadError(format!("Invalid JSON: {}", e)))?;
        config
            .validate()
            .map_err(|e| ProviderError::ConfigLoadError(e.to_string()))?;
        Ok(config)
    }

    pub fn save(&self, config: &ProvidersConfig) -> ProviderResult<()> {
        if let Some(dir) = self.config_path.parent() {
            if !dir.exists() {
                fs::create_dir_all(dir)
                    .map_err(|e| ProviderError::ConfigSaveError(e.to_string()))?;

                #[cfg(unix)]
                {
                    use std::os::unix::fs::PermissionsExt;
                    let mut perms = fs::metadata(dir)?.permissions();
                    perms.set_mode(0o700); // rwx------
                    fs::set_permissions(dir, perms)?;
                }
            }
        }

        let json = serde_json::to_string_pretty(config)?;
        fs::write(&self.config_path, json)
            .map_err(|e| ProviderError::ConfigSaveError(e.to_string()))?;

        // Secret keys live in this file.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(&self.config_path)?.permissions();
            perms.set_mode(0o600); // rw-------
            fs::set_permissions(&self.config_path, perms)?;
        }

        Ok(())
    }
}
