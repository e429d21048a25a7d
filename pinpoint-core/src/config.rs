use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};
use tracing::debug;

use crate::provider::ProviderId;

/// Settings for a single provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub base_url: String,

    /// Request timeout in seconds. Only Open-Meteo applies one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Optional default provider id, "backend" or "openmeteo".
    pub default_provider: Option<String>,

    /// Example TOML:
    /// [providers.backend]
    /// base_url = "http://localhost:5000"
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

impl Config {
    /// Return the default provider as a strongly-typed ProviderId.
    ///
    /// Falls back to Open-Meteo, which needs no setup.
    pub fn default_provider_id(&self) -> Result<ProviderId> {
        match self.default_provider.as_deref() {
            Some(s) => ProviderId::try_from(s),
            None => Ok(ProviderId::OpenMeteo),
        }
    }

    pub fn provider_config(&self, id: ProviderId) -> Option<&ProviderConfig> {
        self.providers.get(id.as_str())
    }

    /// Store default provider as string.
    pub fn set_default_provider(&mut self, id: ProviderId) {
        self.default_provider = Some(id.as_str().to_string());
    }

    /// Load config from the platform location, or an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to the platform location.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save config to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        debug!(path = %path.display(), "config saved");
        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "pinpoint", "pinpoint")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Set/replace a provider's base URL, and make it the default if none is set yet.
    pub fn upsert_provider_base_url(&mut self, provider_id: ProviderId, base_url: String) {
        let timeout_secs = self.provider_timeout_secs(provider_id);
        self.providers
            .insert(provider_id.as_str().to_string(), ProviderConfig { base_url, timeout_secs });

        if self.default_provider.is_none() {
            self.default_provider = Some(provider_id.to_string());
        }
    }

    /// Set the timeout of an already configured provider. Returns false if it isn't configured.
    pub fn set_provider_timeout_secs(&mut self, provider_id: ProviderId, secs: u64) -> bool {
        match self.providers.get_mut(provider_id.as_str()) {
            Some(cfg) => {
                cfg.timeout_secs = Some(secs);
                true
            }
            None => false,
        }
    }

    /// Returns the base URL for a provider, if present.
    pub fn provider_base_url(&self, provider_id: ProviderId) -> Option<&str> {
        self.provider_config(provider_id).map(|cfg| cfg.base_url.as_str())
    }

    pub fn provider_timeout_secs(&self, provider_id: ProviderId) -> Option<u64> {
        self.provider_config(provider_id).and_then(|cfg| cfg.timeout_secs)
    }

    pub fn is_provider_configured(&self, provider_id: ProviderId) -> bool {
        self.provider_base_url(provider_id).is_some()
    }
}
