use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use crate::{advisor::gemini::DEFAULT_MODEL, model::UnitGroup, provider::ProviderId};

/// Configuration for a single provider (e.g., API key).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub api_key: String,

    /// Model identifier, only meaningful for text-generation providers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,

    /// Shared secret callers must send as `token`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,

    pub unit_group: UnitGroup,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            api_token: None,
            unit_group: UnitGroup::Metric,
        }
    }
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    /// Example TOML:
    /// [providers.visualcrossing]
    /// api_key = "..."
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

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

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-advice", "weather-advice-server")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Overlay values from the process environment.
    pub fn apply_process_env(&mut self) -> Result<()> {
        self.apply_env(|name| std::env::var(name).ok())
    }

    /// Overlay values from `lookup`; variables that are set win over file values.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup("API_TOKEN") {
            self.server.api_token = Some(token);
        }
        if let Some(key) = lookup("WEATHER_API_KEY") {
            self.set_provider_api_key(ProviderId::VisualCrossing, key);
        }
        if let Some(key) = lookup("GEMINI_API_KEY") {
            self.set_provider_api_key(ProviderId::Gemini, key);
        }
        if let Some(model) = lookup("GEMINI_MODEL") {
            self.set_provider_model(ProviderId::Gemini, model);
        }
        if let Some(units) = lookup("UNIT_GROUP") {
            self.server.unit_group = UnitGroup::try_from(units.as_str())?;
        }
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .parse()
                .with_context(|| format!("Invalid PORT value '{port}'"))?;
        }

        Ok(())
    }

    pub fn provider_config(&self, id: ProviderId) -> Option<&ProviderConfig> {
        self.providers.get(id.as_str())
    }

    /// Set/replace a provider API key, keeping any configured model.
    pub fn set_provider_api_key(&mut self, provider_id: ProviderId, api_key: String) {
        match self.providers.get_mut(provider_id.as_str()) {
            Some(cfg) => cfg.api_key = api_key,
            None => {
                let cfg = ProviderConfig { api_key, model: None };
                self.providers.insert(provider_id.as_str().to_string(), cfg);
            }
        }
    }

    /// Set the model for a provider; the key stays empty if none was configured.
    pub fn set_provider_model(&mut self, provider_id: ProviderId, model: String) {
        self.providers
            .entry(provider_id.as_str().to_string())
            .or_insert_with(|| ProviderConfig { api_key: String::new(), model: None })
            .model = Some(model);
    }

    /// Returns API key for a provider, if present.
    pub fn provider_api_key(&self, provider_id: ProviderId) -> Option<&str> {
        self.provider_config(provider_id).map(|cfg| cfg.api_key.as_str())
    }

    pub fn is_provider_configured(&self, provider_id: ProviderId) -> bool {
        self.provider_api_key(provider_id).is_some_and(|key| !key.is_empty())
    }

    pub fn set_api_token(&mut self, token: String) {
        self.server.api_token = Some(token);
    }

    pub fn api_token(&self) -> Result<&str> {
        self.server
            .api_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                anyhow!(
                    "No API token configured.\n\
                     Hint: set API_TOKEN or run `weather-advice-server configure token`."
                )
            })
    }

    pub fn weather_api_key(&self) -> Result<&str> {
        let id = ProviderId::VisualCrossing;
        self.provider_api_key(id).filter(|k| !k.is_empty()).ok_or_else(|| {
            anyhow!(
                "No API key configured for provider '{id}'.\n\
                 Hint: set WEATHER_API_KEY or run `weather-advice-server configure {id}`."
            )
        })
    }

    /// Gemini key is optional; without it recommendations fall back.
    pub fn gemini_api_key(&self) -> Option<&str> {
        self.provider_api_key(ProviderId::Gemini).filter(|k| !k.is_empty())
    }

    pub fn gemini_model(&self) -> &str {
        self.provider_config(ProviderId::Gemini)
            .and_then(|cfg| cfg.model.as_deref())
            .unwrap_or(DEFAULT_MODEL)
    }
}
