use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fs, path::Path, path::PathBuf, time::Duration};

/// External services that need a credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceId {
    /// weatherapi.com, mandatory.
    WeatherApi,
    /// Gemini advice, optional.
    Gemini,
}

impl ServiceId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceId::WeatherApi => "weatherapi",
            ServiceId::Gemini => "gemini",
        }
    }

    /// Environment variable that overrides the stored key.
    pub fn env_var(&self) -> &'static str {
        match self {
            ServiceId::WeatherApi => "WEATHER_API_KEY",
            ServiceId::Gemini => "GEMINI_API_KEY",
        }
    }

    pub const fn all() -> &'static [ServiceId] {
        &[ServiceId::WeatherApi, ServiceId::Gemini]
    }
}

impl std::fmt::Display for ServiceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ServiceId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "weatherapi" => Ok(ServiceId::WeatherApi),
            "gemini" => Ok(ServiceId::Gemini),
            _ => Err(anyhow!("Unknown service '{value}'. Supported services: weatherapi, gemini.")),
        }
    }
}

/// Credential for a single service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub api_key: String,
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Gemini model used for advice; `gemini-2.5-flash` when unset.
    pub gemini_model: Option<String>,

    /// Per-request timeout. No timeout when unset.
    pub timeout_secs: Option<u64>,

    /// Override for `http://api.weatherapi.com`.
    pub weather_base_url: Option<String>,

    /// Override for `https://generativelanguage.googleapis.com`.
    pub gemini_base_url: Option<String>,

    /// Example TOML:
    /// [services.weatherapi]
    /// api_key = "..."
    #[serde(default)]
    pub services: HashMap<String, ServiceConfig>,
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

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Load the config file, then let `.env` and the process environment
    /// override stored credentials.
    pub fn resolve() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env");
        }

        let mut cfg = Self::load()?;
        cfg.apply_env(|name| std::env::var(name).ok());
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
        let dirs = ProjectDirs::from("dev", "weather-task", "weather-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Overwrite stored keys with non-empty values found through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        for id in ServiceId::all() {
            if let Some(key) = lookup(id.env_var()).filter(|k| !k.trim().is_empty()) {
                self.upsert_api_key(*id, key);
            }
        }
    }

    /// Set or replace a service API key.
    pub fn upsert_api_key(&mut self, id: ServiceId, api_key: String) {
        self.services.insert(id.as_str().to_string(), ServiceConfig { api_key });
    }

    /// Returns the API key for a service, if present and non-empty.
    pub fn api_key(&self, id: ServiceId) -> Option<&str> {
        self.services
            .get(id.as_str())
            .map(|cfg| cfg.api_key.as_str())
            .filter(|key| !key.trim().is_empty())
    }

    pub fn is_configured(&self, id: ServiceId) -> bool {
        self.api_key(id).is_some()
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}
