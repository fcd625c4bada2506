//! Configuration Management
//!
//! Handles persistent configuration storage for unicorn-maker.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::crudcrud::client::endpoint_for_api_id;

/// Environment variable overriding the collection endpoint
pub const ENDPOINT_ENV: &str = "UNICORN_MAKER_ENDPOINT";
/// Environment variable holding a crudcrud API id
pub const API_ID_ENV: &str = "CRUDCRUD_API_ID";

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// crudcrud API id, expanded into the default endpoint
    #[serde(default)]
    pub api_id: Option<String>,
    /// Full collection endpoint; wins over `api_id`
    #[serde(default)]
    pub endpoint: Option<String>,
    /// User-Agent sent with every request
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("unicorn-maker").join("config.json"))
    }

    /// Load configuration from disk, falling back to defaults
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Ignoring unreadable config: {:#}", e);
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content)?;

        Ok(())
    }

    /// Set API id and save
    pub fn set_api_id(&mut self, api_id: &str) -> Result<()> {
        self.api_id = Some(api_id.to_string());
        self.save()
    }

    /// Set endpoint and save
    pub fn set_endpoint(&mut self, endpoint: &str) -> Result<()> {
        parse_endpoint(endpoint)?;
        self.endpoint = Some(endpoint.to_string());
        self.save()
    }

    /// Get effective endpoint (CLI > env > config endpoint > api id)
    pub fn effective_endpoint(&self, cli: Option<&str>) -> Result<Url> {
        self.resolve_endpoint(
            cli,
            std::env::var(ENDPOINT_ENV).ok(),
            std::env::var(API_ID_ENV).ok(),
        )
    }

    pub fn resolve_endpoint(
        &self,
        cli: Option<&str>,
        env_endpoint: Option<String>,
        env_api_id: Option<String>,
    ) -> Result<Url> {
        let raw = cli
            .map(str::to_string)
            .or(env_endpoint)
            .or_else(|| self.endpoint.clone())
            .or_else(|| {
                env_api_id
                    .or_else(|| self.api_id.clone())
                    .filter(|id| !id.is_empty())
                    .map(|id| endpoint_for_api_id(&id))
            })
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "No crudcrud endpoint configured. Set {} or {}, or use --endpoint",
                    ENDPOINT_ENV,
                    API_ID_ENV
                )
            })?;

        parse_endpoint(&raw)
    }

    pub fn effective_user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(|| format!("unicorn-maker/{}", crate::VERSION))
    }
}

/// Validate an endpoint URL; only http and https are accepted
pub fn parse_endpoint(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).with_context(|| format!("Invalid endpoint URL: {}", raw))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(anyhow::anyhow!(
            "Unsupported endpoint scheme '{}' in {}",
            other,
            raw
        )),
    }
}
