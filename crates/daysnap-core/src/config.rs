//! Application configuration management.
//!
//! This module handles loading and saving the application configuration:
//! the Solana cluster, an optional RPC endpoint override, the Pinata API
//! and gateway hosts, and the last creator address browsed.
//!
//! Configuration is stored at `~/.config/daysnap/config.json`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::models::Cluster;

/// Application name used for config/cache directory paths
const APP_NAME: &str = "daysnap";

/// Config file name
const CONFIG_FILE: &str = "config.json";

const DEFAULT_PINATA_API_URL: &str = "https://api.pinata.cloud";

const DEFAULT_PINATA_GATEWAY: &str = "gateway.pinata.cloud";

/// Overrides the stored Pinata gateway host
pub const PINATA_GATEWAY_ENV: &str = "DAYSNAP_PINATA_GATEWAY";

/// Pinata JWT, used instead of the keychain entry when set
pub const PINATA_JWT_ENV: &str = "DAYSNAP_PINATA_JWT";

/// Overrides the stored RPC endpoint
pub const RPC_URL_ENV: &str = "DAYSNAP_RPC_URL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub cluster: Cluster,
    pub rpc_endpoint: Option<String>,
    pub pinata_api_url: String,
    pub pinata_gateway: String,
    pub last_creator: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cluster: Cluster::default(),
            rpc_endpoint: None,
            pinata_api_url: DEFAULT_PINATA_API_URL.to_string(),
            pinata_gateway: DEFAULT_PINATA_GATEWAY.to_string(),
            last_creator: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents).context("Failed to parse config file")
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Cache directory, separated per cluster
    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME).join(self.cluster.name()))
    }

    /// RPC endpoint: the override if set, otherwise the cluster's public URL
    pub fn rpc_url(&self) -> &str {
        self.rpc_endpoint
            .as_deref()
            .unwrap_or_else(|| self.cluster.api_url())
    }

    /// Endpoint for digital asset reads.
    ///
    /// The public cluster RPC nodes do not serve the DAS methods, so an
    /// explicit `rpc_endpoint` from a provider that does is required.
    pub fn das_url(&self) -> Result<&str> {
        self.rpc_endpoint.as_deref().ok_or_else(|| {
            anyhow::anyhow!(
                "No DAS-capable RPC endpoint configured for {}; set one with `config set-rpc <url>` or {}",
                self.cluster,
                RPC_URL_ENV
            )
        })
    }

    /// Apply environment overrides (after `.env` has been loaded)
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(RPC_URL_ENV) {
            if !url.trim().is_empty() {
                self.rpc_endpoint = Some(url.trim().to_string());
            }
        }
        if let Ok(gateway) = std::env::var(PINATA_GATEWAY_ENV) {
            if !gateway.trim().is_empty() {
                self.pinata_gateway = gateway.trim().to_string();
            }
        }
    }
}
