//! Application configuration management.
//!
//! This module handles loading and saving the client configuration: the
//! API base URL, where the token is kept, and the request policy.
//!
//! Configuration is stored at `~/.config/watchshop/config.json`. The
//! `WATCHSHOP_API_URL` environment variable overrides the stored URL.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::{ClientSettings, DEFAULT_TIMEOUT_SECS};
use crate::auth::{
    CredentialStore, FileCredentialStore, KeyringCredentialStore, MemoryCredentialStore, Session,
};

/// Application name used for config/data directory paths
const APP_NAME: &str = "watchshop";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding the API base URL
pub const API_URL_ENV: &str = "WATCHSHOP_API_URL";

/// Backend address used when nothing is configured
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Where the bearer token is persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialBackend {
    /// JSON file in the data directory
    #[default]
    File,
    /// OS keychain
    Keyring,
    /// Process memory only, gone on exit
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_url: String,
    pub credential_backend: CredentialBackend,
    /// `None` leaves the transport without a timeout.
    pub request_timeout_secs: Option<u64>,
    pub logout_on_unauthorized: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            credential_backend: CredentialBackend::default(),
            request_timeout_secs: Some(DEFAULT_TIMEOUT_SECS),
            logout_on_unauthorized: true,
        }
    }
}

impl Config {
    /// Load the config file (defaults if missing) and apply the environment.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_file()?;
        config.apply_env_override(std::env::var(API_URL_ENV).ok());
        Ok(config)
    }

    fn load_file() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn apply_env_override(&mut self, api_url: Option<String>) {
        if let Some(url) = api_url {
            let url = url.trim();
            if !url.is_empty() {
                self.api_url = url.to_string();
            }
        }
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }

    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            base_url: self.api_url.clone(),
            timeout: self.request_timeout_secs.map(Duration::from_secs),
            logout_on_unauthorized: self.logout_on_unauthorized,
        }
    }

    pub fn credential_store(&self) -> Result<Arc<dyn CredentialStore>> {
        let store: Arc<dyn CredentialStore> = match self.credential_backend {
            CredentialBackend::File => Arc::new(FileCredentialStore::new(self.data_dir()?)),
            CredentialBackend::Keyring => Arc::new(KeyringCredentialStore::new()),
            CredentialBackend::Memory => Arc::new(MemoryCredentialStore::new()),
        };
        Ok(store)
    }

    /// Restore the session from the configured store.
    pub fn open_session(&self) -> Result<Session> {
        let store = self.credential_store()?;
        Session::new(store, &self.client_settings()).context("Failed to create API client")
    }
}
