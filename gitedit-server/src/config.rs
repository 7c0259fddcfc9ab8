use gitedit_core::OpenAiConfig;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Missing API key: set OPENAI_API_KEY or pass --api-key")]
    MissingApiKey,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Root of the git working tree being served.
    pub root: PathBuf,
    pub bind: SocketAddr,
    pub request_timeout_secs: u64,
    /// Ask for a rationale after each rewrite.
    pub explain: bool,
    pub openai: OpenAiConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            bind: SocketAddr::from(([127, 0, 0, 1], 50051)),
            request_timeout_secs: 120,
            explain: true,
            openai: OpenAiConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Loads `path` if given, otherwise starts from defaults. Environment
    /// overrides are applied afterwards.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        Ok(config.with_env(|key| std::env::var(key).ok()))
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn with_env(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(base_url) = var("OPENAI_BASE_URL") {
            self.openai.base_url = base_url;
        }
        if let Some(model) = var("OPENAI_MODEL") {
            self.openai.model = model;
        }
        if let Some(organization) = var("OPENAI_ORG_ID") {
            self.openai.organization = Some(organization);
        }
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// The API key never comes from the config file.
pub fn resolve_api_key(explicit: Option<String>) -> Result<String, ConfigError> {
    explicit
        .or_else(|| std::env::var(API_KEY_ENV).ok())
        .filter(|key| !key.trim().is_empty())
        .ok_or(ConfigError::MissingApiKey)
}
