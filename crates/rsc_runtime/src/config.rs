//! Runtime Configuration
//!
//! # Configuration Sources (in priority order)
//!
//! 1. Environment variables: `RSC_DOCUMENT_PATH`, `RSC_BOUNDARY_PROP`,
//!    `RSC_LOG_PAYLOAD`
//! 2. Config file named by `RSC_CONFIG`, or `rsc.toml` in the working directory
//! 3. Built-in defaults
//!
//! # Example Config File
//!
//! ```toml
//! greeting_delay_ms = 500
//!
//! [server]
//! document_path = "/"
//! bootstrap_module = "src/client/index.js"
//! document_title = "My App"
//!
//! [server.evaluator]
//! boundary_prop = "__isClient__"
//!
//! [client]
//! log_payload = false
//! ```

use std::path::Path;
use std::time::Duration;

use rsc_server::ResponderConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default config file, relative to the working directory
pub const DEFAULT_CONFIG_FILE: &str = "rsc.toml";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Client-side settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Log the raw payload before hydrating
    pub log_payload: bool,
}

/// Complete runtime configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// How long the greeting component waits before answering
    pub greeting_delay_ms: u64,
    /// Response rendering
    pub server: ResponderConfig,
    /// Client hydration
    pub client: ClientConfig,
    /// File the configuration was read from
    #[serde(skip)]
    pub config_path: Option<String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            greeting_delay_ms: 500,
            server: ResponderConfig {
                document_title: "My App".to_string(),
                ..ResponderConfig::default()
            },
            client: ClientConfig::default(),
            config_path: None,
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from file and environment
    pub fn load() -> ConfigResult<Self> {
        let mut config = match std::env::var("RSC_CONFIG") {
            Ok(path) => Self::load_from_file(&path)?,
            Err(_) if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::load_from_file(DEFAULT_CONFIG_FILE)?
            }
            Err(_) => Self::default(),
        };

        config.apply_overrides(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn load_from_file(path: &str) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_string(),
            source,
        })?;
        let mut config = Self::from_toml_str(&content)?;
        config.config_path = Some(path.to_string());
        log::info!("Loaded config from {}", path);
        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply `RSC_*` overrides from `lookup`
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("RSC_DOCUMENT_PATH") {
            log::info!("Document path from env: {}", path);
            self.server.document_path = path;
        }

        if let Some(prop) = lookup("RSC_BOUNDARY_PROP") {
            log::info!("Boundary prop from env: {}", prop);
            self.server.evaluator.boundary_prop = prop;
        }

        if let Some(flag) = lookup("RSC_LOG_PAYLOAD") {
            self.client.log_payload = flag == "1" || flag.eq_ignore_ascii_case("true");
        }
    }

    /// Check the configuration is usable
    pub fn validate(&self) -> ConfigResult<()> {
        if !self.server.document_path.starts_with('/') {
            return Err(ConfigError::Invalid(format!(
                "document_path must start with '/', got `{}`",
                self.server.document_path
            )));
        }
        if self.server.evaluator.boundary_prop.is_empty() {
            return Err(ConfigError::Invalid("boundary_prop must not be empty".into()));
        }
        Ok(())
    }

    /// Greeting delay as a duration
    pub fn greeting_delay(&self) -> Duration {
        Duration::from_millis(self.greeting_delay_ms)
    }
}
