use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod defaults;

use defaults::*;

use crate::icon_store::IconStoreOptions;
use crate::models::IconListFormat;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub lookup: LookupConfig,
    #[serde(default)]
    pub response: ResponseConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Settings for the site lookup engine
#[derive(Debug, Clone, Deserialize)]
pub struct LookupConfig {
    /// Fetch site home pages over HTTPS. Icon links that explicitly use
    /// `http` are still fetched without TLS.
    ///
    /// Many popular sites serve homepages with certificates that are only
    /// valid for their CDN, so this can be switched off.
    #[serde(default = "default_secure_fetch")]
    pub secure_fetch: bool,
    #[serde(default = "default_request_timeout")]
    pub request_timeout: String,
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Largest page or icon body kept in memory
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseConfig {
    #[serde(default)]
    pub icon_format: IconListFormat,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_secure_fetch() -> bool {
    DEFAULT_SECURE_FETCH
}

fn default_request_timeout() -> String {
    DEFAULT_REQUEST_TIMEOUT.to_string()
}

fn default_max_redirects() -> usize {
    DEFAULT_MAX_REDIRECTS
}

fn default_max_body_bytes() -> u64 {
    DEFAULT_MAX_BODY_BYTES
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            secure_fetch: default_secure_fetch(),
            request_timeout: default_request_timeout(),
            max_redirects: default_max_redirects(),
            user_agent: default_user_agent(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl LookupConfig {
    pub fn request_timeout(&self) -> Result<Duration> {
        humantime::parse_duration(&self.request_timeout)
            .with_context(|| format!("Invalid lookup.request_timeout '{}'", self.request_timeout))
    }

    pub fn store_options(&self) -> IconStoreOptions {
        IconStoreOptions {
            secure_fetch: self.secure_fetch,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file, falling back to defaults when the
    /// file does not exist.
    pub fn load_from_file(config_file: &str) -> Result<Self> {
        let config = if Path::new(config_file).exists() {
            let contents = std::fs::read_to_string(config_file)?;
            let config: Self = toml::from_str(&contents)
                .with_context(|| format!("Failed to parse {config_file}"))?;
            info!("Read configuration from {}", config_file);
            config
        } else {
            info!("No configuration file at {}, using defaults", config_file);
            Self::default()
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.lookup.request_timeout()?;
        Ok(())
    }

    pub fn log_summary(&self) {
        info!(
            "Config: Using SSL for connections to external hosts: {}",
            self.lookup.secure_fetch
        );
        info!("Config: Lookup request timeout: {}", self.lookup.request_timeout);
        info!("Config: Icon list format: {:?}", self.response.icon_format);
    }
}
