//! # prism-config
//!
//! Layered configuration loading for Prism using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`PRISM_*` prefix, `__` as separator)
//! 2. An explicit file passed with `--config`
//! 3. Project-level `.prism/config.toml`
//! 4. User-level `~/.config/prism/config.toml`
//! 5. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `PRISM_TENANT__CLIENT_ID` -> `tenant.client_id`,
//! `PRISM_CRAWLER__OPERATOR_UPN` -> `crawler.operator_upn`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use prism_config::PrismConfig;
//!
//! let config = PrismConfig::load_with_dotenv(None).expect("config");
//! if config.tenant.is_configured() {
//!     println!("API root: {}", config.tenant.api_base_url);
//! }
//! ```

mod crawler;
mod error;
mod output;
mod tenant;

pub use crawler::CrawlerConfig;
pub use error::ConfigError;
pub use output::OutputConfig;
pub use tenant::TenantConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const REDACTED: &str = "***";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PrismConfig {
    #[serde(default)]
    pub tenant: TenantConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl PrismConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy`; use [`Self::load_with_dotenv`] for `.env` support.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Figment`] if a source cannot be parsed or a value
    /// has the wrong type.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        Self::figment(explicit).extract().map_err(ConfigError::from)
    }

    /// Load `.env` from the current directory, then all other sources.
    ///
    /// # Errors
    ///
    /// See [`Self::load`].
    pub fn load_with_dotenv(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load(explicit)
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment or add providers on top.
    pub fn figment(explicit: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(global_path));
        }

        let local_path = PathBuf::from(".prism/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        if let Some(path) = explicit {
            figment = figment.merge(Toml::file(path));
        }

        figment.merge(Env::prefixed("PRISM_").split("__"))
    }

    /// Fail unless the tenant section has a credential source.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotConfigured`] for the `tenant` section.
    pub fn require_tenant(&self) -> Result<&TenantConfig, ConfigError> {
        if self.tenant.is_configured() {
            Ok(&self.tenant)
        } else {
            Err(ConfigError::NotConfigured {
                section: "tenant".to_string(),
            })
        }
    }

    /// Fail unless the crawler has an operator identity.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotConfigured`] for the `crawler` section.
    pub fn require_crawler(&self) -> Result<&CrawlerConfig, ConfigError> {
        if self.crawler.is_configured() {
            Ok(&self.crawler)
        } else {
            Err(ConfigError::NotConfigured {
                section: "crawler".to_string(),
            })
        }
    }

    /// Copy with secrets masked, for display.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        for secret in [&mut copy.tenant.client_secret, &mut copy.tenant.access_token] {
            if !secret.is_empty() {
                *secret = REDACTED.to_string();
            }
        }
        copy
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("prism").join("config.toml"))
    }
}
