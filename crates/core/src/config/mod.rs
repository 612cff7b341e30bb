//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (UMBRA_*)
//! 2. TOML config file (if UMBRA_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::store::GenerationSet;

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (UMBRA_*)
/// 2. TOML config file (if UMBRA_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to SQLite cache store.
    ///
    /// Set via UMBRA_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Origin the worker fronts; precache manifest paths resolve against it.
    ///
    /// Set via UMBRA_ORIGIN environment variable.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via UMBRA_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via UMBRA_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum bytes to fetch per request.
    ///
    /// Set via UMBRA_MAX_BYTES environment variable.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// Prefix for versioned cache generation names.
    ///
    /// Set via UMBRA_CACHE_PREFIX environment variable.
    #[serde(default = "default_cache_prefix")]
    pub cache_prefix: String,

    /// Cache generation version; bumping it retires the previous generations
    /// at the next activation.
    ///
    /// Set via UMBRA_CACHE_VERSION environment variable.
    #[serde(default = "default_cache_version")]
    pub cache_version: u32,

    /// Path of the offline fallback page served to failed navigations.
    ///
    /// Set via UMBRA_OFFLINE_PATH environment variable.
    #[serde(default = "default_offline_path")]
    pub offline_path: String,

    /// Shell asset paths fetched into the precache at install time.
    ///
    /// Set via UMBRA_PRECACHE_MANIFEST environment variable (comma-separated).
    #[serde(default = "default_precache_manifest")]
    pub precache_manifest: Vec<String>,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./umbra-cache.sqlite")
}

fn default_origin() -> String {
    "http://localhost:3000".into()
}

fn default_user_agent() -> String {
    "umbra/0.1".into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_cache_prefix() -> String {
    "umbra".into()
}

fn default_cache_version() -> u32 {
    1
}

fn default_offline_path() -> String {
    "/offline.html".into()
}

fn default_precache_manifest() -> Vec<String> {
    vec![
        "/".into(),
        "/offline.html".into(),
        "/icons/icon-192x192.png".into(),
        "/icons/icon-512x512.png".into(),
    ]
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            origin: default_origin(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            max_bytes: default_max_bytes(),
            cache_prefix: default_cache_prefix(),
            cache_version: default_cache_version(),
            offline_path: default_offline_path(),
            precache_manifest: default_precache_manifest(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// The three current generation names derived from prefix and version.
    pub fn generations(&self) -> GenerationSet {
        GenerationSet::new(&self.cache_prefix, self.cache_version)
    }

    /// Parsed origin URL.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if the origin string doesn't parse.
    pub fn origin_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.origin)
            .map_err(|e| ConfigError::Invalid { field: "origin".into(), reason: e.to_string() })
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `UMBRA_`
    /// 2. TOML file from `UMBRA_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("UMBRA_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("UMBRA_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.db_path, PathBuf::from("./umbra-cache.sqlite"));
        assert_eq!(config.origin, "http://localhost:3000");
        assert_eq!(config.user_agent, "umbra/0.1");
        assert_eq!(config.timeout_ms, 20_000);
        assert_eq!(config.max_bytes, 5_242_880);
        assert_eq!(config.cache_prefix, "umbra");
        assert_eq!(config.cache_version, 1);
        assert_eq!(config.offline_path, "/offline.html");
        assert_eq!(config.precache_manifest.len(), 4);
    }

    #[test]
    fn test_timeout_duration() {
        let config = AppConfig::default();
        assert_eq!(config.timeout(), Duration::from_millis(20_000));
    }

    #[test]
    fn test_generations_from_config() {
        let config = AppConfig {
            cache_prefix: "pages".into(),
            cache_version: 3,
            ..Default::default()
        };
        let set = config.generations();
        assert_eq!(set.precache, "pages-v3");
        assert_eq!(set.runtime, "pages-runtime-v3");
        assert_eq!(set.api, "pages-api-v3");
    }

    #[test]
    fn test_origin_url_parses() {
        let config = AppConfig::default();
        let origin = config.origin_url().unwrap();
        assert_eq!(origin.host_str(), Some("localhost"));
    }

    #[test]
    fn test_origin_url_invalid() {
        let config = AppConfig { origin: "not a url".into(), ..Default::default() };
        assert!(matches!(config.origin_url(), Err(ConfigError::Invalid { .. })));
    }
}
