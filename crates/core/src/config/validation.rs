//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `max_bytes` is 0 or exceeds 50MB
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `user_agent` or `cache_prefix` is empty
    /// - `origin` doesn't parse as a URL
    /// - `offline_path` or a manifest path isn't absolute
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_bytes == 0 {
            return Err(ConfigError::Invalid {
                field: "max_bytes".into(),
                reason: "must be greater than 0".into(),
            });
        }
        if self.max_bytes > 50 * 1024 * 1024 {
            return Err(ConfigError::Invalid {
                field: "max_bytes".into(),
                reason: "must not exceed 50MB".into(),
            });
        }

        if self.timeout_ms < 100 {
            return Err(ConfigError::Invalid {
                field: "timeout_ms".into(),
                reason: "must be at least 100ms".into(),
            });
        }
        if self.timeout_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "timeout_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid {
                field: "user_agent".into(),
                reason: "must not be empty".into(),
            });
        }

        if self.cache_prefix.is_empty() {
            return Err(ConfigError::Invalid {
                field: "cache_prefix".into(),
                reason: "must not be empty".into(),
            });
        }

        self.origin_url()?;

        if !self.offline_path.starts_with('/') {
            return Err(ConfigError::Invalid {
                field: "offline_path".into(),
                reason: "must be an absolute path".into(),
            });
        }

        for path in &self.precache_manifest {
            if !path.starts_with('/') {
                return Err(ConfigError::Invalid {
                    field: "precache_manifest".into(),
                    reason: format!("path {path:?} must be absolute"),
                });
            }
        }

        Ok(())
    }
}
