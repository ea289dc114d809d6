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

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `max_bytes` is 0 or exceeds 100MB
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `user_agent` is empty
    /// - `upstream_base` is not an http(s) URL
    /// - a category page path is empty
    /// - `document_extension` does not start with `.`
    /// - `snippet_chars` is 0
    ///
    /// Returns `ConfigError::Missing` if no categories are configured.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_bytes == 0 {
            return Err(ConfigError::Invalid { field: "max_bytes".into(), reason: "must be greater than 0".into() });
        }
        if self.max_bytes > 100 * 1024 * 1024 {
            return Err(ConfigError::Invalid { field: "max_bytes".into(), reason: "must not exceed 100MB".into() });
        }

        if self.timeout_ms < 100 {
            return Err(ConfigError::Invalid { field: "timeout_ms".into(), reason: "must be at least 100ms".into() });
        }
        if self.timeout_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "timeout_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        match url::Url::parse(&self.upstream_base) {
            Ok(base) if matches!(base.scheme(), "http" | "https") => {}
            Ok(base) => {
                return Err(ConfigError::Invalid {
                    field: "upstream_base".into(),
                    reason: format!("unsupported scheme: {}", base.scheme()),
                });
            }
            Err(e) => return Err(ConfigError::Invalid { field: "upstream_base".into(), reason: e.to_string() }),
        }

        if self.categories.is_empty() {
            return Err(ConfigError::Missing {
                field: "categories".into(),
                hint: "Set POLICY_DESK_CATEGORIES__<KEY> or a [categories] table".into(),
            });
        }
        if let Some((key, _)) = self.categories.iter().find(|(_, page)| page.trim().is_empty()) {
            return Err(ConfigError::Invalid {
                field: format!("categories.{key}"),
                reason: "page path must not be empty".into(),
            });
        }

        if !self.document_extension.starts_with('.') || self.document_extension.len() < 2 {
            return Err(ConfigError::Invalid {
                field: "document_extension".into(),
                reason: "must look like \".pdf\"".into(),
            });
        }

        if self.snippet_chars == 0 {
            return Err(ConfigError::Invalid { field: "snippet_chars".into(), reason: "must be greater than 0".into() });
        }

        if let Some(0) = self.retention_max_age_secs {
            tracing::warn!("retention_max_age_secs is 0; every cached document will be refetched");
        }

        Ok(())
    }
}
