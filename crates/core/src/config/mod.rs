//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (POLICY_DESK_*)
//! 2. TOML config file (if POLICY_DESK_CONFIG_FILE set)
//! 3. Built-in defaults

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::cache::{MaxAge, NeverExpire, RetentionPolicy};

mod validation;

pub use validation::ConfigError;

/// Which search index backs `policy_search`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexMode {
    /// Linear scan of every cached document per query.
    #[default]
    Scan,
    /// In-memory inverted index used to pick candidates before the scan.
    Terms,
}

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (POLICY_DESK_*)
/// 2. TOML config file (if POLICY_DESK_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to SQLite cache database.
    ///
    /// Set via POLICY_DESK_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via POLICY_DESK_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum bytes to fetch per request.
    ///
    /// Set via POLICY_DESK_MAX_BYTES environment variable.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via POLICY_DESK_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Base URL that category page paths are joined onto.
    ///
    /// Set via POLICY_DESK_UPSTREAM_BASE environment variable.
    #[serde(default = "default_upstream_base")]
    pub upstream_base: String,

    /// Category key to listing page path, relative to `upstream_base`.
    ///
    /// Set via POLICY_DESK_CATEGORIES__<KEY> environment variables.
    #[serde(default = "default_categories")]
    pub categories: BTreeMap<String, String>,

    /// Extension a listing link must end with to count as a document.
    #[serde(default = "default_document_extension")]
    pub document_extension: String,

    /// Maximum characters in a search snippet.
    #[serde(default = "default_snippet_chars")]
    pub snippet_chars: usize,

    /// Search index backing `policy_search`.
    #[serde(default)]
    pub search_index: IndexMode,

    /// Serve cached text only while younger than this many seconds.
    ///
    /// Unset by default: cached text is served forever.
    #[serde(default)]
    pub retention_max_age_secs: Option<u64>,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./policy-desk-cache.sqlite")
}

fn default_user_agent() -> String {
    "policy-desk/0.1".into()
}

fn default_max_bytes() -> usize {
    20 * 1024 * 1024
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_upstream_base() -> String {
    "https://www.asd103.org/District/".into()
}

fn default_categories() -> BTreeMap<String, String> {
    [
        ("0000", "464-Series-0000---District-Wide.html"),
        ("1000", "465-Series-1000---The-Board-of-Directors.html"),
        ("2000", "466-Series-2000---Instruction.html"),
        ("3000", "467-Series-3000---Students.html"),
        ("4000", "468-Series-4000---Community-Relations.html"),
        ("5000", "469-Series-5000---Personnel.html"),
        ("6000", "470-Series-6000---Management-Support.html"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

fn default_document_extension() -> String {
    ".pdf".into()
}

fn default_snippet_chars() -> usize {
    200
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            timeout_ms: default_timeout_ms(),
            upstream_base: default_upstream_base(),
            categories: default_categories(),
            document_extension: default_document_extension(),
            snippet_chars: default_snippet_chars(),
            search_index: IndexMode::default(),
            retention_max_age_secs: None,
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Retention policy selected by `retention_max_age_secs`.
    pub fn retention_policy(&self) -> Box<dyn RetentionPolicy> {
        match self.retention_max_age_secs {
            Some(secs) => Box::new(MaxAge::new(Duration::from_secs(secs))),
            None => Box::new(NeverExpire),
        }
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `POLICY_DESK_`
    /// 2. TOML file from `POLICY_DESK_CONFIG_FILE` (if set)
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

        if let Ok(config_path) = std::env::var("POLICY_DESK_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("POLICY_DESK_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
