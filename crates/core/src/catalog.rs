//! Category catalog: category key to upstream listing page.
//!
//! Built once from configuration and never mutated afterwards.

use std::collections::BTreeMap;

use url::Url;

use crate::Error;
use crate::config::{AppConfig, ConfigError};

/// Fixed lookup table from category key to listing URL.
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: BTreeMap<String, Url>,
}

impl Catalog {
    /// Build the catalog by joining each configured page path onto the base URL.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if the base is not a URL or a path cannot be joined.
    pub fn new(base: &str, pages: &BTreeMap<String, String>) -> Result<Self, ConfigError> {
        let base = Url::parse(base)
            .map_err(|e| ConfigError::Invalid { field: "upstream_base".into(), reason: e.to_string() })?;

        let mut entries = BTreeMap::new();
        for (key, page) in pages {
            let location = base.join(page).map_err(|e| ConfigError::Invalid {
                field: format!("categories.{key}"),
                reason: e.to_string(),
            })?;
            entries.insert(key.clone(), location);
        }

        Ok(Self { entries })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        Self::new(&config.upstream_base, &config.categories)
    }

    /// Look up the listing page for a category key.
    pub fn resolve_category(&self, key: &str) -> Result<&Url, Error> {
        self.entries
            .get(key)
            .ok_or_else(|| Error::UnknownCategory(key.to_string()))
    }

    /// All `(key, location)` pairs in key order.
    pub fn categories(&self) -> impl Iterator<Item = (&str, &Url)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
