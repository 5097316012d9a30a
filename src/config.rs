//! Catalog configuration loaded from TOML.
//!
//! ```toml
//! [ui]
//! theme = "material"
//!
//! [query]
//! dialect = "mongo"
//!
//! [devices]
//! vendor = "apple"
//!
//! [database]
//! url = "mysql://localhost:3306/blog"
//! api_key = "dev-key"
//! ```
//!
//! Every section is optional. Selectors are not checked against the
//! registries here: an unknown selector is resolved to the family default at
//! lookup time.

use crate::error::{ConfigError, InitializationFailure};
use crate::singleton::{ConnectionDescriptor, ConnectionProvider};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UiSection {
    pub theme: String,
}

impl Default for UiSection {
    fn default() -> Self {
        Self {
            theme: "bootstrap".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QuerySection {
    pub dialect: String,
}

impl Default for QuerySection {
    fn default() -> Self {
        Self {
            dialect: "mysql".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeviceSection {
    pub vendor: String,
}

impl Default for DeviceSection {
    fn default() -> Self {
        Self {
            vendor: "samsung".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseSection {
    pub url: Option<String>,
    pub api_key: Option<String>,
}

impl ConnectionProvider for DatabaseSection {
    fn descriptor(&self) -> Result<ConnectionDescriptor, InitializationFailure> {
        let url = self
            .url
            .clone()
            .ok_or_else(|| InitializationFailure::new("database.url is not configured"))?;
        let api_key = self
            .api_key
            .clone()
            .ok_or_else(|| InitializationFailure::new("database.api_key is not configured"))?;
        ConnectionDescriptor::new(url, api_key)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogConfig {
    pub ui: UiSection,
    pub query: QuerySection,
    pub devices: DeviceSection,
    pub database: DatabaseSection,
}

impl CatalogConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: CatalogConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|err| ConfigError::Io {
            path: path.display().to_string(),
            message: err.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    /// Applies `CATALOG_THEME`, `CATALOG_DIALECT` and `CATALOG_VENDOR`.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(theme) = lookup("CATALOG_THEME") {
            self.ui.theme = theme;
        }
        if let Some(dialect) = lookup("CATALOG_DIALECT") {
            self.query.dialect = dialect;
        }
        if let Some(vendor) = lookup("CATALOG_VENDOR") {
            self.devices.vendor = vendor;
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let selectors = [
            ("ui.theme", &self.ui.theme),
            ("query.dialect", &self.query.dialect),
            ("devices.vendor", &self.devices.vendor),
        ];
        for (field, value) in selectors {
            if value.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    reason: "selector must not be empty".to_string(),
                });
            }
        }

        if let Some(url) = &self.database.url {
            if !url.contains("://") {
                return Err(ConfigError::InvalidValue {
                    field: "database.url".to_string(),
                    reason: format!("'{url}' has no scheme"),
                });
            }
        }
        Ok(())
    }
}
