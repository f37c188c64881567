//! Sync configuration module.
//!
//! Handles loading, validating, and merging `atelier.toml`. Stock defaults
//! are the base layer; the user file is merged on top of them, so it only
//! needs the keys it wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! notification_email = ""       # Where sync reports go (empty = log only)
//!
//! [github]
//! token = ""                    # Personal access token with contents:write
//! owner = ""                    # Repository owner
//! repo = ""                     # Repository name
//! branch = "main"
//! api_base = "https://api.github.com"
//! user_agent = "atelier-sync"
//!
//! [source]
//! path = "sheets"               # Workbook file or directory of <sheet>.csv
//!
//! [products]
//! sheet_name = "Products"
//! csv_path = "assets/data/products.csv"
//! json_path = "assets/data/products.json"
//!
//! [pages]
//! sheet_name = "Pages"
//! csv_path = "assets/data/pages-content.csv"
//! json_path = "assets/data/pages-content.json"
//!
//! [site]
//! base_url = "http://localhost:8000/"
//! ```
//!
//! Unknown keys are rejected to catch typos early. The GitHub credentials may
//! be left empty for commands that never talk to the remote store
//! (`convert`, `preview`, `export`); [`SyncConfig::require_github`] checks
//! them for the rest.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use url::Url;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "atelier.toml";

/// Placeholder address shipped in older setups; treated as "not configured".
const PLACEHOLDER_EMAIL: &str = "your-email@example.com";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Sync configuration loaded from `atelier.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyncConfig {
    /// Recipient for sync reports. Empty or the placeholder means none.
    pub notification_email: String,
    /// Remote content store.
    pub github: GitHubConfig,
    /// Where the spreadsheet lives.
    pub source: SourceConfig,
    /// Products sheet and its published files.
    pub products: TargetConfig,
    /// Page-content sheet and its published files.
    pub pages: TargetConfig,
    /// The live site, used by `preview`.
    pub site: SiteConfig,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            notification_email: String::new(),
            github: GitHubConfig::default(),
            source: SourceConfig::default(),
            products: TargetConfig::products(),
            pages: TargetConfig::pages(),
            site: SiteConfig::default(),
        }
    }
}

impl SyncConfig {
    /// Validate config values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.github.branch.trim().is_empty() {
            return Err(ConfigError::Validation(
                "github.branch must not be empty".into(),
            ));
        }
        Url::parse(&self.github.api_base).map_err(|e| {
            ConfigError::Validation(format!("github.api_base is not a URL: {e}"))
        })?;
        Url::parse(&self.site.base_url)
            .map_err(|e| ConfigError::Validation(format!("site.base_url is not a URL: {e}")))?;
        if self.source.path.trim().is_empty() {
            return Err(ConfigError::Validation(
                "source.path must not be empty".into(),
            ));
        }
        self.products.validate("products")?;
        self.pages.validate("pages")?;
        Ok(())
    }

    /// Check the credentials needed to talk to the remote store.
    pub fn require_github(&self) -> Result<&GitHubConfig, ConfigError> {
        for (key, value) in [
            ("github.token", &self.github.token),
            ("github.owner", &self.github.owner),
            ("github.repo", &self.github.repo),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "{key} is not set; add it to {CONFIG_FILE}"
                )));
            }
        }
        Ok(&self.github)
    }

    /// The notification address, if one is really configured.
    pub fn notification_email(&self) -> Option<&str> {
        let email = self.notification_email.trim();
        (!email.is_empty() && email != PLACEHOLDER_EMAIL).then_some(email)
    }
}

/// Remote content store settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GitHubConfig {
    pub token: String,
    pub owner: String,
    pub repo: String,
    pub branch: String,
    /// API root; override for GitHub Enterprise.
    pub api_base: String,
    pub user_agent: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            owner: String::new(),
            repo: String::new(),
            branch: "main".to_string(),
            api_base: "https://api.github.com".to_string(),
            user_agent: "atelier-sync".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceConfig {
    /// An `.xlsx`/`.xls`/`.ods` workbook, or a directory of `<sheet>.csv` files.
    pub path: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            path: "sheets".to_string(),
        }
    }
}

/// One sheet and the two files it publishes to.
///
/// No serde default: a partial section is filled from the stock defaults by
/// [`merge_toml`], and the products and pages sections default differently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetConfig {
    pub sheet_name: String,
    pub csv_path: String,
    pub json_path: String,
}

impl TargetConfig {
    pub fn products() -> Self {
        Self {
            sheet_name: "Products".to_string(),
            csv_path: "assets/data/products.csv".to_string(),
            json_path: "assets/data/products.json".to_string(),
        }
    }

    pub fn pages() -> Self {
        Self {
            sheet_name: "Pages".to_string(),
            csv_path: "assets/data/pages-content.csv".to_string(),
            json_path: "assets/data/pages-content.json".to_string(),
        }
    }

    fn validate(&self, section: &str) -> Result<(), ConfigError> {
        if self.sheet_name.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "{section}.sheet_name must not be empty"
            )));
        }
        if !self.json_path.ends_with(".json") {
            return Err(ConfigError::Validation(format!(
                "{section}.json_path must end in .json"
            )));
        }
        if self.csv_path.trim().is_empty() || self.csv_path == self.json_path {
            return Err(ConfigError::Validation(format!(
                "{section}.csv_path must be set and differ from json_path"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Root the published data paths are resolved against.
    pub base_url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/".to_string(),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(SyncConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SyncConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SyncConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from a file path.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result. A missing file yields the stock defaults.
pub fn load_config(path: &Path) -> Result<SyncConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(path)?;
    if overlay.is_none() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
    }
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `atelier.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Atelier Sync Configuration
# ==========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Unknown keys will cause an error.

# Address for sync reports. Leave empty to report through the log only.
notification_email = ""

# ---------------------------------------------------------------------------
# Remote content store (GitHub contents API)
# ---------------------------------------------------------------------------
[github]
# Personal access token with write access to the repository contents.
# Required by sync and setup; not needed for convert, export or preview.
token = ""
owner = ""
repo = ""
branch = "main"

# API root. Change only for GitHub Enterprise.
api_base = "https://api.github.com"
user_agent = "atelier-sync"

# ---------------------------------------------------------------------------
# Spreadsheet source
# ---------------------------------------------------------------------------
[source]
# Either a workbook (.xlsx, .xlsm, .xlsb, .xls, .ods) or a directory holding
# one <sheet name>.csv per sheet. Only a directory can be written by setup.
path = "sheets"

# ---------------------------------------------------------------------------
# Product catalog
# ---------------------------------------------------------------------------
[products]
sheet_name = "Products"
csv_path = "assets/data/products.csv"
json_path = "assets/data/products.json"

# ---------------------------------------------------------------------------
# Page content
# ---------------------------------------------------------------------------
[pages]
sheet_name = "Pages"
csv_path = "assets/data/pages-content.csv"
json_path = "assets/data/pages-content.json"

# ---------------------------------------------------------------------------
# Live site
# ---------------------------------------------------------------------------
[site]
# Published data is fetched relative to this URL by `preview --site`.
base_url = "http://localhost:8000/"
"##
}
