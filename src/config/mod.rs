use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::filter::Filter;

/// Default paging and criteria settings from config.toml.
#[derive(Debug, Deserialize, Serialize, Default, Clone)]
pub struct Defaults {
    pub rows: Option<i64>,
    pub filter: Option<String>,
}

/// Top-level vfq config file structure.
#[derive(Debug, Deserialize, Serialize, Default, Clone)]
pub struct VfqConfig {
    #[serde(default)]
    pub defaults: Defaults,
    /// Named filter strings, expandable with `vfq saved <name>`.
    #[serde(default)]
    pub saved: BTreeMap<String, String>,
}

impl VfqConfig {
    /// Load config from ~/.vfq/config.toml. Returns default if file doesn't exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path()?)
    }

    /// Load config from an explicit path. Returns default if file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(VfqConfig::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: VfqConfig =
            toml::from_str(&content).with_context(|| "Failed to parse config.toml")?;
        Ok(config)
    }

    /// Look up a saved filter string by name.
    pub fn saved_filter(&self, name: &str) -> Option<&str> {
        self.saved.get(name).map(String::as_str)
    }

    /// Lay the configured defaults under a filter: the default criteria
    /// come first and the filter's own terms override them, then the
    /// default page size fills in when the filter has none.
    pub fn apply_defaults(&self, filter: Filter) -> Filter {
        let mut result = match &self.defaults.filter {
            Some(base) => Filter::parse(base).merge(&filter),
            None => filter,
        };
        if result.rows().is_none() {
            if let Some(rows) = self.defaults.rows {
                result = result.set("rows", &rows.to_string());
            }
        }
        result
    }
}

/// Path to the config file: ~/.vfq/config.toml
pub fn config_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".vfq").join("config.toml"))
}

/// Default config template content.
pub fn default_config_template() -> &'static str {
    r#"# ~/.vfq/config.toml

[defaults]
# rows = 25
# filter = "apply_overrides=1 min_qod=70"

[saved]
# critical = "severity>6.9 sort-reverse=severity"
# recent = "sort-reverse=created rows=10"
"#
}

/// Create the default config file if it doesn't already exist.
pub fn init_config() -> Result<bool> {
    let path = config_path()?;
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, default_config_template())?;
    Ok(true)
}
