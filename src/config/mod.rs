//! Configuration handling
//!
//! Parses the host build configuration and the options of registered plugins
//! from TOML.

mod schema;

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub use schema::*;

/// Host configuration visible to plugins
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Build settings
    #[serde(default)]
    pub build: BuildConfig,

    /// Plugin configuration
    #[serde(default)]
    pub plugins: Vec<PluginConfig>,

    /// Root directory (computed from config file location)
    #[serde(skip)]
    pub root: PathBuf,
}

impl Config {
    /// Load configuration from a file path
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let canonical_path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()?.join(path)
        };

        let content = fs::read_to_string(&canonical_path)
            .with_context(|| format!("Failed to read config file: {}", canonical_path.display()))?;

        let mut config = Self::parse(&content)
            .with_context(|| format!("Invalid config file: {}", canonical_path.display()))?;

        // Set root directory to the directory containing the config file
        config.root = canonical_path
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(config)
    }

    /// Parse and validate configuration from TOML source
    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Create a default configuration
    pub fn default_config() -> Self {
        Self {
            build: BuildConfig::default(),
            plugins: Vec::new(),
            root: PathBuf::from("."),
        }
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        let mut names = HashSet::new();

        for plugin in &self.plugins {
            if plugin.name.trim().is_empty() {
                anyhow::bail!("Plugin entries must have a non-empty `name`");
            }
            if !names.insert(plugin.name.as_str()) {
                anyhow::bail!("Plugin '{}' is configured more than once", plugin.name);
            }
        }

        Ok(())
    }

    /// Get the configuration entry of a plugin
    pub fn plugin(&self, name: &str) -> Option<&PluginConfig> {
        self.plugins.iter().find(|plugin| plugin.name == name)
    }

    /// Deserialize the options of a plugin, falling back to their defaults
    pub fn plugin_options<T>(&self, name: &str) -> Result<T>
    where
        T: for<'de> Deserialize<'de> + Default,
    {
        match self.plugin(name).and_then(|plugin| plugin.options.clone()) {
            Some(options) => toml::Value::Table(options)
                .try_into()
                .with_context(|| format!("Invalid options for plugin '{}'", name)),
            None => Ok(T::default()),
        }
    }
}
