//! Configuration schema definitions

use serde::{Deserialize, Serialize};

/// Build configuration of the host bundler
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Split stylesheets per chunk.
    ///
    /// Unset means the bundler default, which splits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub css_code_split: Option<bool>,
}

impl BuildConfig {
    /// Whether the host explicitly turned per-chunk stylesheets off
    pub fn css_code_split_disabled(&self) -> bool {
        self.css_code_split == Some(false)
    }
}

/// Plugin configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Plugin name/identifier
    pub name: String,

    /// Plugin-specific options
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<toml::Table>,
}

/// Options of the css injection plugin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjectCssOptions {
    /// Minify stylesheets before inlining them
    #[serde(default = "default_true")]
    pub compress: bool,

    /// Browserslist queries the minified output must stay compatible with.
    ///
    /// Unset targets Internet Explorer 7.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub targets: Option<Vec<String>>,

    /// Globs matching module ids of third-party code
    #[serde(default = "default_third_party_patterns")]
    pub third_party_patterns: Vec<String>,
}

impl Default for InjectCssOptions {
    fn default() -> Self {
        Self {
            compress: true,
            targets: None,
            third_party_patterns: default_third_party_patterns(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_third_party_patterns() -> Vec<String> {
    vec!["**/node_modules/**".to_string()]
}
