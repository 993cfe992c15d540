//! Plugin system
//!
//! Provides a Vite/Rollup-style plugin API for the late build phases:
//! configuration, HTML document transforms and bundle finalization.

mod inject_css;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::Mutex;

use crate::bundler::{OutputBundle, OutputChunk};
use crate::config::Config;
use crate::error::BuildWarning;

pub use inject_css::{InjectCssPlugin, Phase, StylesheetStore, PLUGIN_NAME};

/// Plugin hook context
#[derive(Debug, Default)]
pub struct PluginContext {
    /// Warnings recorded by plugins during the current build
    warnings: Mutex<Vec<BuildWarning>>,
}

impl PluginContext {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning for the current build
    pub fn warn(&self, warning: BuildWarning) {
        self.warnings.lock().push(warning);
    }

    /// Warnings recorded so far
    pub fn warnings(&self) -> Vec<BuildWarning> {
        self.warnings.lock().clone()
    }

    /// Remove and return the recorded warnings
    pub fn take_warnings(&self) -> Vec<BuildWarning> {
        std::mem::take(&mut *self.warnings.lock())
    }
}

/// The document being transformed by `transform_index_html`
#[derive(Debug, Clone, Copy)]
pub struct HtmlContext<'a> {
    /// Path of the document relative to the project root
    pub path: &'a str,

    /// Bundle the document links into, when one was generated
    pub bundle: Option<&'a OutputBundle>,

    /// Chunk the document loads
    pub chunk: Option<&'a OutputChunk>,
}

/// Plugin trait - implement this to create a plugin
#[async_trait]
pub trait Plugin: Send + Sync {
    /// Plugin name for logging and debugging
    fn name(&self) -> &str;

    /// Called once the host configuration is resolved
    async fn config(&self, _config: &Config, _ctx: &PluginContext) -> Result<()> {
        Ok(())
    }

    /// Called when the build starts
    async fn build_start(&self, _ctx: &PluginContext) -> Result<()> {
        Ok(())
    }

    /// Transform a generated HTML document
    /// Return the document unchanged to leave it as is
    async fn transform_index_html(
        &self,
        html: String,
        _html_ctx: &HtmlContext<'_>,
        _ctx: &PluginContext,
    ) -> Result<String> {
        Ok(html)
    }

    /// Called with the final output set before it is written
    async fn generate_bundle(
        &self,
        _bundle: &mut OutputBundle,
        _ctx: &PluginContext,
    ) -> Result<()> {
        Ok(())
    }

    /// Called when the build ends
    async fn build_end(&self, _ctx: &PluginContext) -> Result<()> {
        Ok(())
    }
}

/// Plugin manager
#[derive(Default)]
pub struct PluginManager {
    plugins: Vec<Arc<dyn Plugin>>,
    context: PluginContext,
}

impl PluginManager {
    /// Create a new plugin manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plugin
    pub fn register(&mut self, plugin: Arc<dyn Plugin>) {
        self.plugins.push(plugin);
    }

    /// Names of the registered plugins, in hook order
    pub fn plugin_names(&self) -> Vec<&str> {
        self.plugins.iter().map(|plugin| plugin.name()).collect()
    }

    /// Shared hook context
    pub fn context(&self) -> &PluginContext {
        &self.context
    }

    /// Run config hooks
    pub async fn run_config(&self, config: &Config) -> Result<()> {
        for plugin in &self.plugins {
            plugin.config(config, &self.context).await?;
        }
        Ok(())
    }

    /// Run build_start hooks
    pub async fn run_build_start(&self) -> Result<()> {
        for plugin in &self.plugins {
            plugin.build_start(&self.context).await?;
        }
        Ok(())
    }

    /// Run transform_index_html hooks, feeding each plugin the previous output
    pub async fn transform_index_html(
        &self,
        html: String,
        html_ctx: &HtmlContext<'_>,
    ) -> Result<String> {
        let mut current_html = html;

        for plugin in &self.plugins {
            current_html = plugin
                .transform_index_html(current_html, html_ctx, &self.context)
                .await?;
        }

        Ok(current_html)
    }

    /// Run generate_bundle hooks
    pub async fn generate_bundle(&self, bundle: &mut OutputBundle) -> Result<()> {
        for plugin in &self.plugins {
            plugin.generate_bundle(bundle, &self.context).await?;
        }
        Ok(())
    }

    /// Run build_end hooks
    pub async fn run_build_end(&self) -> Result<()> {
        for plugin in &self.plugins {
            plugin.build_end(&self.context).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Appends a marker comment to every document and chunk
    struct MarkerPlugin(&'static str);

    #[async_trait]
    impl Plugin for MarkerPlugin {
        fn name(&self) -> &str {
            self.0
        }

        async fn transform_index_html(
            &self,
            html: String,
            _html_ctx: &HtmlContext<'_>,
            _ctx: &PluginContext,
        ) -> Result<String> {
            Ok(format!("{}<!-- {} -->", html, self.0))
        }

        async fn generate_bundle(
            &self,
            bundle: &mut OutputBundle,
            _ctx: &PluginContext,
        ) -> Result<()> {
            for filename in bundle.chunk_filenames() {
                if let Some(chunk) = bundle.chunk_mut(&filename) {
                    chunk.code.push_str(&format!("/* {} */", self.0));
                }
            }
            Ok(())
        }
    }

    fn manager() -> PluginManager {
        let mut manager = PluginManager::new();
        manager.register(Arc::new(MarkerPlugin("first")));
        manager.register(Arc::new(MarkerPlugin("second")));
        manager
    }

    #[tokio::test]
    async fn test_html_hooks_run_in_order() {
        let manager = manager();
        let html_ctx = HtmlContext {
            path: "index.html",
            bundle: None,
            chunk: None,
        };

        let html = manager
            .transform_index_html("<html></html>".to_string(), &html_ctx)
            .await
            .unwrap();

        assert_eq!(html, "<html></html><!-- first --><!-- second -->");
        assert_eq!(manager.plugin_names(), vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_generate_bundle_hooks_share_bundle() {
        let manager = manager();
        let mut bundle = OutputBundle::new();
        bundle.insert_chunk(OutputChunk::entry("index.js", "main();"));

        manager.generate_bundle(&mut bundle).await.unwrap();

        assert_eq!(
            bundle.chunk("index.js").map(|c| c.code.as_str()),
            Some("main();/* first *//* second */")
        );
    }

    #[test]
    fn test_context_records_warnings() {
        let ctx = PluginContext::new();
        ctx.warn(BuildWarning::CssCodeSplitDisabled);

        assert_eq!(ctx.warnings(), vec![BuildWarning::CssCodeSplitDisabled]);
        assert_eq!(ctx.take_warnings().len(), 1);
        assert!(ctx.warnings().is_empty());
    }
}
