//! Inline emitted stylesheets into the chunks that import them
//!
//! Every stylesheet a chunk depends on is compressed and prepended to the
//! chunk as a `<style>` bootstrap, unless a generated document links it
//! directly. Those stay standalone assets so the `<link>` keeps resolving.

mod store;

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use indexmap::IndexSet;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::bundler::{ChunkGraph, OutputAsset, OutputBundle};
use crate::config::{Config, InjectCssOptions};
use crate::error::{BuildWarning, PluginStateError};
use crate::transform::{apply_css_hook, inject_style, CssCompressor, CssHook};
use crate::utils::format_size;

use super::{HtmlContext, Plugin, PluginContext};

pub use store::StylesheetStore;

/// Name the plugin registers under and reads its options from
pub const PLUGIN_NAME: &str = "inject-css-to-js";

/// Lifecycle phase of the current build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No configuration seen yet
    Unconfigured,
    /// Configuration resolved, waiting for documents or the bundle
    Configured,
    /// At least one document was analyzed
    HtmlTransformed,
    /// The bundle was rewritten; a new build has to start first
    Finalized,
}

/// State scoped to a single build
#[derive(Debug)]
struct BuildSession {
    phase: Phase,

    /// Host disabled per-chunk stylesheets, nothing is rewritten
    skip: bool,

    /// Stylesheets some document links with a `<link>` tag
    external_css: IndexSet<String>,
}

impl BuildSession {
    fn unconfigured() -> Self {
        Self {
            phase: Phase::Unconfigured,
            skip: false,
            external_css: IndexSet::new(),
        }
    }

    fn configured(skip: bool) -> Self {
        Self {
            phase: Phase::Configured,
            skip,
            external_css: IndexSet::new(),
        }
    }

    fn advance(&mut self, next: Phase, hook: &'static str) -> Result<(), PluginStateError> {
        match self.phase {
            Phase::Unconfigured => Err(PluginStateError::NotConfigured { hook }),
            Phase::Finalized => Err(PluginStateError::AlreadyFinalized { hook }),
            Phase::Configured | Phase::HtmlTransformed => {
                self.phase = next;
                Ok(())
            }
        }
    }
}

/// Per-pass counters for the finalization summary
#[derive(Debug, Default)]
struct InlineStats {
    inlined: usize,
    external: usize,
    dropped: usize,
    bytes_saved: usize,
}

/// Plugin that turns per-chunk stylesheets into inline `<style>` bootstraps
pub struct InjectCssPlugin {
    compressor: CssCompressor,
    css_hook: Option<Arc<dyn CssHook>>,
    session: Mutex<BuildSession>,
}

impl InjectCssPlugin {
    /// Create the plugin from its options
    pub fn new(options: InjectCssOptions) -> Result<Self> {
        Ok(Self {
            compressor: CssCompressor::new(&options)?,
            css_hook: None,
            session: Mutex::new(BuildSession::unconfigured()),
        })
    }

    /// Create the plugin from the `inject-css-to-js` entry of a host config
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.plugin_options(PLUGIN_NAME)?)
    }

    /// Transform each stylesheet right before it is inlined
    pub fn with_css_hook(mut self, hook: impl CssHook + 'static) -> Self {
        self.css_hook = Some(Arc::new(hook));
        self
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> Phase {
        self.session.lock().phase
    }

    /// Whether the current build passes everything through
    pub fn is_skipped(&self) -> bool {
        self.session.lock().skip
    }

    /// Stylesheets found linked from documents so far in this build
    pub fn external_css(&self) -> Vec<String> {
        self.session.lock().external_css.iter().cloned().collect()
    }

    /// Rewrite the bundle: inline or re-emit every captured stylesheet
    async fn inline_stylesheets(
        &self,
        bundle: &mut OutputBundle,
        external_css: &IndexSet<String>,
        ctx: &PluginContext,
    ) {
        let mut store = StylesheetStore::capture(bundle);
        let mut emitted: HashSet<String> = HashSet::new();
        let mut pending = Vec::new();
        let mut stats = InlineStats::default();

        for filename in bundle.chunk_filenames() {
            let Some(chunk) = bundle.chunk(&filename) else {
                continue;
            };
            if !chunk.has_css() {
                continue;
            }

            let mut styles = Vec::new();

            for css_id in &chunk.metadata.imported_css {
                let Some(source) = store.take(css_id) else {
                    debug!("{} imported by {} was not captured in this pass", css_id, filename);
                    continue;
                };

                if external_css.contains(css_id) {
                    if emitted.insert(css_id.clone()) {
                        debug!("Keeping {} as a standalone asset, a document links it", css_id);
                        pending.push(OutputAsset::new(css_id.clone(), source.to_vec()));
                        stats.external += 1;
                    }
                    continue;
                }

                let css = match std::str::from_utf8(source) {
                    Ok(css) => css,
                    Err(_) => {
                        if emitted.insert(css_id.clone()) {
                            let warning = BuildWarning::InvalidUtf8 {
                                filename: css_id.clone(),
                            };
                            warn!("{}", warning);
                            ctx.warn(warning);
                            pending.push(OutputAsset::new(css_id.clone(), source.to_vec()));
                            stats.external += 1;
                        }
                        continue;
                    }
                };
                let compressed = self.compressor.compress(chunk, css_id, css, ctx);
                stats.bytes_saved += css.len().saturating_sub(compressed.len());

                let css = match &self.css_hook {
                    Some(hook) => apply_css_hook(hook.as_ref(), css_id, compressed, ctx).await,
                    None => compressed,
                };

                debug!("Inlining {} into {}", css_id, filename);
                styles.push(css);
                stats.inlined += 1;
            }

            // Prepending in reverse leaves the bootstraps in import order
            let code = styles
                .iter()
                .rev()
                .fold(chunk.code.clone(), |code, css| inject_style(&code, css));

            if let Some(chunk) = bundle.chunk_mut(&filename) {
                chunk.code = code;
                chunk.metadata.imported_css.clear();
            }
        }

        for asset in pending {
            bundle.emit_asset(asset);
        }

        for (css_id, source) in store.drain() {
            if external_css.contains(&css_id) {
                debug!("{} is only linked by a document, emitting it unchanged", css_id);
                bundle.emit_asset(OutputAsset::new(css_id, source));
                stats.external += 1;
            } else {
                debug!("Dropping {}, no chunk imports it and no document links it", css_id);
                stats.dropped += 1;
            }
        }

        info!(
            "Inlined {} stylesheet(s), kept {} external, dropped {} unreferenced ({} saved by compression)",
            stats.inlined,
            stats.external,
            stats.dropped,
            format_size(stats.bytes_saved)
        );
    }
}

#[async_trait]
impl Plugin for InjectCssPlugin {
    fn name(&self) -> &str {
        PLUGIN_NAME
    }

    async fn config(&self, config: &Config, ctx: &PluginContext) -> Result<()> {
        let skip = config.build.css_code_split_disabled();
        if skip {
            let warning = BuildWarning::CssCodeSplitDisabled;
            warn!("{}", warning);
            ctx.warn(warning);
        }

        *self.session.lock() = BuildSession::configured(skip);
        Ok(())
    }

    async fn build_start(&self, _ctx: &PluginContext) -> Result<()> {
        let mut session = self.session.lock();
        if session.phase == Phase::Finalized {
            *session = BuildSession::configured(session.skip);
        }
        Ok(())
    }

    async fn transform_index_html(
        &self,
        html: String,
        html_ctx: &HtmlContext<'_>,
        _ctx: &PluginContext,
    ) -> Result<String> {
        let mut session = self.session.lock();
        session.advance(Phase::HtmlTransformed, "transform_index_html")?;

        if session.skip {
            return Ok(html);
        }

        let Some(entry) = html_ctx.chunk.filter(|chunk| chunk.is_entry()) else {
            return Ok(html);
        };

        let empty = OutputBundle::new();
        let graph = ChunkGraph::new(html_ctx.bundle.unwrap_or(&empty));
        let linked = graph.css_for_entry(entry);

        debug!(
            "{} links {} stylesheet(s) through {}",
            html_ctx.path,
            linked.len(),
            entry.filename
        );
        session.external_css.extend(linked);

        Ok(html)
    }

    async fn generate_bundle(&self, bundle: &mut OutputBundle, ctx: &PluginContext) -> Result<()> {
        let (skip, external_css) = {
            let mut session = self.session.lock();
            session.advance(Phase::Finalized, "generate_bundle")?;
            (session.skip, session.external_css.clone())
        };

        if skip {
            debug!("CSS code splitting is disabled, leaving the bundle untouched");
            return Ok(());
        }

        self.inline_stylesheets(bundle, &external_css, ctx).await;
        Ok(())
    }
}
