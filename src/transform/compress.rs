//! Stylesheet compression with lightningcss

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::targets::{Browsers, Targets};
use tracing::{debug, error};

use crate::bundler::OutputChunk;
use crate::config::InjectCssOptions;
use crate::error::BuildWarning;
use crate::plugins::PluginContext;
use crate::utils::normalize_module_id;

/// Internet Explorer 7, encoded the way lightningcss encodes browser versions
const LEGACY_IE_VERSION: u32 = 7 << 16;

/// Minifies stylesheets before they are inlined into chunks
#[derive(Debug)]
pub struct CssCompressor {
    /// Whether compression runs at all
    enabled: bool,

    /// Browsers the output must keep working in
    targets: Targets,

    /// Module ids matching these are third-party code
    third_party: GlobSet,
}

impl CssCompressor {
    /// Create a compressor from plugin options
    pub fn new(options: &InjectCssOptions) -> Result<Self> {
        let browsers = match &options.targets {
            Some(queries) => Browsers::from_browserslist(queries.iter().map(String::as_str))
                .with_context(|| format!("Invalid browser targets: {:?}", queries))?,
            None => Some(Browsers {
                ie: Some(LEGACY_IE_VERSION),
                ..Browsers::default()
            }),
        };

        let mut builder = GlobSetBuilder::new();
        for pattern in &options.third_party_patterns {
            let glob = Glob::new(pattern)
                .with_context(|| format!("Invalid third-party pattern: {}", pattern))?;
            builder.add(glob);
        }

        Ok(Self {
            enabled: options.compress,
            targets: browsers.map(Targets::from).unwrap_or_default(),
            third_party: builder.build().context("Failed to compile third-party patterns")?,
        })
    }

    /// Whether every module of the chunk comes from third-party code
    pub fn is_third_party(&self, chunk: &OutputChunk) -> bool {
        !chunk.module_ids.is_empty()
            && chunk
                .module_ids
                .iter()
                .all(|id| self.third_party.is_match(&*normalize_module_id(id)))
    }

    /// Compress a stylesheet inlined into `chunk`.
    ///
    /// Third-party chunks are returned untouched, their styles ship
    /// optimized and rewriting them against unknown markup is unsafe. A
    /// failed compression is reported and falls back to the input.
    pub fn compress(
        &self,
        chunk: &OutputChunk,
        filename: &str,
        css: &str,
        ctx: &PluginContext,
    ) -> String {
        if !self.enabled {
            return css.to_string();
        }

        if self.is_third_party(chunk) {
            debug!("Skipping compression of {} for third-party chunk {}", filename, chunk.filename);
            return css.to_string();
        }

        match self.minify(css) {
            Ok(minified) => minified,
            Err(err) => {
                error!("Failed to compress CSS {}: {:#}", filename, err);
                ctx.warn(BuildWarning::CompressionFailed {
                    filename: filename.to_string(),
                    reason: format!("{:#}", err),
                });
                css.to_string()
            }
        }
    }

    /// Structural minification: merges duplicate rules and drops overridden declarations
    pub fn minify(&self, css: &str) -> Result<String> {
        let mut stylesheet = StyleSheet::parse(css, ParserOptions::default())
            .map_err(|err| anyhow::anyhow!("parse error: {}", err))?;

        stylesheet
            .minify(MinifyOptions {
                targets: self.targets,
                ..MinifyOptions::default()
            })
            .map_err(|err| anyhow::anyhow!("minify error: {}", err))?;

        let output = stylesheet
            .to_css(PrinterOptions {
                minify: true,
                targets: self.targets,
                ..PrinterOptions::default()
            })
            .map_err(|err| anyhow::anyhow!("print error: {}", err))?;

        Ok(output.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compressor() -> CssCompressor {
        CssCompressor::new(&InjectCssOptions::default()).unwrap()
    }

    fn app_chunk() -> OutputChunk {
        OutputChunk::entry("index.js", "")
            .with_module("/app/src/main.js")
            .with_module("/app/node_modules/vue/dist/vue.js")
    }

    fn vendor_chunk() -> OutputChunk {
        OutputChunk::shared("vendor.js", "")
            .with_module("/app/node_modules/vue/dist/vue.js")
            .with_module(r"C:\app\node_modules\normalize.css\index.js")
    }

    #[test]
    fn test_minifies_first_party_css() {
        let ctx = PluginContext::new();
        let css = ".a {\n  color: red;\n}\n";

        let compressed = compressor().compress(&app_chunk(), "index.css", css, &ctx);

        assert_eq!(compressed, ".a{color:red}");
        assert!(ctx.warnings().is_empty());
    }

    #[test]
    fn test_merges_duplicate_rules() {
        let minified = compressor()
            .minify(".a { color: red; }\n.a { color: red; }\n")
            .unwrap();

        assert_eq!(minified, ".a{color:red}");
    }

    #[test]
    fn test_third_party_chunk_is_untouched() {
        let ctx = PluginContext::new();
        let css = ".a {\n  color: red;\n}\n";
        let compressor = compressor();

        assert!(compressor.is_third_party(&vendor_chunk()));
        assert!(!compressor.is_third_party(&app_chunk()));
        assert_eq!(compressor.compress(&vendor_chunk(), "vendor.css", css, &ctx), css);
    }

    #[test]
    fn test_chunk_without_modules_is_first_party() {
        assert!(!compressor().is_third_party(&OutputChunk::entry("empty.js", "")));
    }

    #[test]
    fn test_disabled_compression_returns_input() {
        let ctx = PluginContext::new();
        let options = InjectCssOptions {
            compress: false,
            ..InjectCssOptions::default()
        };
        let css = ".a {\n  color: red;\n}\n";

        let compressor = CssCompressor::new(&options).unwrap();

        assert_eq!(compressor.compress(&app_chunk(), "index.css", css, &ctx), css);
    }

    #[test]
    fn test_failure_falls_back_to_input() {
        let ctx = PluginContext::new();
        let css = ".a..b { color: red; }";

        let compressed = compressor().compress(&app_chunk(), "broken.css", css, &ctx);

        assert_eq!(compressed, css);
        assert!(matches!(
            ctx.warnings().as_slice(),
            [BuildWarning::CompressionFailed { filename, .. }] if filename == "broken.css"
        ));
    }

    #[test]
    fn test_rejects_invalid_patterns() {
        let options = InjectCssOptions {
            third_party_patterns: vec!["vendor/[".to_string()],
            ..InjectCssOptions::default()
        };

        assert!(CssCompressor::new(&options).is_err());
    }
}
