//! Stylesheet transformation
//!
//! Compression of captured stylesheets and the codegen that inlines them
//! into JavaScript chunks.

mod compress;
mod inject;

pub use compress::CssCompressor;
pub use inject::{apply_css_hook, inject_style, style_bootstrap, CssHook};
