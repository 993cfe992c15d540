//! inject-css library
//!
//! Inlines the stylesheets a bundler emitted per chunk into the JavaScript
//! chunks that import them, so a module loads without fetching `.css` files.
//! Stylesheets linked directly from generated HTML stay standalone assets.

pub mod bundler;
pub mod config;
pub mod error;
pub mod plugins;
pub mod transform;
pub mod utils;

pub use bundler::{OutputAsset, OutputBundle, OutputChunk};
pub use config::{Config, InjectCssOptions};
pub use error::{BuildWarning, PluginStateError};
pub use plugins::{InjectCssPlugin, Plugin, PluginContext, PluginManager};
pub use transform::CssHook;
