//! Error and warning types

use thiserror::Error;

/// A recoverable problem found during a build.
///
/// None of these fail the build; each one degrades toward leaving the
/// content unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildWarning {
    #[error("`build.css_code_split` is disabled; stylesheets are left as emitted")]
    CssCodeSplitDisabled,

    #[error("failed to compress {filename}: {reason}")]
    CompressionFailed { filename: String, reason: String },

    #[error("css hook returned no usable value for {filename}; injecting the compressed stylesheet")]
    EmptyHookResult { filename: String },

    #[error("css hook failed for {filename}: {reason}")]
    HookFailed { filename: String, reason: String },

    #[error("{filename} is not valid UTF-8; emitting it as a standalone asset")]
    InvalidUtf8 { filename: String },
}

/// A plugin hook was called out of lifecycle order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PluginStateError {
    #[error("`{hook}` called before `config`")]
    NotConfigured { hook: &'static str },

    #[error("`{hook}` called after the bundle was finalized; call `build_start` to begin a new build")]
    AlreadyFinalized { hook: &'static str },
}
