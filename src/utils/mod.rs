//! Utility functions and helpers

use std::borrow::Cow;
use std::path::Path;

/// Check if an output filename names a stylesheet
pub fn is_css_file(filename: &str) -> bool {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("css"))
}

/// Normalize a module id to forward slashes so path globs match on every platform
pub fn normalize_module_id(id: &str) -> Cow<'_, str> {
    if id.contains('\\') {
        Cow::Owned(id.replace('\\', "/"))
    } else {
        Cow::Borrowed(id)
    }
}

/// Format bytes as human-readable size
pub fn format_size(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = KB * 1024;
    const GB: usize = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
