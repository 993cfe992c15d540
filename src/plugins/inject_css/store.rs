//! Captured stylesheet content for one finalization pass

use std::collections::HashSet;

use indexmap::IndexMap;
use tracing::debug;

use crate::bundler::{OutputBundle, OutputFile};
use crate::utils::is_css_file;

/// Stylesheets pulled out of the output bundle, keyed by filename.
///
/// Content stays available until [`StylesheetStore::drain`], so a stylesheet
/// shared by several chunks can be taken once per chunk.
#[derive(Debug, Default)]
pub struct StylesheetStore {
    entries: IndexMap<String, Vec<u8>>,
    consumed: HashSet<String>,
}

impl StylesheetStore {
    /// Move every stylesheet asset out of the bundle into a new store
    pub fn capture(bundle: &mut OutputBundle) -> Self {
        let mut store = Self::default();

        for filename in bundle.asset_filenames() {
            if !is_css_file(&filename) {
                continue;
            }
            if let Some(OutputFile::Asset(asset)) = bundle.remove(&filename) {
                store.entries.insert(asset.filename, asset.source);
            }
        }

        debug!("Captured {} stylesheet(s)", store.entries.len());
        store
    }

    /// Content of a captured stylesheet, marking it as consumed
    pub fn take(&mut self, filename: &str) -> Option<&[u8]> {
        let source = self.entries.get(filename)?;
        self.consumed.insert(filename.to_string());
        Some(source.as_slice())
    }

    /// End the pass, returning the stylesheets no chunk took
    pub fn drain(self) -> Vec<(String, Vec<u8>)> {
        let consumed = self.consumed;
        self.entries
            .into_iter()
            .filter(|(filename, _)| !consumed.contains(filename))
            .collect()
    }
}
