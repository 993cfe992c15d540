//! Output bundle representation
//!
//! The rendered chunks and assets a build produces, as seen by plugins
//! during bundle finalization.

mod chunk;
mod graph;

use std::borrow::Cow;

use indexmap::IndexMap;

pub use chunk::{ChunkMetadata, ChunkType, OutputChunk};
pub use graph::ChunkGraph;

/// A non-JavaScript output file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputAsset {
    /// Output filename, unique within the bundle
    pub filename: String,

    /// Raw file content
    pub source: Vec<u8>,
}

impl OutputAsset {
    /// Create a new asset
    pub fn new(filename: impl Into<String>, source: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            source: source.into(),
        }
    }

    /// Content decoded as UTF-8, replacing invalid sequences
    pub fn source_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.source)
    }
}

/// A single entry of the output bundle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputFile {
    Chunk(Box<OutputChunk>),
    Asset(OutputAsset),
}

impl OutputFile {
    /// Output filename
    pub fn filename(&self) -> &str {
        match self {
            OutputFile::Chunk(chunk) => &chunk.filename,
            OutputFile::Asset(asset) => &asset.filename,
        }
    }
}

/// The final output set of a build, keyed by filename in emission order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputBundle {
    files: IndexMap<String, OutputFile>,
}

impl OutputBundle {
    /// Create an empty bundle
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a chunk, replacing any file with the same name
    pub fn insert_chunk(&mut self, chunk: OutputChunk) {
        self.files
            .insert(chunk.filename.clone(), OutputFile::Chunk(Box::new(chunk)));
    }

    /// Emit an asset, replacing any file with the same name.
    ///
    /// Returns `true` when a previous file was replaced.
    pub fn emit_asset(&mut self, asset: OutputAsset) -> bool {
        self.files
            .insert(asset.filename.clone(), OutputFile::Asset(asset))
            .is_some()
    }

    /// Look up any output file
    pub fn get(&self, filename: &str) -> Option<&OutputFile> {
        self.files.get(filename)
    }

    /// Look up a chunk
    pub fn chunk(&self, filename: &str) -> Option<&OutputChunk> {
        match self.files.get(filename) {
            Some(OutputFile::Chunk(chunk)) => Some(chunk),
            _ => None,
        }
    }

    /// Look up a chunk for mutation
    pub fn chunk_mut(&mut self, filename: &str) -> Option<&mut OutputChunk> {
        match self.files.get_mut(filename) {
            Some(OutputFile::Chunk(chunk)) => Some(chunk),
            _ => None,
        }
    }

    /// Look up an asset
    pub fn asset(&self, filename: &str) -> Option<&OutputAsset> {
        match self.files.get(filename) {
            Some(OutputFile::Asset(asset)) => Some(asset),
            _ => None,
        }
    }

    /// Remove a file from the final output set, keeping the order of the rest
    pub fn remove(&mut self, filename: &str) -> Option<OutputFile> {
        self.files.shift_remove(filename)
    }

    /// All chunks in emission order
    pub fn chunks(&self) -> impl Iterator<Item = &OutputChunk> {
        self.files.values().filter_map(|file| match file {
            OutputFile::Chunk(chunk) => Some(chunk.as_ref()),
            OutputFile::Asset(_) => None,
        })
    }

    /// All assets in emission order
    pub fn assets(&self) -> impl Iterator<Item = &OutputAsset> {
        self.files.values().filter_map(|file| match file {
            OutputFile::Asset(asset) => Some(asset),
            OutputFile::Chunk(_) => None,
        })
    }

    /// Snapshot of chunk filenames, for loops that mutate the bundle
    pub fn chunk_filenames(&self) -> Vec<String> {
        self.chunks().map(|chunk| chunk.filename.clone()).collect()
    }

    /// Snapshot of asset filenames, for loops that mutate the bundle
    pub fn asset_filenames(&self) -> Vec<String> {
        self.assets().map(|asset| asset.filename.clone()).collect()
    }

    /// Number of output files
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if bundle is empty
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
