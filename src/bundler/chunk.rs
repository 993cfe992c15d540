//! Rendered JavaScript chunks as handed to plugins

use indexmap::IndexSet;

/// Type of chunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkType {
    /// Entry point chunk - loaded immediately
    Entry,
    /// Async chunk - loaded on demand via dynamic import
    Async,
    /// Shared chunk - contains modules used by multiple entry points
    Shared,
}

/// Bundler bookkeeping attached to a rendered chunk
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkMetadata {
    /// Stylesheet filenames this chunk depends on, in import order.
    ///
    /// The runtime loader fetches every entry left here, so it must be
    /// emptied once the styles have been inlined.
    pub imported_css: IndexSet<String>,
}

/// A chunk of generated JavaScript in the output bundle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputChunk {
    /// Output filename, unique within the bundle
    pub filename: String,

    /// Type of chunk
    pub chunk_type: ChunkType,

    /// Generated code
    pub code: String,

    /// Filenames of chunks this chunk statically imports
    pub imports: Vec<String>,

    /// Ids of the modules rendered into this chunk
    pub module_ids: Vec<String>,

    /// Bundler metadata
    pub metadata: ChunkMetadata,
}

impl OutputChunk {
    /// Create a new entry chunk
    pub fn entry(filename: impl Into<String>, code: impl Into<String>) -> Self {
        Self::new(filename, ChunkType::Entry, code)
    }

    /// Create a new async chunk
    pub fn async_chunk(filename: impl Into<String>, code: impl Into<String>) -> Self {
        Self::new(filename, ChunkType::Async, code)
    }

    /// Create a new shared chunk
    pub fn shared(filename: impl Into<String>, code: impl Into<String>) -> Self {
        Self::new(filename, ChunkType::Shared, code)
    }

    fn new(filename: impl Into<String>, chunk_type: ChunkType, code: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            chunk_type,
            code: code.into(),
            imports: Vec::new(),
            module_ids: Vec::new(),
            metadata: ChunkMetadata::default(),
        }
    }

    /// Add a static import of another chunk
    pub fn with_import(mut self, filename: impl Into<String>) -> Self {
        self.imports.push(filename.into());
        self
    }

    /// Add a module rendered into this chunk
    pub fn with_module(mut self, module_id: impl Into<String>) -> Self {
        self.module_ids.push(module_id.into());
        self
    }

    /// Add a stylesheet dependency
    pub fn with_css(mut self, filename: impl Into<String>) -> Self {
        self.metadata.imported_css.insert(filename.into());
        self
    }

    /// Whether this chunk is loaded directly by a document
    pub fn is_entry(&self) -> bool {
        self.chunk_type == ChunkType::Entry
    }

    /// Whether any stylesheet still has to be loaded for this chunk
    pub fn has_css(&self) -> bool {
        !self.metadata.imported_css.is_empty()
    }
}
