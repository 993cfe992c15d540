//! Chunk import graph traversal

use std::collections::HashSet;

use super::{OutputBundle, OutputChunk};

/// Read-only view over the static import graph of an output bundle
#[derive(Debug, Clone, Copy)]
pub struct ChunkGraph<'a> {
    bundle: &'a OutputBundle,
}

/// A chunk on the traversal stack and the index of its next import
struct Frame<'a> {
    chunk: &'a OutputChunk,
    next_import: usize,
}

impl<'a> ChunkGraph<'a> {
    /// Create a graph view over a bundle
    pub fn new(bundle: &'a OutputBundle) -> Self {
        Self { bundle }
    }

    /// Entry chunks in emission order
    pub fn entries(&self) -> impl Iterator<Item = &'a OutputChunk> {
        self.bundle.chunks().filter(|chunk| chunk.is_entry())
    }

    /// Stylesheets a document loading `entry` links directly.
    ///
    /// Walks the static imports depth-first and lists the stylesheets of
    /// each chunk after those of its imports, so the result is in `<link>`
    /// order. Every chunk is visited once per call and every stylesheet is
    /// listed once, which keeps cyclic and diamond graphs linear.
    pub fn css_for_entry(&self, entry: &'a OutputChunk) -> Vec<String> {
        let mut visited: HashSet<&'a str> = HashSet::new();
        let mut seen: HashSet<&'a str> = HashSet::new();
        let mut css = Vec::new();

        visited.insert(entry.filename.as_str());
        let mut stack = vec![Frame {
            chunk: entry,
            next_import: 0,
        }];

        while let Some(frame) = stack.last_mut() {
            let chunk = frame.chunk;

            if let Some(import) = chunk.imports.get(frame.next_import) {
                frame.next_import += 1;
                // Imports pointing at assets or missing files are not part of the graph
                if let Some(importee) = self.bundle.chunk(import) {
                    if visited.insert(importee.filename.as_str()) {
                        stack.push(Frame {
                            chunk: importee,
                            next_import: 0,
                        });
                    }
                }
                continue;
            }

            stack.pop();
            for file in &chunk.metadata.imported_css {
                if seen.insert(file.as_str()) {
                    css.push(file.clone());
                }
            }
        }

        css
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::OutputAsset;

    #[test]
    fn test_collects_nested_css_in_link_order() {
        let mut bundle = OutputBundle::new();
        bundle.insert_chunk(
            OutputChunk::entry("index.js", "")
                .with_import("nested.js")
                .with_css("index.css"),
        );
        bundle.insert_chunk(OutputChunk::shared("nested.js", "").with_css("nested.css"));

        let graph = ChunkGraph::new(&bundle);
        let entry = bundle.chunk("index.js").unwrap();

        assert_eq!(graph.css_for_entry(entry), vec!["nested.css", "index.css"]);
    }

    #[test]
    fn test_diamond_lists_shared_css_once() {
        let mut bundle = OutputBundle::new();
        bundle.insert_chunk(
            OutputChunk::entry("index.js", "")
                .with_import("left.js")
                .with_import("right.js"),
        );
        bundle.insert_chunk(
            OutputChunk::shared("left.js", "")
                .with_import("base.js")
                .with_css("left.css"),
        );
        bundle.insert_chunk(
            OutputChunk::shared("right.js", "")
                .with_import("base.js")
                .with_css("right.css")
                .with_css("base.css"),
        );
        bundle.insert_chunk(OutputChunk::shared("base.js", "").with_css("base.css"));

        let graph = ChunkGraph::new(&bundle);
        let entry = bundle.chunk("index.js").unwrap();

        assert_eq!(
            graph.css_for_entry(entry),
            vec!["base.css", "left.css", "right.css"]
        );
    }

    #[test]
    fn test_cycle_terminates() {
        let mut bundle = OutputBundle::new();
        bundle.insert_chunk(
            OutputChunk::entry("a.js", "")
                .with_import("b.js")
                .with_css("a.css"),
        );
        bundle.insert_chunk(
            OutputChunk::shared("b.js", "")
                .with_import("a.js")
                .with_css("b.css"),
        );

        let graph = ChunkGraph::new(&bundle);
        let entry = bundle.chunk("a.js").unwrap();

        assert_eq!(graph.css_for_entry(entry), vec!["b.css", "a.css"]);
    }

    #[test]
    fn test_ignores_unknown_and_asset_imports() {
        let mut bundle = OutputBundle::new();
        bundle.insert_chunk(
            OutputChunk::entry("index.js", "")
                .with_import("missing.js")
                .with_import("logo.svg")
                .with_css("index.css"),
        );
        bundle.emit_asset(OutputAsset::new("logo.svg", "<svg/>"));

        let graph = ChunkGraph::new(&bundle);
        let entry = bundle.chunk("index.js").unwrap();

        assert_eq!(graph.css_for_entry(entry), vec!["index.css"]);
    }

    #[test]
    fn test_walk_leaves_graph_untouched() {
        let mut bundle = OutputBundle::new();
        bundle.insert_chunk(
            OutputChunk::entry("index.js", "")
                .with_import("lazy.js")
                .with_css("index.css"),
        );
        bundle.insert_chunk(OutputChunk::async_chunk("lazy.js", "").with_css("lazy.css"));
        let before = bundle.clone();

        let graph = ChunkGraph::new(&bundle);
        let entries: Vec<&str> = graph.entries().map(|c| c.filename.as_str()).collect();
        assert_eq!(entries, vec!["index.js"]);
        for entry in graph.entries() {
            graph.css_for_entry(entry);
        }

        assert_eq!(bundle, before);
    }
}
