//! Domain types shared by the extractors, the index store and the search engine.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Position of a chunk in build order. Also the row of its vector in the index.
pub type ChunkId = usize;

/// Kind of source document a chunk was extracted from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DocType {
    Pdf,
    Slide,
}

impl DocType {
    /// File extension label used in citations (`.pdf`, `.pptx`).
    pub fn extension_label(self) -> &'static str {
        match self {
            DocType::Pdf => ".pdf",
            DocType::Slide => ".pptx",
        }
    }
}

impl fmt::Display for DocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocType::Pdf => f.write_str("pdf"),
            DocType::Slide => f.write_str("slide"),
        }
    }
}

/// Text of a single page or slide as produced by an extractor.
///
/// `page` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    pub page: u32,
    pub text: String,
}

/// A passage of a source document that is independently embedded and indexed.
///
/// - `id`: position in build order; the i-th chunk owns the i-th vector
/// - `source_path`: path of the source file as discovered during ingestion
/// - `page`: 1-based page (or slide) number the passage came from
/// - `doc_type`: which extractor produced it
///
/// Chunks are immutable once written; only a full rebuild replaces them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chunk {
    pub id: ChunkId,
    pub text: String,
    pub source_path: String,
    pub page: u32,
    pub doc_type: DocType,
}

impl Chunk {
    /// File name of the source document, or `"document"` when it has none.
    pub fn file_name(&self) -> &str {
        Path::new(&self.source_path)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("document")
    }
}

/// A scored passage returned by a search. Higher `score` is more similar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub score: f32,
    pub chunk: Chunk,
}

/// Summary of a completed index build.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BuildStats {
    pub vector_count: usize,
    pub dim: usize,
    pub file_count: usize,
}

impl fmt::Display for BuildStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "vectors={} dim={} files={}",
            self.vector_count, self.dim, self.file_count
        )
    }
}
