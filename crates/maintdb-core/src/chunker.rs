//! Fixed-size, overlapping character windows over extracted page text.
//!
//! Windows are measured in Unicode scalar values, not bytes, so multi-byte
//! text never splits inside a character. Output order is fully determined by
//! the input and the parameters; chunk ids downstream depend on it.

use serde::{Deserialize, Serialize};

pub const DEFAULT_CHUNK_SIZE: usize = 900;
pub const DEFAULT_CHUNK_OVERLAP: usize = 180;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ChunkingConfig {
    pub size: usize,
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self { size: DEFAULT_CHUNK_SIZE, overlap: DEFAULT_CHUNK_OVERLAP }
    }
}

impl ChunkingConfig {
    /// Distance between consecutive window starts. Never zero.
    pub fn step(&self) -> usize {
        self.size.saturating_sub(self.overlap).max(1)
    }

    pub fn chunk(&self, text: &str) -> Vec<String> {
        chunk(text, self.size, self.overlap)
    }
}

/// Split `text` into windows of `size` characters whose starts advance by
/// `size - overlap` (at least 1).
///
/// NUL characters are removed first. Every window is trimmed and empty
/// windows are dropped. A `size` of zero yields no chunks.
pub fn chunk(text: &str, size: usize, overlap: usize) -> Vec<String> {
    if size == 0 {
        return Vec::new();
    }
    let cleaned: String = text.chars().filter(|&c| c != '\0').collect();
    // byte offset of every char boundary, including the end of the string
    let bounds: Vec<usize> = cleaned
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(cleaned.len()))
        .collect();
    let char_count = bounds.len() - 1;
    let step = ChunkingConfig { size, overlap }.step();

    let mut chunks = Vec::with_capacity(char_count / step + 1);
    let mut start = 0;
    while start < char_count {
        let end = start.saturating_add(size).min(char_count);
        let window = cleaned[bounds[start]..bounds[end]].trim();
        if !window.is_empty() {
            chunks.push(window.to_string());
        }
        start = start.saturating_add(step);
    }
    chunks
}
