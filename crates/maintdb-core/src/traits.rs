use std::path::Path;

use crate::types::{DocType, PageText};

/// Maps text to fixed-dimension, L2-normalized vectors.
///
/// Inner product between two outputs equals their cosine similarity.
pub trait Embedder: Send + Sync {
    /// Stable identifier for the model (e.g. `bert:all-MiniLM-L6-v2:d384`).
    fn id(&self) -> String;
    fn dim(&self) -> usize;
    fn max_len(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;

    fn embed_query(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        self.embed_batch(&[text.to_string()])?
            .pop()
            .ok_or_else(|| anyhow::anyhow!("embedder returned no vector for query"))
    }
}

/// Reads one kind of source document into per-page text.
pub trait Extractor: Send + Sync {
    fn doc_type(&self) -> DocType;
    /// Lower-case file extensions this extractor handles, without the dot.
    fn extensions(&self) -> &'static [&'static str];
    fn extract(&self, path: &Path) -> anyhow::Result<Vec<PageText>>;

    fn handles(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions().iter().any(|e| ext.eq_ignore_ascii_case(e)))
    }
}
