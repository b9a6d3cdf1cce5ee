use std::sync::Arc;
use tracing::debug;

use maintdb_core::traits::Embedder;
use maintdb_core::types::{Chunk, SearchResult};
use maintdb_core::{Error, Result};

use crate::flat::FlatIndex;
use crate::schema::IndexMeta;
use crate::store::{IndexStore, LoadedIndex};

/// A loaded, immutable index plus the embedder it was built with. Shared
/// read-only between concurrent searches.
pub struct RetrievalContext {
    embedder: Arc<dyn Embedder>,
    index: FlatIndex,
    chunks: Vec<Chunk>,
    meta: IndexMeta,
}

impl RetrievalContext {
    pub fn load(store: &IndexStore, embedder: Arc<dyn Embedder>) -> Result<Self> {
        let LoadedIndex { meta, index, chunks } = store.load(embedder.as_ref())?;
        Ok(Self { embedder, index, chunks, meta })
    }

    pub fn meta(&self) -> &IndexMeta {
        &self.meta
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn chunk(&self, position: usize) -> Option<&Chunk> {
        self.chunks.get(position)
    }

    /// At most `k` passages by descending score. An empty index gives an
    /// empty result, not an error.
    pub fn search(&self, query: &str, k: usize) -> Result<Vec<SearchResult>> {
        if k == 0 || self.index.is_empty() {
            return Ok(Vec::new());
        }
        let q = self.embedder.embed_query(query)?;
        let hits = self.index.search(&q, k)?;
        debug!("Query matched {} of {} vectors", hits.len(), self.index.len());

        hits.into_iter()
            .map(|(pos, score)| {
                let chunk = self
                    .chunks
                    .get(pos)
                    .cloned()
                    .ok_or_else(|| Error::CorruptIndex(format!("vector {pos} has no chunk record")))?;
                Ok(SearchResult { score, chunk })
            })
            .collect()
    }
}
