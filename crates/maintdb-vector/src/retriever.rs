use parking_lot::RwLock;
use std::path::Path;
use std::sync::Arc;

use maintdb_core::config::Settings;
use maintdb_core::traits::Embedder;
use maintdb_core::types::{BuildStats, SearchResult};
use maintdb_core::{Error, Result};
use maintdb_embed::{load_embedder, LazyEmbedder};
use maintdb_extract::{IngestReport, Ingestor};

use crate::schema::IndexMeta;
use crate::search::RetrievalContext;
use crate::store::IndexStore;

/// Outcome of a full rebuild: the stats of the new index and what happened
/// to each discovered file.
#[derive(Debug, Clone)]
pub struct RebuildSummary {
    pub stats: BuildStats,
    pub ingest: IngestReport,
}

/// Service handle over one index directory.
///
/// The embedder is loaded on first use and kept for the life of the handle.
/// The loaded index is cached until the next rebuild; searches share it
/// under a read lock while a rebuild holds the write lock throughout.
pub struct Retriever {
    store: IndexStore,
    ingestor: Ingestor,
    embedder: LazyEmbedder,
    context: RwLock<Option<Arc<RetrievalContext>>>,
}

impl Retriever {
    pub fn new<F>(store: IndexStore, ingestor: Ingestor, loader: F) -> Self
    where
        F: Fn() -> anyhow::Result<Arc<dyn Embedder>> + Send + Sync + 'static,
    {
        Self::with_lazy(store, ingestor, LazyEmbedder::new(loader))
    }

    /// Uses an already constructed embedder.
    pub fn with_embedder(store: IndexStore, ingestor: Ingestor, embedder: Arc<dyn Embedder>) -> Self {
        Self::with_lazy(store, ingestor, LazyEmbedder::ready(embedder))
    }

    fn with_lazy(store: IndexStore, ingestor: Ingestor, embedder: LazyEmbedder) -> Self {
        Self { store, ingestor, embedder, context: RwLock::new(None) }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        let store = IndexStore::new(settings.data.index_path()).with_batch_size(settings.embedding.batch_size);
        let ingestor = Ingestor::new(settings.chunking);
        let embedding = settings.embedding.clone();
        Self::new(store, ingestor, move || load_embedder(&embedding).map(Arc::from))
    }

    pub fn store(&self) -> &IndexStore {
        &self.store
    }

    pub fn embedder(&self) -> Result<Arc<dyn Embedder>> {
        self.embedder.get().map_err(Error::Embedding)
    }

    /// The cached context, loading it on first use.
    pub fn context(&self) -> Result<Arc<RetrievalContext>> {
        if let Some(ctx) = self.context.read().as_ref() {
            return Ok(ctx.clone());
        }
        let mut slot = self.context.write();
        if let Some(ctx) = slot.as_ref() {
            return Ok(ctx.clone());
        }
        let ctx = Arc::new(RetrievalContext::load(&self.store, self.embedder()?)?);
        *slot = Some(ctx.clone());
        Ok(ctx)
    }

    pub fn search(&self, query: &str, k: usize) -> Result<Vec<SearchResult>> {
        self.context()?.search(query, k)
    }

    pub fn status(&self) -> Result<Option<IndexMeta>> {
        self.store.status()
    }

    /// Re-ingests `root` and replaces the index. Searches wait until the
    /// rebuild finishes, then reload.
    pub fn rebuild(&self, root: &Path) -> Result<RebuildSummary> {
        let mut slot = self.context.write();
        *slot = None;
        let embedder = self.embedder()?;
        let ingest = self.ingestor.ingest(root);
        let stats = self.store.build(&ingest, embedder.as_ref())?;
        Ok(RebuildSummary { stats, ingest })
    }

    /// Drops the cached context so the next search reloads from disk.
    pub fn invalidate(&self) {
        *self.context.write() = None;
    }
}
