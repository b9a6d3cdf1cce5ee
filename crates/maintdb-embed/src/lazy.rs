use anyhow::Result;
use parking_lot::Mutex;
use std::sync::{Arc, OnceLock};
use tracing::info;

use maintdb_core::traits::Embedder;

type Loader = Box<dyn Fn() -> Result<Arc<dyn Embedder>> + Send + Sync>;

/// Embedder loaded on first use and shared afterwards.
///
/// Concurrent first callers block on one load; a failed load is retried by
/// the next caller.
pub struct LazyEmbedder {
    cell: OnceLock<Arc<dyn Embedder>>,
    init: Mutex<()>,
    loader: Loader,
}

impl LazyEmbedder {
    pub fn new<F>(loader: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn Embedder>> + Send + Sync + 'static,
    {
        Self { cell: OnceLock::new(), init: Mutex::new(()), loader: Box::new(loader) }
    }

    /// Already loaded; `get` never calls a loader.
    pub fn ready(embedder: Arc<dyn Embedder>) -> Self {
        let lazy = Self::new(|| Err(anyhow::anyhow!("embedder is preloaded")));
        let _ = lazy.cell.set(embedder);
        lazy
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }

    pub fn get(&self) -> Result<Arc<dyn Embedder>> {
        if let Some(embedder) = self.cell.get() {
            return Ok(embedder.clone());
        }
        let _guard = self.init.lock();
        if let Some(embedder) = self.cell.get() {
            return Ok(embedder.clone());
        }
        let loaded = (self.loader)()?;
        info!("Embedder ready: {}", loaded.id());
        Ok(self.cell.get_or_init(|| loaded).clone())
    }
}
