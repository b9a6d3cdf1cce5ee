//! maintdb-embed
//!
//! Text embedders behind the `Embedder` trait: a local BERT sentence
//! encoder and a deterministic hashing embedder for tests and offline runs.

use anyhow::{anyhow, Result};
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use tracing::info;
use twox_hash::XxHash64;

use maintdb_core::config::{expand_path, EmbeddingConfig};
use maintdb_core::traits::Embedder;

pub mod bert;
pub mod device;
pub mod lazy;
pub mod pool;
pub mod tokenize;

pub use bert::BertEmbedder;
pub use lazy::LazyEmbedder;
pub use pool::masked_mean_l2;

/// Token-hashing embedder. Same text, same unit vector; no model files needed.
pub struct FakeEmbedder {
    dim: usize,
}

impl FakeEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim: dim.max(1) }
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0f32; self.dim];
        for (i, token) in text.split_whitespace().enumerate() {
            let mut hasher = XxHash64::with_seed(0);
            token.to_lowercase().hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h as usize) % self.dim;
            let val = (((h >> 32) as u32) as f32) / (u32::MAX as f32);
            v[idx] += val + (i as f32 % 3.0) * 0.01;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt().max(1e-6);
        for x in &mut v {
            *x /= norm;
        }
        v
    }
}

impl Embedder for FakeEmbedder {
    fn id(&self) -> String {
        format!("fake:xxh64:d{}", self.dim)
    }

    fn dim(&self) -> usize {
        self.dim
    }

    fn max_len(&self) -> usize {
        usize::MAX
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }
}

/// `APP_USE_FAKE_EMBEDDINGS=1|true` forces the hashing embedder.
pub fn fake_requested(config: &EmbeddingConfig) -> bool {
    config.use_fake
        || std::env::var("APP_USE_FAKE_EMBEDDINGS")
            .ok()
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
}

/// Embedder selected by `config`. Loads model files from disk unless the
/// fake embedder is requested.
pub fn load_embedder(config: &EmbeddingConfig) -> Result<Box<dyn Embedder>> {
    if fake_requested(config) {
        info!("🧪 Using FakeEmbedder (dim {})", config.fake_dim);
        return Ok(Box::new(FakeEmbedder::new(config.fake_dim)));
    }
    let model_dir = resolve_model_dir(config)?;
    Ok(Box::new(BertEmbedder::load(&model_dir, &config.model, config.max_len, config.batch_size)?))
}

/// First existing directory of: `embedding.model_dir`, `$APP_MODEL_DIR`,
/// `$MODEL_DIR`, `models/<name>`, `../models/<name>` where `<name>` is the
/// last segment of the model identifier.
pub fn resolve_model_dir(config: &EmbeddingConfig) -> Result<PathBuf> {
    if let Some(dir) = &config.model_dir {
        let p = expand_path(dir);
        if p.exists() {
            info!("📦 Using configured model dir: {}", p.display());
            return Ok(p);
        }
    }
    for var in ["APP_MODEL_DIR", "MODEL_DIR"] {
        if let Ok(dir) = std::env::var(var) {
            let p = expand_path(&dir);
            if p.exists() {
                info!("📦 Using {}: {}", var, p.display());
                return Ok(p);
            }
        }
    }
    let name = config.model.rsplit('/').next().unwrap_or(config.model.as_str());
    for base in ["models", "../models"] {
        let p = Path::new(base).join(name);
        if p.exists() {
            info!("📦 Using model dir: {}", p.display());
            return Ok(p);
        }
    }
    Err(anyhow!("Could not locate model directory for {}", config.model))
}
