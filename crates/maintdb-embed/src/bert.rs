use anyhow::{anyhow, Context, Result};
use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

use candle_core::{Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig, DTYPE};
use tokenizers::Tokenizer;

use maintdb_core::traits::Embedder;

use crate::device::select_device;
use crate::pool::masked_mean_l2;
use crate::tokenize::tokenize_batch;

/// Sentence-transformer BERT encoder (all-MiniLM-L6-v2 and relatives) with
/// masked mean pooling and L2 normalisation.
pub struct BertEmbedder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    model_name: String,
    dim: usize,
    max_len: usize,
    batch_size: usize,
    pad_id: u32,
}

impl BertEmbedder {
    /// Loads `tokenizer.json`, `config.json` and the weights
    /// (`model.safetensors`, else `pytorch_model.bin`) from `model_dir`.
    pub fn load(model_dir: &Path, model_name: &str, max_len: usize, batch_size: usize) -> Result<Self> {
        let device = select_device();
        info!("🔄 Loading {} from {}", model_name, model_dir.display());

        let tokenizer_path = model_dir.join("tokenizer.json");
        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow!("Failed to load tokenizer from {}: {}", tokenizer_path.display(), e))?;
        let pad_id = tokenizer.token_to_id("[PAD]").unwrap_or(0);

        let config_path = model_dir.join("config.json");
        let raw = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        let config: BertConfig = serde_json::from_str(&raw)?;
        let dim = serde_json::from_str::<serde_json::Value>(&raw)?
            .get("hidden_size")
            .and_then(|v| v.as_u64())
            .ok_or_else(|| anyhow!("{} has no hidden_size", config_path.display()))? as usize;

        let vb = Self::weights(model_dir, &device)?;
        let model = BertModel::load(vb, &config)?;
        info!("✅ Embedding model loaded (dim {})", dim);

        Ok(Self {
            model,
            tokenizer,
            device,
            model_name: model_name.to_string(),
            dim,
            max_len: max_len.max(1),
            batch_size: batch_size.max(1),
            pad_id,
        })
    }

    fn weights(model_dir: &Path, device: &Device) -> Result<VarBuilder<'static>> {
        let safetensors = model_dir.join("model.safetensors");
        if safetensors.exists() {
            debug!("Loading weights from {}", safetensors.display());
            // SAFETY: the weight file is not modified while mapped.
            let vb = unsafe { VarBuilder::from_mmaped_safetensors(&[safetensors], DTYPE, device)? };
            return Ok(vb);
        }
        let pickle = model_dir.join("pytorch_model.bin");
        debug!("Loading weights from {}", pickle.display());
        let tensors: HashMap<String, Tensor> = candle_core::pickle::read_all(&pickle)
            .with_context(|| format!("No usable weights in {}", model_dir.display()))?
            .into_iter()
            .collect();
        Ok(VarBuilder::from_tensors(tensors, DTYPE, device))
    }

    fn embed_group(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let (input_ids, attention_mask) =
            tokenize_batch(&self.tokenizer, texts, self.max_len, self.pad_id, &self.device)?;
        let token_type_ids = input_ids.zeros_like()?;
        let hidden = self.model.forward(&input_ids, &token_type_ids, Some(&attention_mask))?;
        let pooled = masked_mean_l2(&hidden, &attention_mask)?;
        Ok(pooled.to_device(&Device::Cpu)?.to_vec2::<f32>()?)
    }
}

impl Embedder for BertEmbedder {
    fn id(&self) -> String {
        format!("bert:{}:d{}", self.model_name, self.dim)
    }

    fn dim(&self) -> usize {
        self.dim
    }

    fn max_len(&self) -> usize {
        self.max_len
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let start = Instant::now();
        let mut out = Vec::with_capacity(texts.len());
        for group in texts.chunks(self.batch_size) {
            out.extend(self.embed_group(group)?);
        }
        if texts.len() == 1 && start.elapsed().as_millis() > 500 {
            warn!("⚠️  Slow embedding: {} ms", start.elapsed().as_millis());
        }
        Ok(out)
    }
}
