use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Build input that cannot be persisted as given, e.g. ids that are not
    /// their positions.
    #[error("Invalid build input: {0}")]
    InvalidInput(String),

    /// A single file could not be read. Ingestion records it and moves on.
    #[error("Failed to extract {}: {reason}", path.display())]
    Extraction { path: PathBuf, reason: String },

    #[error("No chunks produced from document tree {}", root.display())]
    EmptyCorpus { root: PathBuf },

    #[error("No index built yet in {}", dir.display())]
    IndexNotFound { dir: PathBuf },

    /// Index and chunk log disagree. Recover with a full rebuild.
    #[error("Corrupt index: {0}")]
    CorruptIndex(String),

    #[error("Index was built with embedder '{built_with}' but '{loaded}' is loaded")]
    ModelMismatch { built_with: String, loaded: String },

    #[error("Embedding failed: {0}")]
    Embedding(#[from] anyhow::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// True for failures whose only remedy is rebuilding the index.
    pub fn requires_rebuild(&self) -> bool {
        matches!(self, Error::CorruptIndex(_) | Error::ModelMismatch { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
