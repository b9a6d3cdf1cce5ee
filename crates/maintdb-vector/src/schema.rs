use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use maintdb_core::types::{Chunk, ChunkId, DocType};

pub const INDEX_FILE: &str = "vectors.idx";
pub const CHUNK_LOG_FILE: &str = "chunks.jsonl";
pub const META_FILE: &str = "meta.json";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChunkMetadata {
    pub source_path: String,
    pub page: u32,
    pub doc_type: DocType,
}

/// One line of `chunks.jsonl`. `position` is the line index and the row of
/// the matching vector in `vectors.idx`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChunkRecord {
    pub position: ChunkId,
    pub text: String,
    pub metadata: ChunkMetadata,
}

impl From<&Chunk> for ChunkRecord {
    fn from(chunk: &Chunk) -> Self {
        Self {
            position: chunk.id,
            text: chunk.text.clone(),
            metadata: ChunkMetadata {
                source_path: chunk.source_path.clone(),
                page: chunk.page,
                doc_type: chunk.doc_type,
            },
        }
    }
}

impl From<ChunkRecord> for Chunk {
    fn from(record: ChunkRecord) -> Self {
        Chunk {
            id: record.position,
            text: record.text,
            source_path: record.metadata.source_path,
            page: record.metadata.page,
            doc_type: record.metadata.doc_type,
        }
    }
}

/// Contents of `meta.json`, written last by a build.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexMeta {
    pub dimension: usize,
    pub count: usize,
    pub embedder_id: String,
    pub built_at: DateTime<Utc>,
    /// blake3 hex of `chunks.jsonl`
    pub chunk_log_digest: String,
    /// blake3 hex of `vectors.idx`
    pub index_digest: String,
}
