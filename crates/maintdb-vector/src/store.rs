//! Persisted index: `vectors.idx`, `chunks.jsonl` and `meta.json` in one
//! directory, always replaced together by a full build.
use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use maintdb_core::traits::Embedder;
use maintdb_core::types::{BuildStats, Chunk};
use maintdb_core::{Error, Result};
use maintdb_extract::IngestReport;

use crate::flat::FlatIndex;
use crate::schema::{ChunkRecord, IndexMeta, CHUNK_LOG_FILE, INDEX_FILE, META_FILE};

const DEFAULT_BATCH_SIZE: usize = 64;

/// Everything a successful load hands to the search side.
#[derive(Debug, Clone)]
pub struct LoadedIndex {
    pub meta: IndexMeta,
    pub index: FlatIndex,
    pub chunks: Vec<Chunk>,
}

#[derive(Debug, Clone)]
pub struct IndexStore {
    dir: PathBuf,
    batch_size: usize,
}

impl IndexStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into(), batch_size: DEFAULT_BATCH_SIZE }
    }

    /// Texts per embedder call during a build.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn index_path(&self) -> PathBuf {
        self.dir.join(INDEX_FILE)
    }

    pub fn chunk_log_path(&self) -> PathBuf {
        self.dir.join(CHUNK_LOG_FILE)
    }

    pub fn meta_path(&self) -> PathBuf {
        self.dir.join(META_FILE)
    }

    /// Meta of the committed index, if any, without reading vectors.
    pub fn status(&self) -> Result<Option<IndexMeta>> {
        match fs::read(self.meta_path()) {
            Ok(bytes) => Ok(Some(parse_meta(&bytes)?)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Embeds every chunk of `report` and replaces the persisted index.
    pub fn build(&self, report: &IngestReport, embedder: &dyn Embedder) -> Result<BuildStats> {
        let chunks: Vec<Chunk> = report.chunks().cloned().collect();
        self.build_chunks(&report.root, &chunks, report.file_count(), embedder)
    }

    /// Embeds `chunks` and replaces the persisted index. `root` only names
    /// the corpus in errors; `file_count` is reported back in the stats.
    ///
    /// Fails before touching disk with `EmptyCorpus` when `chunks` is empty
    /// and with `InvalidInput` when a chunk id differs from its position.
    pub fn build_chunks(
        &self,
        root: &Path,
        chunks: &[Chunk],
        file_count: usize,
        embedder: &dyn Embedder,
    ) -> Result<BuildStats> {
        if chunks.is_empty() {
            return Err(Error::EmptyCorpus { root: root.to_path_buf() });
        }
        if let Some((pos, chunk)) = chunks.iter().enumerate().find(|(pos, c)| c.id != *pos) {
            return Err(Error::InvalidInput(format!("chunk at position {pos} carries id {}", chunk.id)));
        }

        let index = self.embed_all(chunks, embedder)?;

        let mut log = Vec::new();
        for chunk in chunks {
            serde_json::to_writer(&mut log, &ChunkRecord::from(chunk))?;
            log.push(b'\n');
        }
        let index_bytes = index.to_bytes();

        let meta = IndexMeta {
            dimension: index.dim(),
            count: index.len(),
            embedder_id: embedder.id(),
            built_at: Utc::now(),
            chunk_log_digest: digest(&log),
            index_digest: digest(&index_bytes),
        };
        let meta_bytes = serde_json::to_vec_pretty(&meta)?;

        fs::create_dir_all(&self.dir)?;
        self.replace(INDEX_FILE, &index_bytes)?;
        self.replace(CHUNK_LOG_FILE, &log)?;
        self.replace(META_FILE, &meta_bytes)?;

        let stats = BuildStats { vector_count: index.len(), dim: index.dim(), file_count };
        info!("📊 Index written to {} ({})", self.dir.display(), stats);
        Ok(stats)
    }

    fn embed_all(&self, chunks: &[Chunk], embedder: &dyn Embedder) -> Result<FlatIndex> {
        let dim = embedder.dim();
        let mut index = FlatIndex::with_capacity(dim, chunks.len());

        let pb = ProgressBar::new(chunks.len() as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chunks ({percent}%) {msg}")
        {
            pb.set_style(style.progress_chars("#>-"));
        }

        for batch in chunks.chunks(self.batch_size) {
            let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
            let vectors = embedder.embed_batch(&texts)?;
            if vectors.len() != texts.len() {
                return Err(Error::Embedding(anyhow::anyhow!(
                    "embedder returned {} vectors for {} texts",
                    vectors.len(),
                    texts.len()
                )));
            }
            for vector in &vectors {
                index.add(vector)?;
            }
            pb.inc(batch.len() as u64);
        }
        pb.finish_with_message("✅ embedded");
        Ok(index)
    }

    /// Writes `bytes` to a sibling temp file and renames it over `name`.
    fn replace(&self, name: &str, bytes: &[u8]) -> Result<()> {
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(self.dir.join(name)).map_err(|e| e.error)?;
        debug!("Committed {}", name);
        Ok(())
    }

    /// Reads and cross-checks all three artifacts against each other and
    /// against `embedder`.
    pub fn load(&self, embedder: &dyn Embedder) -> Result<LoadedIndex> {
        let meta = self.status()?.ok_or_else(|| Error::IndexNotFound { dir: self.dir.clone() })?;

        if meta.embedder_id != embedder.id() || meta.dimension != embedder.dim() {
            return Err(Error::ModelMismatch { built_with: meta.embedder_id, loaded: embedder.id() });
        }

        let index_bytes = read_artifact(&self.index_path())?;
        let log_bytes = read_artifact(&self.chunk_log_path())?;

        let index = FlatIndex::from_bytes(&index_bytes)?;
        if index.dim() != meta.dimension || index.len() != meta.count {
            return Err(Error::CorruptIndex(format!(
                "vector index holds {} x {}, meta.json records {} x {}",
                index.len(),
                index.dim(),
                meta.count,
                meta.dimension
            )));
        }

        let chunks = parse_chunk_log(&log_bytes)?;
        if chunks.len() != index.len() {
            return Err(Error::CorruptIndex(format!(
                "chunk log has {} records but index has {} vectors",
                chunks.len(),
                index.len()
            )));
        }

        if digest(&index_bytes) != meta.index_digest {
            return Err(Error::CorruptIndex(format!("{INDEX_FILE} does not match meta.json digest")));
        }
        if digest(&log_bytes) != meta.chunk_log_digest {
            return Err(Error::CorruptIndex(format!("{CHUNK_LOG_FILE} does not match meta.json digest")));
        }

        info!("📂 Loaded index from {} ({} vectors, dim {})", self.dir.display(), meta.count, meta.dimension);
        Ok(LoadedIndex { meta, index, chunks })
    }
}

fn digest(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

fn parse_meta(bytes: &[u8]) -> Result<IndexMeta> {
    serde_json::from_slice(bytes).map_err(|e| Error::CorruptIndex(format!("unreadable {META_FILE}: {e}")))
}

fn read_artifact(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| {
        warn!("Index artifact {} unreadable: {}", path.display(), e);
        Error::CorruptIndex(format!("{} is unreadable: {e}", path.display()))
    })
}

/// Records in file order; each must sit on the line matching its position.
fn parse_chunk_log(bytes: &[u8]) -> Result<Vec<Chunk>> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| Error::CorruptIndex(format!("{CHUNK_LOG_FILE} is not UTF-8: {e}")))?;
    let mut chunks = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        let record: ChunkRecord = serde_json::from_str(line)
            .map_err(|e| Error::CorruptIndex(format!("{CHUNK_LOG_FILE} line {}: {e}", line_no + 1)))?;
        if record.position != line_no {
            return Err(Error::CorruptIndex(format!(
                "{CHUNK_LOG_FILE} line {} holds position {}",
                line_no + 1,
                record.position
            )));
        }
        chunks.push(Chunk::from(record));
    }
    Ok(chunks)
}
