use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use maintdb_core::chunker::ChunkingConfig;
use maintdb_core::traits::Extractor;
use maintdb_core::types::{Chunk, PageText};
use maintdb_core::Error;

use crate::{PdfExtractor, SlideExtractor};

/// Result of reading one source file.
#[derive(Debug, Clone)]
pub enum Extraction {
    Extracted(Vec<Chunk>),
    Skipped(String),
}

#[derive(Debug, Clone)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub extraction: Extraction,
}

/// Per-file outcomes of one pass over a document tree, in discovery order.
///
/// Chunk ids are contiguous across the extracted files, starting at zero.
#[derive(Debug, Clone)]
pub struct IngestReport {
    pub root: PathBuf,
    pub outcomes: Vec<FileOutcome>,
}

impl IngestReport {
    /// Number of matching files discovered, readable or not.
    pub fn file_count(&self) -> usize {
        self.outcomes.len()
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks().count()
    }

    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.outcomes
            .iter()
            .filter_map(|o| match &o.extraction {
                Extraction::Extracted(chunks) => Some(chunks),
                Extraction::Skipped(_) => None,
            })
            .flatten()
    }

    pub fn into_chunks(self) -> Vec<Chunk> {
        self.outcomes
            .into_iter()
            .flat_map(|o| match o.extraction {
                Extraction::Extracted(chunks) => chunks,
                Extraction::Skipped(_) => Vec::new(),
            })
            .collect()
    }

    pub fn skipped(&self) -> impl Iterator<Item = (&Path, &str)> {
        self.outcomes.iter().filter_map(|o| match &o.extraction {
            Extraction::Skipped(reason) => Some((o.path.as_path(), reason.as_str())),
            Extraction::Extracted(_) => None,
        })
    }
}

/// Walks a document tree, dispatches each file to its extractor and chunks
/// every page independently so page attribution survives.
pub struct Ingestor {
    extractors: Vec<Box<dyn Extractor>>,
    chunking: ChunkingConfig,
}

impl Ingestor {
    /// PDF and slide-deck extractors.
    pub fn new(chunking: ChunkingConfig) -> Self {
        Self::with_extractors(chunking, vec![Box::new(PdfExtractor::new()), Box::new(SlideExtractor::new())])
    }

    pub fn with_extractors(chunking: ChunkingConfig, extractors: Vec<Box<dyn Extractor>>) -> Self {
        Self { extractors, chunking }
    }

    /// Files under `root` some extractor handles, sorted by path.
    pub fn discover(&self, root: &Path) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = walkdir::WalkDir::new(root)
            .follow_links(true)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'))
            .filter_map(|entry| match entry {
                Ok(e) => Some(e),
                Err(e) => {
                    warn!("Skipping unreadable entry: {e}");
                    None
                }
            })
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| self.extractor_for(p).is_some())
            .collect();
        files.sort();
        files
    }

    pub fn ingest(&self, root: &Path) -> IngestReport {
        if !root.exists() {
            warn!("Document tree {} does not exist", root.display());
        }
        let files = self.discover(root);
        info!("Found {} documents under {}", files.len(), root.display());

        let mut next_id = 0usize;
        let mut outcomes = Vec::with_capacity(files.len());
        for (file_index, path) in files.into_iter().enumerate() {
            debug!("Processing file {}: {}", file_index + 1, path.display());
            let extraction = self.extract_file(&path, &mut next_id);
            outcomes.push(FileOutcome { path, extraction });
        }

        let report = IngestReport { root: root.to_path_buf(), outcomes };
        info!(
            "Processed {} files into {} chunks ({} skipped)",
            report.file_count(),
            report.chunk_count(),
            report.skipped().count()
        );
        report
    }

    fn extractor_for(&self, path: &Path) -> Option<&dyn Extractor> {
        self.extractors.iter().find(|x| x.handles(path)).map(|x| x.as_ref())
    }

    fn extract_file(&self, path: &Path, next_id: &mut usize) -> Extraction {
        let Some(extractor) = self.extractor_for(path) else {
            return Extraction::Skipped("unsupported file type".to_string());
        };
        match extractor.extract(path) {
            Ok(pages) => {
                let source_path = path.to_string_lossy().to_string();
                let chunks = self.chunk_pages(pages, &source_path, extractor, next_id);
                Extraction::Extracted(chunks)
            }
            Err(e) => {
                let err = Error::Extraction { path: path.to_path_buf(), reason: format!("{e:#}") };
                warn!("Skipping document: {err}");
                Extraction::Skipped(format!("{e:#}"))
            }
        }
    }

    fn chunk_pages(
        &self,
        pages: Vec<PageText>,
        source_path: &str,
        extractor: &dyn Extractor,
        next_id: &mut usize,
    ) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        for page in pages {
            for text in self.chunking.chunk(&page.text) {
                chunks.push(Chunk {
                    id: *next_id,
                    text,
                    source_path: source_path.to_string(),
                    page: page.page,
                    doc_type: extractor.doc_type(),
                });
                *next_id += 1;
            }
        }
        chunks
    }
}
