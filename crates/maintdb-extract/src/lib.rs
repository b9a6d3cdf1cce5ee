//! maintdb-extract
//!
//! Per-document-type readers (PDF, slide decks) and the ingestion pass that
//! turns a document tree into positionally numbered chunks. A file that
//! cannot be read is recorded as skipped; it never aborts the pass.

pub mod ingest;
pub mod pdf;
pub mod slides;

pub use ingest::{Extraction, FileOutcome, IngestReport, Ingestor};
pub use pdf::PdfExtractor;
pub use slides::SlideExtractor;
