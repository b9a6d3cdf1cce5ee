//! Paginated-document extractor backed by lopdf.

use anyhow::{bail, Context, Result};
use lopdf::Document;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use maintdb_core::traits::Extractor;
use maintdb_core::types::{DocType, PageText};

/// Extractor for PDF files. Each page is read independently.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfExtractor;

impl PdfExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Extractor for PdfExtractor {
    fn doc_type(&self) -> DocType {
        DocType::Pdf
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["pdf"]
    }

    fn extract(&self, path: &Path) -> Result<Vec<PageText>> {
        let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
        extract_pages(&bytes)
    }
}

/// Text of every page in page-number order.
///
/// A page whose content stream cannot be decoded contributes empty text; a
/// document with no text on any page is an error (usually a scanned image).
pub fn extract_pages(bytes: &[u8]) -> Result<Vec<PageText>> {
    let doc = Document::load_mem(bytes).context("failed to parse PDF")?;
    let page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
    debug!(pages = page_numbers.len(), "loaded PDF");

    let mut pages = Vec::with_capacity(page_numbers.len());
    for page in page_numbers {
        let text = match doc.extract_text(&[page]) {
            Ok(text) => text,
            Err(e) => {
                warn!(page, "unreadable PDF page: {e}");
                String::new()
            }
        };
        pages.push(PageText { page, text });
    }

    if pages.iter().all(|p| p.text.trim().is_empty()) {
        bail!("PDF contains no extractable text (may be image-based)");
    }
    Ok(pages)
}
