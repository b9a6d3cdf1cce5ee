#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use maintdb_core::types::{Chunk, DocType};
use maintdb_extract::{Extraction, FileOutcome, IngestReport};

/// Report for a single PDF whose pages hold `texts`, one chunk per page.
pub fn single_file_report(root: &Path, texts: &[&str]) -> IngestReport {
    let path = root.join("manual.pdf");
    let chunks = texts
        .iter()
        .enumerate()
        .map(|(i, text)| Chunk {
            id: i,
            text: text.to_string(),
            source_path: path.to_string_lossy().to_string(),
            page: i as u32 + 1,
            doc_type: DocType::Pdf,
        })
        .collect();
    IngestReport {
        root: root.to_path_buf(),
        outcomes: vec![FileOutcome { path, extraction: Extraction::Extracted(chunks) }],
    }
}

/// Minimal deck with one text paragraph per slide.
pub fn write_pptx(path: &Path, slides: &[&str]) {
    let file = File::create(path).unwrap();
    let mut zip = ZipWriter::new(file);
    let opts = SimpleFileOptions::default();
    for (i, text) in slides.iter().enumerate() {
        let xml = format!(
            "<?xml version=\"1.0\"?><p:sld xmlns:a=\"http://schemas.openxmlformats.org/drawingml/2006/main\" \
             xmlns:p=\"http://schemas.openxmlformats.org/presentationml/2006/main\">\
             <p:cSld><p:spTree><p:sp><p:txBody><a:p><a:r><a:t>{text}</a:t></a:r></a:p></p:txBody></p:sp></p:spTree></p:cSld></p:sld>"
        );
        zip.start_file(format!("ppt/slides/slide{}.xml", i + 1), opts).unwrap();
        zip.write_all(xml.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}
