mod common;

use std::fs;
use tempfile::TempDir;

use maintdb_core::chunker::ChunkingConfig;
use maintdb_core::traits::Extractor;
use maintdb_core::types::DocType;
use maintdb_extract::slides::slide_text;
use maintdb_extract::{Extraction, Ingestor, PdfExtractor, SlideExtractor};

#[test]
fn pdf_pages_keep_their_numbers() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("amm.pdf");
    common::write_pdf(&path, &["Remove the access panel", "Inspect the hydraulic line"]);

    let pages = PdfExtractor::new().extract(&path).expect("extract");
    assert_eq!(pages.len(), 2);
    assert_eq!(pages[0].page, 1);
    assert_eq!(pages[1].page, 2);
    assert!(pages[0].text.contains("Remove the access panel"));
    assert!(pages[1].text.contains("Inspect the hydraulic line"));
}

#[test]
fn corrupt_pdf_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("broken.pdf");
    fs::write(&path, b"%PDF-1.4 this is not really a pdf").unwrap();
    assert!(PdfExtractor::new().extract(&path).is_err());
}

#[test]
fn slide_text_joins_runs_and_unescapes() {
    let xml = common::slide_xml("Torque & safety wire\nStep 2");
    assert_eq!(slide_text(&xml).unwrap(), "Torque & safety wire\nStep 2");
}

#[test]
fn slides_fall_back_to_file_numbering() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("training.pptx");
    let texts: Vec<String> = (1..=11).map(|i| format!("slide body {i}")).collect();
    let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
    common::write_pptx(&path, &refs, None);

    let slides = SlideExtractor::new().extract(&path).expect("extract");
    assert_eq!(slides.len(), 11);
    // numeric, not lexicographic: slide10 comes after slide9
    assert_eq!(slides[9].page, 10);
    assert_eq!(slides[9].text, "slide body 10");
}

#[test]
fn slides_follow_presentation_order() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("reordered.pptx");
    common::write_pptx(&path, &["first file", "second file", "third file"], Some(&[3, 1, 2]));

    let slides = SlideExtractor::new().extract(&path).expect("extract");
    let texts: Vec<&str> = slides.iter().map(|s| s.text.as_str()).collect();
    assert_eq!(texts, vec!["third file", "first file", "second file"]);
    assert_eq!(slides.iter().map(|s| s.page).collect::<Vec<_>>(), vec![1, 2, 3]);
}

#[test]
fn non_zip_deck_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("fake.pptx");
    fs::write(&path, b"plain text pretending to be a deck").unwrap();
    assert!(SlideExtractor::new().extract(&path).is_err());
}

#[test]
fn ingest_skips_corrupt_file_and_keeps_the_rest() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    common::write_pptx(&root.join("a_brakes.pptx"), &["Brake wear pin check", "Replace brake assembly"], None);
    fs::write(root.join("b_corrupt.pdf"), b"garbage").unwrap();
    fs::create_dir(root.join("engines")).unwrap();
    common::write_pptx(&root.join("engines/c_fuel.PPTX"), &["Fuel nozzle inspection"], None);

    let report = Ingestor::new(ChunkingConfig::default()).ingest(root);
    assert_eq!(report.file_count(), 3);

    let skipped: Vec<_> = report.skipped().collect();
    assert_eq!(skipped.len(), 1);
    assert!(skipped[0].0.ends_with("b_corrupt.pdf"));

    let chunks = report.into_chunks();
    assert_eq!(chunks.len(), 3);
    let ids: Vec<usize> = chunks.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![0, 1, 2]);
    assert_eq!(chunks[0].text, "Brake wear pin check");
    assert_eq!(chunks[1].page, 2);
    assert_eq!(chunks[2].text, "Fuel nozzle inspection");
    assert!(chunks.iter().all(|c| c.doc_type == DocType::Slide));
}

#[test]
fn ingest_ignores_unsupported_and_hidden_files() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    fs::write(root.join("notes.txt"), "not indexed").unwrap();
    fs::create_dir(root.join(".cache")).unwrap();
    common::write_pptx(&root.join(".cache/hidden.pptx"), &["hidden"], None);
    common::write_pptx(&root.join("visible.pptx"), &["visible"], None);

    let ingestor = Ingestor::new(ChunkingConfig::default());
    let files = ingestor.discover(root);
    assert_eq!(files.len(), 1);
    assert!(files[0].ends_with("visible.pptx"));
}

#[test]
fn long_page_is_chunked_within_its_page() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    let long = "inspect ".repeat(40);
    common::write_pptx(&root.join("long.pptx"), &["cover", &long], None);

    let report = Ingestor::new(ChunkingConfig { size: 100, overlap: 20 }).ingest(root);
    let chunks = report.into_chunks();
    assert_eq!(chunks[0].page, 1);
    assert!(chunks.len() > 2);
    assert!(chunks[1..].iter().all(|c| c.page == 2 && c.text.chars().count() <= 100));
}

#[test]
fn empty_tree_produces_no_chunks() {
    let tmp = TempDir::new().unwrap();
    let report = Ingestor::new(ChunkingConfig::default()).ingest(tmp.path());
    assert_eq!(report.file_count(), 0);
    assert_eq!(report.chunk_count(), 0);
}

#[test]
fn extracted_outcome_carries_chunks() {
    let tmp = TempDir::new().unwrap();
    common::write_pdf(&tmp.path().join("manual.pdf"), &["Landing gear service"]);
    let report = Ingestor::new(ChunkingConfig::default()).ingest(tmp.path());
    match &report.outcomes[0].extraction {
        Extraction::Extracted(chunks) => {
            assert_eq!(chunks.len(), 1);
            assert_eq!(chunks[0].doc_type, DocType::Pdf);
            assert_eq!(chunks[0].page, 1);
        }
        Extraction::Skipped(reason) => panic!("unexpected skip: {reason}"),
    }
}
