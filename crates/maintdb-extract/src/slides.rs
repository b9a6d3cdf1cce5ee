//! Slide-deck extractor for Office Open XML presentations (`.pptx`).
//!
//! Slides are read in presentation order (`ppt/presentation.xml` slide id
//! list resolved through its relationships). Decks without that part fall
//! back to the numeric order of `ppt/slides/slideN.xml`.

use anyhow::{anyhow, bail, Context, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use zip::ZipArchive;

use maintdb_core::traits::Extractor;
use maintdb_core::types::{DocType, PageText};

const PRESENTATION_PART: &str = "ppt/presentation.xml";
const PRESENTATION_RELS_PART: &str = "ppt/_rels/presentation.xml.rels";

#[derive(Debug, Default, Clone, Copy)]
pub struct SlideExtractor;

impl SlideExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Extractor for SlideExtractor {
    fn doc_type(&self) -> DocType {
        DocType::Slide
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["pptx"]
    }

    fn extract(&self, path: &Path) -> Result<Vec<PageText>> {
        let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
        let mut archive = ZipArchive::new(BufReader::new(file)).context("not a valid slide deck archive")?;
        extract_slides(&mut archive)
    }
}

/// Text of every slide; `page` is the 1-based position in the deck.
pub fn extract_slides<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<Vec<PageText>> {
    let parts = slide_parts(archive)?;
    if parts.is_empty() {
        bail!("slide deck contains no slides");
    }
    let mut slides = Vec::with_capacity(parts.len());
    for (idx, part) in parts.iter().enumerate() {
        let xml = read_part(archive, part)?;
        let text = slide_text(&xml).with_context(|| format!("malformed slide {part}"))?;
        slides.push(PageText { page: idx as u32 + 1, text });
    }
    Ok(slides)
}

fn slide_parts<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<Vec<String>> {
    if archive.index_for_name(PRESENTATION_PART).is_some()
        && archive.index_for_name(PRESENTATION_RELS_PART).is_some()
    {
        let presentation = read_part(archive, PRESENTATION_PART)?;
        let rels = read_part(archive, PRESENTATION_RELS_PART)?;
        let targets = relationship_targets(&rels)?;
        let ordered: Vec<String> = slide_rel_ids(&presentation)?
            .into_iter()
            .filter_map(|rid| targets.get(&rid).cloned())
            .filter(|part| archive.index_for_name(part).is_some())
            .collect();
        if !ordered.is_empty() {
            return Ok(ordered);
        }
    }

    let mut numbered: Vec<(u32, String)> = archive
        .file_names()
        .filter_map(|name| slide_number(name).map(|n| (n, name.to_string())))
        .collect();
    numbered.sort_by_key(|(n, _)| *n);
    Ok(numbered.into_iter().map(|(_, name)| name).collect())
}

fn read_part<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<String> {
    let mut entry = archive.by_name(name).with_context(|| format!("missing part {name}"))?;
    let mut xml = String::new();
    entry.read_to_string(&mut xml).with_context(|| format!("unreadable part {name}"))?;
    Ok(xml)
}

/// `ppt/slides/slide12.xml` -> 12
fn slide_number(name: &str) -> Option<u32> {
    name.strip_prefix("ppt/slides/slide")?.strip_suffix(".xml")?.parse().ok()
}

fn attr(e: &BytesStart<'_>, local: &[u8]) -> Option<String> {
    e.attributes()
        .filter_map(|a| a.ok())
        .find(|a| a.key.local_name().as_ref() == local)
        .map(|a| String::from_utf8_lossy(&a.value).to_string())
}

/// Relationship id -> archive part name, for slide relationships only.
fn relationship_targets(xml: &str) -> Result<HashMap<String, String>> {
    let mut reader = Reader::from_str(xml);
    let mut targets = HashMap::new();
    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) if e.local_name().as_ref() == b"Relationship" => {
                let is_slide = attr(e, b"Type").is_some_and(|t| t.ends_with("/slide"));
                if let (true, Some(id), Some(target)) = (is_slide, attr(e, b"Id"), attr(e, b"Target")) {
                    let part = match target.strip_prefix('/') {
                        Some(absolute) => absolute.to_string(),
                        None => format!("ppt/{target}"),
                    };
                    targets.insert(id, part);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(anyhow!("XML parse error in relationships: {e}")),
            _ => {}
        }
    }
    Ok(targets)
}

/// Relationship ids of `p:sldId` entries, in deck order.
fn slide_rel_ids(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    let mut ids = Vec::new();
    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) if e.local_name().as_ref() == b"sldId" => {
                // `r:id` carries the relationship; the unprefixed `id` is a numeric slide id
                let rid = e
                    .attributes()
                    .filter_map(|a| a.ok())
                    .find(|a| a.key.prefix().is_some() && a.key.local_name().as_ref() == b"id")
                    .map(|a| String::from_utf8_lossy(&a.value).to_string());
                if let Some(rid) = rid {
                    ids.push(rid);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(anyhow!("XML parse error in presentation: {e}")),
            _ => {}
        }
    }
    Ok(ids)
}

/// Visible text of one slide: text runs joined per paragraph, one paragraph
/// per line, empty paragraphs dropped.
pub fn slide_text(xml: &str) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    let mut lines: Vec<String> = Vec::new();
    let mut paragraph = String::new();
    let mut in_run_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) if e.local_name().as_ref() == b"t" => in_run_text = true,
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"t" => in_run_text = false,
                b"p" => {
                    let line = paragraph.trim();
                    if !line.is_empty() {
                        lines.push(line.to_string());
                    }
                    paragraph.clear();
                }
                _ => {}
            },
            Ok(Event::Empty(ref e)) if e.local_name().as_ref() == b"br" => paragraph.push('\n'),
            Ok(Event::Text(e)) if in_run_text => {
                let text = e.unescape().map_err(|e| anyhow!("bad text run: {e}"))?;
                paragraph.push_str(&text);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(anyhow!("XML parse error: {e}")),
            _ => {}
        }
    }
    let tail = paragraph.trim();
    if !tail.is_empty() {
        lines.push(tail.to_string());
    }
    Ok(lines.join("\n"))
}
