#![allow(dead_code)]

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// One-font PDF with one text line per page.
pub fn write_pdf(path: &Path, page_texts: &[&str]) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });
    let mut kids: Vec<Object> = Vec::new();
    for text in page_texts {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        kids.push(page_id.into());
    }
    let count = kids.len() as i64;
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => count,
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).unwrap();
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

pub fn slide_xml(text: &str) -> String {
    let paragraphs: String = text
        .split('\n')
        .map(|line| format!("<a:p><a:r><a:rPr lang=\"en-US\"/><a:t>{}</a:t></a:r></a:p>", escape(line)))
        .collect();
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
         <p:sld xmlns:a=\"http://schemas.openxmlformats.org/drawingml/2006/main\" \
         xmlns:p=\"http://schemas.openxmlformats.org/presentationml/2006/main\">\
         <p:cSld><p:spTree><p:sp><p:txBody><a:bodyPr/>{paragraphs}</p:txBody></p:sp></p:spTree></p:cSld></p:sld>"
    )
}

/// Deck whose `slideN.xml` parts hold `slides[N-1]`. With `order`, a
/// presentation part lists the slide files (1-based numbers) in that order.
pub fn write_pptx(path: &Path, slides: &[&str], order: Option<&[usize]>) {
    let file = File::create(path).unwrap();
    let mut zip = ZipWriter::new(file);
    let opts = SimpleFileOptions::default();

    zip.start_file("[Content_Types].xml", opts).unwrap();
    zip.write_all(b"<?xml version=\"1.0\"?><Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\"/>").unwrap();

    for (i, text) in slides.iter().enumerate() {
        zip.start_file(format!("ppt/slides/slide{}.xml", i + 1), opts).unwrap();
        zip.write_all(slide_xml(text).as_bytes()).unwrap();
    }

    if let Some(order) = order {
        let ids: String = order
            .iter()
            .enumerate()
            .map(|(pos, n)| format!("<p:sldId id=\"{}\" r:id=\"rId{n}\"/>", 256 + pos))
            .collect();
        let presentation = format!(
            "<?xml version=\"1.0\"?><p:presentation \
             xmlns:p=\"http://schemas.openxmlformats.org/presentationml/2006/main\" \
             xmlns:r=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships\">\
             <p:sldIdLst>{ids}</p:sldIdLst></p:presentation>"
        );
        zip.start_file("ppt/presentation.xml", opts).unwrap();
        zip.write_all(presentation.as_bytes()).unwrap();

        let rels: String = (1..=slides.len())
            .map(|n| {
                format!(
                    "<Relationship Id=\"rId{n}\" \
                     Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide\" \
                     Target=\"slides/slide{n}.xml\"/>"
                )
            })
            .collect();
        let rels = format!(
            "<?xml version=\"1.0\"?><Relationships \
             xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\
             <Relationship Id=\"rIdMaster\" \
             Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster\" \
             Target=\"slideMasters/slideMaster1.xml\"/>{rels}</Relationships>"
        );
        zip.start_file("ppt/_rels/presentation.xml.rels", opts).unwrap();
        zip.write_all(rels.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}
