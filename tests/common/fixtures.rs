//! Reusable fixtures: template PDFs built with lopdf and the sample model.

use std::path::PathBuf;

use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use serde_json::Value;

/// Page count of the sample model 650 layout
pub const MODEL_650_PAGES: usize = 6;

/// Directory holding the bundled model 650 files
pub fn model_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("models").join("mod650cat")
}

pub fn model_file(name: &str) -> PathBuf {
    model_dir().join(name)
}

/// The bundled example data tree
pub fn example_data() -> Value {
    let text = std::fs::read_to_string(model_file("example.json")).unwrap();
    serde_json::from_str(&text).unwrap()
}

/// An A4 template with `pages` pages, each carrying its own resources.
pub fn template_pdf(pages: usize) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Times-Roman",
    });

    let mut kids = Vec::with_capacity(pages);
    for index in 0..pages {
        let content = format!("BT /T1 9 Tf 40 820 Td (Model 650 page {}) Tj ET", index + 1);
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(595),
                Object::Integer(842),
            ],
            "Resources" => dictionary! {
                "Font" => dictionary! { "T1" => font_id },
            },
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

/// Decoded content of every page of a produced document, in page order.
pub fn page_contents(pdf: &[u8]) -> Vec<String> {
    let doc = Document::load_mem(pdf).unwrap();
    let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();
    pages
        .into_iter()
        .map(|id| String::from_utf8_lossy(&doc.get_page_content(id).unwrap()).into_owned())
        .collect()
}

/// Value of a text entry in the document information dictionary
pub fn info_entry(pdf: &[u8], key: &str) -> Option<String> {
    let doc = Document::load_mem(pdf).unwrap();
    let info = match doc.trailer.get(b"Info").ok()? {
        Object::Reference(id) => doc.get_dictionary(*id).ok()?,
        Object::Dictionary(dict) => dict,
        _ => return None,
    };
    match info.get(key.as_bytes()).ok()? {
        Object::String(bytes, _) => Some(String::from_utf8_lossy(bytes).into_owned()),
        _ => None,
    }
}
