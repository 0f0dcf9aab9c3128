//! lopdf-backed template document
//!
//! Merging never rewrites a template content stream. Each page gets a new
//! `Contents` array: an opening `q`, the original streams, then `Q` followed
//! by the overlay. Font resources are added to a page-local copy of the
//! (possibly inherited) resource dictionary.

use std::path::{Path, PathBuf};

use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

use crate::domain::ports::{DocumentMetadata, PageSize, TemplateDocument};
use crate::error::{CasillaError, CasillaResult};

use super::assembler::info_dictionary;
use super::fonts::{BOLD_RESOURCE, REGULAR_RESOURCE};

/// Parent chains deeper than this are treated as broken.
const MAX_INHERITANCE_DEPTH: usize = 32;

/// A template PDF loaded for one run
pub struct PdfTemplate {
    file: PathBuf,
    doc: Document,
    pages: Vec<ObjectId>,
    fonts: Option<(ObjectId, ObjectId)>,
    open_state: Option<ObjectId>,
}

impl std::fmt::Debug for PdfTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfTemplate")
            .field("file", &self.file)
            .field("pages", &self.pages.len())
            .finish()
    }
}

impl PdfTemplate {
    /// Load a template from disk.
    pub fn load(path: &Path) -> CasillaResult<Self> {
        let doc = Document::load(path).map_err(|e| CasillaError::Template {
            file: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_document(doc, path)
    }

    /// Load a template already read into memory; `file` is used in errors.
    pub fn from_bytes(bytes: &[u8], file: &Path) -> CasillaResult<Self> {
        let doc = Document::load_mem(bytes).map_err(|e| CasillaError::Template {
            file: file.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_document(doc, file)
    }

    fn from_document(doc: Document, file: &Path) -> CasillaResult<Self> {
        if doc.is_encrypted() {
            return Err(CasillaError::Template {
                file: file.to_path_buf(),
                message: "encrypted templates are not supported".to_string(),
            });
        }
        let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();
        if pages.is_empty() {
            return Err(CasillaError::Template {
                file: file.to_path_buf(),
                message: "template has no pages".to_string(),
            });
        }
        log::debug!("loaded template {} ({} pages)", file.display(), pages.len());
        Ok(Self {
            file: file.to_path_buf(),
            doc,
            pages,
            fonts: None,
            open_state: None,
        })
    }

    fn resolve<'a>(&'a self, object: &'a Object) -> lopdf::Result<&'a Object> {
        match object {
            Object::Reference(id) => self.doc.get_object(*id),
            other => Ok(other),
        }
    }

    /// Look up `key` on the page, falling back to its ancestors.
    fn inherited(&self, page_id: ObjectId, key: &[u8]) -> lopdf::Result<Option<&Object>> {
        let mut current = page_id;
        for _ in 0..MAX_INHERITANCE_DEPTH {
            let dict = self.doc.get_dictionary(current)?;
            if let Ok(value) = dict.get(key) {
                return self.resolve(value).map(Some);
            }
            match dict.get(b"Parent").and_then(Object::as_reference) {
                Ok(parent) => current = parent,
                Err(_) => return Ok(None),
            }
        }
        Ok(None)
    }

    fn font_refs(&mut self) -> (ObjectId, ObjectId) {
        if let Some(fonts) = self.fonts {
            return fonts;
        }
        let mut font = |base: &str| {
            self.doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => base,
                "Encoding" => "WinAnsiEncoding",
            })
        };
        let fonts = (font("Helvetica"), font("Helvetica-Bold"));
        self.fonts = Some(fonts);
        fonts
    }

    fn open_state_ref(&mut self) -> ObjectId {
        if let Some(id) = self.open_state {
            return id;
        }
        let id = self
            .doc
            .add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
        self.open_state = Some(id);
        id
    }

    /// Page-local copy of the effective resources with our fonts added.
    fn page_resources(&self, page_id: ObjectId, fonts: (ObjectId, ObjectId)) -> lopdf::Result<Dictionary> {
        let mut resources = match self.inherited(page_id, b"Resources")? {
            Some(Object::Dictionary(dict)) => dict.clone(),
            _ => Dictionary::new(),
        };
        let mut font_dict = match resources.get(b"Font") {
            Ok(entry) => match self.resolve(entry)? {
                Object::Dictionary(dict) => dict.clone(),
                _ => Dictionary::new(),
            },
            Err(_) => Dictionary::new(),
        };
        font_dict.set(REGULAR_RESOURCE, Object::Reference(fonts.0));
        font_dict.set(BOLD_RESOURCE, Object::Reference(fonts.1));
        resources.set("Font", Object::Dictionary(font_dict));
        Ok(resources)
    }

    /// The page's content streams as a list of references.
    fn page_contents(&mut self, page_id: ObjectId) -> lopdf::Result<Vec<Object>> {
        let contents = match self.doc.get_dictionary(page_id)?.get(b"Contents") {
            Ok(contents) => contents.clone(),
            Err(_) => return Ok(Vec::new()),
        };
        Ok(match contents {
            Object::Reference(id) => match self.doc.get_object(id)? {
                Object::Array(items) => items.clone(),
                _ => vec![Object::Reference(id)],
            },
            Object::Array(items) => items,
            Object::Stream(stream) => vec![Object::Reference(self.doc.add_object(stream))],
            _ => Vec::new(),
        })
    }

    fn merge_into(&mut self, page_id: ObjectId, overlay: Vec<u8>) -> lopdf::Result<()> {
        let fonts = self.font_refs();
        let open = self.open_state_ref();
        let resources = self.page_resources(page_id, fonts)?;
        let existing = self.page_contents(page_id)?;

        let mut body = b"\nQ\n".to_vec();
        body.extend(overlay);
        let overlay_id = self.doc.add_object(Stream::new(Dictionary::new(), body));

        let mut stack = Vec::with_capacity(existing.len() + 2);
        stack.push(Object::Reference(open));
        stack.extend(existing);
        stack.push(Object::Reference(overlay_id));

        let page = self.doc.get_dictionary_mut(page_id)?;
        page.set("Resources", Object::Dictionary(resources));
        page.set("Contents", Object::Array(stack));
        Ok(())
    }
}

impl TemplateDocument for PdfTemplate {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_size(&self, page: usize) -> Option<PageSize> {
        let page_id = *self.pages.get(page)?;
        let media_box = match self.inherited(page_id, b"MediaBox").ok()?? {
            Object::Array(values) => values,
            _ => return None,
        };
        let mut coords = Vec::with_capacity(4);
        for value in media_box {
            coords.push(match self.resolve(value).ok()? {
                Object::Integer(i) => *i as f32,
                Object::Real(r) => *r as f32,
                _ => return None,
            });
        }
        match coords.as_slice() {
            [x0, y0, x1, y1] => Some(PageSize {
                width: (x1 - x0).abs(),
                height: (y1 - y0).abs(),
            }),
            _ => None,
        }
    }

    fn merge_overlay(&mut self, page: usize, overlay: Vec<u8>) -> CasillaResult<()> {
        let page_id = *self.pages.get(page).ok_or_else(|| CasillaError::MergeFailure {
            page,
            reason: format!("template has {} pages", self.pages.len()),
        })?;
        if overlay.is_empty() {
            return Ok(());
        }
        self.merge_into(page_id, overlay)
            .map_err(|e| CasillaError::MergeFailure {
                page,
                reason: e.to_string(),
            })
    }

    fn assemble(&mut self, metadata: &DocumentMetadata) -> CasillaResult<Vec<u8>> {
        let info_id = self.doc.add_object(info_dictionary(metadata));
        self.doc.trailer.set("Info", Object::Reference(info_id));
        if metadata.compress {
            self.doc.compress();
        }
        let mut bytes = Vec::new();
        self.doc.save_to(&mut bytes)?;
        Ok(bytes)
    }
}
