use lopdf::{dictionary, Dictionary, Document, Object, ObjectId};
use std::collections::HashMap;
use tracing::debug;

use crate::error::{Error, Result};
use crate::pdf::PdfDocument;

/// Page attributes a page may inherit from its ancestors in the page tree
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Guard against malformed page trees whose Parent links form a cycle
const MAX_TREE_DEPTH: usize = 64;

/// A page copied into an output document but not necessarily placed yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopiedPage(ObjectId);

/// A document under construction: a catalog, one flat page tree, and the
/// objects copied in from source documents.
pub struct OutputDocument {
    doc: Document,
    pages_id: ObjectId,
    kids: Vec<ObjectId>,
    compress: bool,
}

impl OutputDocument {
    pub(crate) fn new(version: &str, compress: bool) -> Self {
        let mut doc = Document::with_version(version);
        let pages_id = doc.new_object_id();
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => Vec::<Object>::new(),
                "Count" => 0i64,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        OutputDocument {
            doc,
            pages_id,
            kids: Vec::new(),
            compress,
        }
    }

    pub fn page_count(&self) -> u32 {
        self.kids.len() as u32
    }

    /// Copy the given 0-based pages of `source`, together with everything
    /// they reference, into this document.
    ///
    /// Objects shared between the requested pages (fonts, images) are copied
    /// once per call. The returned pages are in request order and still have
    /// to be placed with [`OutputDocument::add_page`].
    pub fn copy_pages(&mut self, source: &PdfDocument, indices: &[u32]) -> Result<Vec<CopiedPage>> {
        let page_ids = source.page_ids();
        let total = page_ids.len() as u32;
        let mut importer = Importer::new(&source.doc);
        let mut copied = Vec::with_capacity(indices.len());

        for &index in indices {
            let page_id = *page_ids
                .get(index as usize)
                .ok_or(Error::PageOutOfRange { index, total })?;

            let new_id = self.doc.new_object_id();
            // annotations point back at their page through /P
            importer.mapping.insert(page_id, new_id);

            let mut page = Object::Dictionary(flattened_page(&source.doc, page_id)?);
            importer.rewrite(&mut page, &mut self.doc);
            self.doc.objects.insert(new_id, page);
            importer.drain(&mut self.doc);

            copied.push(CopiedPage(new_id));
        }

        debug!(
            pages = copied.len(),
            objects = importer.mapping.len(),
            "copied pages"
        );
        Ok(copied)
    }

    /// Append a copied page to the end of the page tree.
    pub fn add_page(&mut self, page: CopiedPage) -> Result<()> {
        let CopiedPage(id) = page;
        self.doc
            .get_dictionary_mut(id)?
            .set("Parent", Object::Reference(self.pages_id));
        self.kids.push(id);
        Ok(())
    }

    /// Serialize the document as it stands.
    pub fn save(&mut self) -> Result<Vec<u8>> {
        let kids: Vec<Object> = self.kids.iter().map(|&id| Object::Reference(id)).collect();
        let pages = self.doc.get_dictionary_mut(self.pages_id)?;
        pages.set("Kids", kids);
        pages.set("Count", self.kids.len() as i64);

        // copied pages that were never added are dropped here
        self.doc.prune_objects();
        if self.compress {
            self.doc.compress();
        }

        let mut buffer = Vec::new();
        self.doc.save_to(&mut buffer)?;
        Ok(buffer)
    }
}

/// Clone a page dictionary with inherited attributes pulled down from its
/// ancestors, detached from the source page tree.
fn flattened_page(source: &Document, page_id: ObjectId) -> Result<Dictionary> {
    let mut page = source.get_dictionary(page_id)?.clone();
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
    let mut depth = 0;

    while let Some(parent_id) = parent {
        if depth == MAX_TREE_DEPTH {
            break;
        }
        let Ok(node) = source.get_dictionary(parent_id) else {
            break;
        };
        for key in INHERITABLE {
            if !page.has(key) {
                if let Ok(value) = node.get(key) {
                    page.set(key.to_vec(), value.clone());
                }
            }
        }
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
        depth += 1;
    }

    page.remove(b"Parent");
    Ok(page)
}

fn is_page_tree_node(object: &Object) -> bool {
    matches!(
        object
            .as_dict()
            .and_then(|dict| dict.get(b"Type"))
            .and_then(Object::as_name),
        Ok(b"Page") | Ok(b"Pages")
    )
}

/// Walks references out of copied objects and renumbers them into the
/// destination document.
struct Importer<'a> {
    source: &'a Document,
    mapping: HashMap<ObjectId, ObjectId>,
    pending: Vec<(ObjectId, ObjectId)>,
}

impl<'a> Importer<'a> {
    fn new(source: &'a Document) -> Self {
        Importer {
            source,
            mapping: HashMap::new(),
            pending: Vec::new(),
        }
    }

    fn rewrite(&mut self, object: &mut Object, dest: &mut Document) {
        if let Object::Reference(old) = *object {
            *object = match self.target_for(old, dest) {
                Some(new) => Object::Reference(new),
                None => Object::Null,
            };
            return;
        }

        match object {
            Object::Array(items) => {
                for item in items.iter_mut() {
                    self.rewrite(item, dest);
                }
            }
            Object::Dictionary(dict) => {
                for (_, value) in dict.iter_mut() {
                    self.rewrite(value, dest);
                }
            }
            Object::Stream(stream) => {
                for (_, value) in stream.dict.iter_mut() {
                    self.rewrite(value, dest);
                }
            }
            _ => {}
        }
    }

    /// New ID for a source object, scheduling it for copy on first sight.
    /// Other pages and page tree nodes are not followed; links to them
    /// become null.
    fn target_for(&mut self, old: ObjectId, dest: &mut Document) -> Option<ObjectId> {
        if let Some(&new) = self.mapping.get(&old) {
            return Some(new);
        }
        let object = self.source.get_object(old).ok()?;
        if is_page_tree_node(object) {
            return None;
        }
        let new = dest.new_object_id();
        self.mapping.insert(old, new);
        self.pending.push((old, new));
        Some(new)
    }

    fn drain(&mut self, dest: &mut Document) {
        while let Some((old, new)) = self.pending.pop() {
            if let Ok(object) = self.source.get_object(old) {
                let mut object = object.clone();
                self.rewrite(&mut object, dest);
                dest.objects.insert(new, object);
            }
        }
    }
}
