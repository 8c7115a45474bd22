use lopdf::{Document, ObjectId};

use crate::error::Result;

/// A parsed source PDF whose pages can be copied into an output document.
pub struct PdfDocument {
    pub doc: Document,
}

impl PdfDocument {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let doc = Document::load_mem(bytes)?;
        Ok(PdfDocument { doc })
    }

    pub fn page_count(&self) -> u32 {
        self.doc.get_pages().len() as u32
    }

    /// Page object IDs in document order
    pub fn page_ids(&self) -> Vec<ObjectId> {
        // get_pages is keyed by 1-based page number, so values come out ordered
        self.doc.get_pages().into_values().collect()
    }

    /// 0-based page indices in document order
    pub fn page_indices(&self) -> Vec<u32> {
        (0..self.page_count()).collect()
    }
}
