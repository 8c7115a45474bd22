use tracing::debug;

use crate::error::Result;
use crate::pdf::PdfEngine;

/// Bytes of a merged document and how many pages ended up in it.
#[derive(Debug, Clone)]
pub struct MergeResult {
    pub bytes: Vec<u8>,
    pub page_count: u32,
}

/// Build a new document holding every page of each source, in order.
///
/// All pages of the first source come before all pages of the second, and so
/// on. Nothing is reordered, interleaved or skipped.
pub fn merge_documents(engine: &PdfEngine, sources: &[&[u8]]) -> Result<MergeResult> {
    let mut merged = engine.create();

    for (i, bytes) in sources.iter().enumerate() {
        let source = engine.load(bytes)?;
        let pages = merged.copy_pages(&source, &source.page_indices())?;
        debug!(source = i, pages = pages.len(), "appending pages");
        for page in pages {
            merged.add_page(page)?;
        }
    }

    let page_count = merged.page_count();
    let bytes = merged.save()?;
    Ok(MergeResult { bytes, page_count })
}
