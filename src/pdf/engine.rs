use tracing::debug;

use crate::error::Result;
use crate::pdf::{OutputDocument, PdfDocument};

#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// PDF version written into merged output
    pub version: String,
    /// Compress streams when serializing
    pub compress: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        EngineOptions {
            version: "1.7".to_string(),
            compress: true,
        }
    }
}

/// The document operations a merge is built from.
#[derive(Debug, Clone)]
pub struct PdfEngine {
    options: EngineOptions,
}

impl PdfEngine {
    pub fn new(options: EngineOptions) -> Self {
        PdfEngine { options }
    }

    /// An empty document with a catalog and no pages
    pub fn create(&self) -> OutputDocument {
        OutputDocument::new(&self.options.version, self.options.compress)
    }

    pub fn load(&self, bytes: &[u8]) -> Result<PdfDocument> {
        let doc = PdfDocument::from_bytes(bytes)?;
        debug!(bytes = bytes.len(), pages = doc.page_count(), "loaded source PDF");
        Ok(doc)
    }
}
