pub mod document;
pub mod engine;
pub mod loader;
pub mod merge;
pub mod output;

pub use document::PdfDocument;
pub use engine::{EngineOptions, PdfEngine};
pub use loader::{EngineLoader, EngineState};
pub use merge::merge_documents;
pub use output::OutputDocument;
