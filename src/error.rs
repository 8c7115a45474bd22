use thiserror::Error;

/// Everything that can go wrong between fetching the record attachment and
/// writing the merged file.
#[derive(Error, Debug)]
pub enum Error {
    /// The PDF engine could not be loaded, or never was
    #[error("PDF engine unavailable: {0}")]
    EngineUnavailable(String),

    /// The record service answered, but with no attachment
    #[error("no PDF found for record {0}")]
    RecordNotFound(String),

    /// A merge was requested before the record PDF was fetched
    #[error("record PDF not loaded")]
    RecordNotLoaded,

    #[error("invalid base64 document: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("page index {index} is out of range (document has {total} pages)")]
    PageOutOfRange { index: u32, total: u32 },

    #[error("invalid asset location: {0}")]
    InvalidLocation(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
