use base64::{engine::general_purpose::STANDARD, Engine};

use crate::error::Result;

/// Decode a base64 attachment body into raw PDF bytes.
///
/// ASCII whitespace is skipped, so bodies wrapped at 76 columns decode the
/// same as single-line ones.
pub fn decode_document(encoded: &str) -> Result<Vec<u8>> {
    let compact: String = encoded
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    Ok(STANDARD.decode(compact)?)
}
